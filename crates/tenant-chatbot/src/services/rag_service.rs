use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::KnowledgeBaseConfig;
use crate::document::{Document, DocumentStore};
use crate::services::retriever::Retriever;
use crate::utils::error::ChatbotError;

/// Documents retrieved for a query plus the context text built from them
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub documents: Vec<Arc<Document>>,
    pub context: String,
}

impl RetrievalResult {
    pub fn titles(&self) -> Vec<String> {
        self.documents.iter().map(|doc| doc.title.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Query facade over the knowledge base.
/// Read-only after construction, shared across sessions behind an `Arc`.
pub struct RagPipeline {
    retriever: Retriever,
}

impl RagPipeline {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            retriever: Retriever::new(store.documents()),
        }
    }

    pub fn from_config(config: &KnowledgeBaseConfig) -> Result<Self, ChatbotError> {
        let store = DocumentStore::load(Path::new(&config.path))?;
        info!("RAG pipeline ready over {} documents", store.len());
        Ok(Self::new(store))
    }

    /// Up to `top_k` documents scoring above zero, best first
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<Arc<Document>> {
        self.retriever
            .top_k(query, top_k)
            .into_iter()
            .map(|(doc, _)| doc)
            .collect()
    }

    /// Newline separated `title: content` lines for the retrieved documents
    pub fn build_context(&self, query: &str, top_k: usize) -> String {
        Self::format_context(&self.retrieve(query, top_k))
    }

    /// Retrieve and build context from a single scoring pass.
    pub fn query(&self, query: &str, top_k: usize) -> RetrievalResult {
        let documents = self.retrieve(query, top_k);
        let context = Self::format_context(&documents);

        debug!(
            "Retrieved {} documents ({} context chars)",
            documents.len(),
            context.len()
        );

        RetrievalResult { documents, context }
    }

    fn format_context(documents: &[Arc<Document>]) -> String {
        documents
            .iter()
            .map(|doc| format!("{}: {}", doc.title, doc.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> RagPipeline {
        let store = DocumentStore::from_documents(vec![
            Document::new("rent", "Rent payment options", "pay rent online through the portal"),
            Document::new("leak", "Maintenance", "report a leak through the portal"),
            Document::new("lease", "Lease renewal", "renewal offers arrive before lease end"),
            Document::new("pets", "Pet policy", "two pets per unit"),
        ])
        .unwrap();
        RagPipeline::new(store)
    }

    #[test]
    fn test_retrieve_positive_scores_only() {
        let rag = pipeline();
        let docs = rag.retrieve("pay rent online", 3);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Rent payment options");
    }

    #[test]
    fn test_build_context_format() {
        let rag = pipeline();
        let context = rag.build_context("online leak", 3);
        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&"Rent payment options: pay rent online through the portal"));
        assert!(lines.contains(&"Maintenance: report a leak through the portal"));
    }

    #[test]
    fn test_retrieval_miss_gives_empty_context() {
        let rag = pipeline();
        assert!(rag.retrieve("hello there", 3).is_empty());
        assert_eq!(rag.build_context("hello there", 3), "");

        let result = rag.query("hello there", 3);
        assert!(result.is_empty());
        assert!(result.context.is_empty());
    }

    #[test]
    fn test_query_matches_separate_calls() {
        let rag = pipeline();
        let result = rag.query("lease renewal offers", 3);
        assert_eq!(result.context, rag.build_context("lease renewal offers", 3));
        assert_eq!(result.titles(), vec!["Lease renewal".to_string()]);
    }

    #[test]
    fn test_from_config_missing_path() {
        let config = KnowledgeBaseConfig {
            path: "/does/not/exist.json".to_string(),
        };
        assert!(matches!(
            RagPipeline::from_config(&config),
            Err(ChatbotError::Config(_))
        ));
    }
}
