use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::utils::error::ChatbotError;

/// Knowledge base entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub workflows: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            workflows: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_workflows(mut self, workflows: &[&str]) -> Self {
        self.workflows = workflows.iter().map(|w| w.to_string()).collect();
        self
    }
}

/// Read-only, ordered collection of knowledge base documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Arc<Document>>,
}

impl DocumentStore {
    /// Load the knowledge base from a JSON file
    pub fn load(path: &Path) -> Result<Self, ChatbotError> {
        if !path.exists() {
            return Err(ChatbotError::Config(format!(
                "Document source not found: {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path).map_err(|e| {
            ChatbotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let store = Self::from_json(&raw)?;
        info!("Loaded {} knowledge base documents from {:?}", store.len(), path);
        Ok(store)
    }

    pub fn from_json(raw: &str) -> Result<Self, ChatbotError> {
        let documents: Vec<Document> = serde_json::from_str(raw)
            .map_err(|e| ChatbotError::Config(format!("Malformed knowledge base: {}", e)))?;
        Self::from_documents(documents)
    }

    pub fn from_documents(documents: Vec<Document>) -> Result<Self, ChatbotError> {
        let mut seen = HashSet::with_capacity(documents.len());
        for doc in &documents {
            if !seen.insert(doc.id.as_str()) {
                return Err(ChatbotError::Config(format!(
                    "Duplicate document id in knowledge base: {}",
                    doc.id
                )));
            }
        }

        debug!("Document store built with {} documents", documents.len());
        Ok(Self {
            documents: documents.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Document>> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Case-insensitive tag lookup
    pub fn find_by_tag(&self, tag: &str) -> Vec<Arc<Document>> {
        let tag_lower = tag.to_lowercase();
        self.documents
            .iter()
            .filter(|doc| doc.tags.iter().any(|t| t.to_lowercase() == tag_lower))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
