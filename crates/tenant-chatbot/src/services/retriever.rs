use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::document::Document;
use crate::utils::tokenizer::term_counts;

/// Small TF/IDF retriever over the knowledge base.
///
/// Document vectors hold each term's count divided by the document's
/// highest term count. IDF is `ln(N / (1 + df))` over the whole corpus.
/// The index is immutable once built; `rebuild` replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct Retriever {
    documents: Vec<Arc<Document>>,
    doc_norm_freqs: HashMap<String, HashMap<String, f64>>,
    idf: HashMap<String, f64>,
}

impl Retriever {
    pub fn new(documents: &[Arc<Document>]) -> Self {
        let documents: Vec<Arc<Document>> = documents.to_vec();

        let doc_term_freqs: Vec<(String, HashMap<String, usize>)> = documents
            .iter()
            .map(|doc| (doc.id.clone(), term_counts(&doc.content)))
            .collect();

        let idf = Self::build_idf(documents.len(), &doc_term_freqs);

        let doc_norm_freqs = doc_term_freqs
            .into_iter()
            .map(|(id, counts)| (id, Self::normalize(&counts)))
            .collect();

        debug!(
            "Built retriever index: {} documents, {} terms",
            documents.len(),
            idf.len()
        );

        Self {
            documents,
            doc_norm_freqs,
            idf,
        }
    }

    /// Replace the whole index with one built over `documents`.
    pub fn rebuild(&mut self, documents: &[Arc<Document>]) {
        *self = Self::new(documents);
    }

    fn normalize(counts: &HashMap<String, usize>) -> HashMap<String, f64> {
        let Some(max_freq) = counts.values().copied().max() else {
            return HashMap::new();
        };
        counts
            .iter()
            .map(|(term, freq)| (term.clone(), *freq as f64 / max_freq as f64))
            .collect()
    }

    fn build_idf(
        doc_count: usize,
        doc_term_freqs: &[(String, HashMap<String, usize>)],
    ) -> HashMap<String, f64> {
        let doc_count = doc_count.max(1) as f64;

        let mut df: HashMap<&str, usize> = HashMap::new();
        for (_, counts) in doc_term_freqs {
            for term in counts.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        df.into_iter()
            .map(|(term, freq)| (term.to_string(), (doc_count / (1.0 + freq as f64)).ln()))
            .collect()
    }

    /// Corpus-wide inverse document frequency, 0.0 for unknown terms.
    pub fn idf(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    /// Normalized term frequency of `term` in the document with `doc_id`.
    pub fn term_weight(&self, doc_id: &str, term: &str) -> f64 {
        self.doc_norm_freqs
            .get(doc_id)
            .and_then(|vector| vector.get(term))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn document_vector(&self, doc_id: &str) -> Option<&HashMap<String, f64>> {
        self.doc_norm_freqs.get(doc_id)
    }

    pub fn score(&self, query: &str, document: &Document) -> f64 {
        let query_terms = term_counts(query);
        self.score_terms(&query_terms, &document.id)
    }

    fn score_terms(&self, query_terms: &HashMap<String, usize>, doc_id: &str) -> f64 {
        let Some(doc_vector) = self.doc_norm_freqs.get(doc_id) else {
            return 0.0;
        };

        query_terms
            .iter()
            .map(|(term, freq)| {
                let tf = doc_vector.get(term).copied().unwrap_or(0.0);
                *freq as f64 * self.idf(term) * tf
            })
            .sum()
    }

    /// Up to `k` documents with a positive score, best first.
    /// Equal scores keep their knowledge base order.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<(Arc<Document>, f64)> {
        let query_terms = term_counts(query);

        let mut scored: Vec<(Arc<Document>, f64)> = self
            .documents
            .iter()
            .map(|doc| (doc.clone(), self.score_terms(&query_terms, &doc.id)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // sort_by is stable, which keeps ties in document order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
