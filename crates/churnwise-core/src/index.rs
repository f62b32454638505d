//! Term-frequency index over the chat corpus.
//!
//! The index owns its documents. Postings are keyed by the document's slot in
//! [`DocumentIndex::documents`], which is the load order with duplicate ids
//! removed.
//!
//! # Statistics
//!
//! - per term: `slot -> term frequency`
//! - per term: document frequency
//! - per document: length in tokens
//! - corpus: average document length

use std::collections::{HashMap, HashSet};

use crate::models::Document;
use crate::tokenize::tokenize;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentIndex {
    documents: Vec<Document>,
    postings: HashMap<String, HashMap<usize, u32>>,
    doc_freqs: HashMap<String, usize>,
    doc_lengths: Vec<usize>,
    avg_doc_length: f64,
}

impl DocumentIndex {
    /// Build an index over `documents`.
    ///
    /// Every document is indexed exactly once: a document whose id was
    /// already seen is dropped. Building twice from the same input yields
    /// equal indexes. An empty input produces an empty index, which
    /// retrieves nothing.
    pub fn build(documents: Vec<Document>) -> Self {
        let mut index = Self::default();
        let mut seen_ids: HashSet<String> = HashSet::new();

        for doc in documents {
            if !seen_ids.insert(doc.id.clone()) {
                continue;
            }
            index.add(doc);
        }

        let total: usize = index.doc_lengths.iter().sum();
        index.avg_doc_length = if index.documents.is_empty() {
            0.0
        } else {
            total as f64 / index.documents.len() as f64
        };
        index
    }

    fn add(&mut self, doc: Document) {
        let slot = self.documents.len();
        let tokens = tokenize(&doc.content);

        let mut term_freqs: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *term_freqs.entry(token.clone()).or_insert(0) += 1;
        }

        for (term, freq) in term_freqs {
            *self.doc_freqs.entry(term.clone()).or_insert(0) += 1;
            self.postings.entry(term).or_default().insert(slot, freq);
        }

        self.doc_lengths.push(tokens.len());
        self.documents.push(doc);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, slot: usize) -> Option<&Document> {
        self.documents.get(slot)
    }

    /// Documents containing `term`, with its frequency in each.
    pub fn postings(&self, term: &str) -> Option<&HashMap<usize, u32>> {
        self.postings.get(term)
    }

    pub fn term_frequency(&self, term: &str, slot: usize) -> u32 {
        self.postings
            .get(term)
            .and_then(|p| p.get(&slot))
            .copied()
            .unwrap_or(0)
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }

    pub fn doc_length(&self, slot: usize) -> usize {
        self.doc_lengths.get(slot).copied().unwrap_or(0)
    }

    pub fn avg_doc_length(&self) -> f64 {
        self.avg_doc_length
    }

    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("1", "churn risk high churn"),
            Document::new("2", "billing question"),
        ]
    }

    #[test]
    fn test_term_statistics() {
        let index = DocumentIndex::build(corpus());
        assert_eq!(index.len(), 2);
        assert_eq!(index.term_frequency("churn", 0), 2);
        assert_eq!(index.term_frequency("churn", 1), 0);
        assert_eq!(index.doc_freq("churn"), 1);
        assert_eq!(index.doc_freq("missing"), 0);
        assert_eq!(index.doc_length(0), 4);
        assert_eq!(index.doc_length(1), 2);
        assert!((index.avg_doc_length() - 3.0).abs() < 1e-9);
        assert_eq!(index.vocabulary_size(), 5);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let a = DocumentIndex::build(corpus());
        let b = DocumentIndex::build(corpus());
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_ids_indexed_once() {
        let mut docs = corpus();
        docs.push(Document::new("1", "churn churn churn"));
        let index = DocumentIndex::build(docs);
        assert_eq!(index.len(), 2);
        assert_eq!(index.term_frequency("churn", 0), 2);
        assert_eq!(index.doc_freq("churn"), 1);
    }

    #[test]
    fn test_empty_corpus() {
        let index = DocumentIndex::build(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.avg_doc_length(), 0.0);
        assert!(index.postings("churn").is_none());
    }
}
