//! Process-wide session state: uploaded documents and decision history.
//!
//! Everything lives in memory for the lifetime of the process. Concurrent
//! writers are safe: each append takes the write lock once, so a batch lands
//! as one contiguous run of history entries.

use std::sync::{PoisonError, RwLock};

use intelliclaim_core::{BatchResult, DocumentContext, HistoryEntry, QueryResult, UploadedDocument};
use tracing::debug;

use crate::error::StoreError;
use crate::export::history_to_csv;

/// Documents and history grow without bound until `DELETE /history` clears them.
#[derive(Debug, Default)]
pub struct SessionStore {
    documents: RwLock<Vec<UploadedDocument>>,
    history: RwLock<Vec<HistoryEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Documents ──

    pub fn add_document(&self, document: UploadedDocument) {
        let mut docs = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        debug!(id = document.id, name = %document.name, total = docs.len() + 1, "document stored");
        docs.push(document);
    }

    /// Uploaded documents, newest first.
    pub fn documents(&self) -> Vec<UploadedDocument> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .cloned()
            .collect()
    }

    pub fn document(&self, id: u64) -> Option<UploadedDocument> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// Pipeline context for every uploaded document.
    pub fn document_contexts(&self) -> Vec<DocumentContext> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(UploadedDocument::context)
            .collect()
    }

    // ── History ──

    pub fn record_result(&self, result: &QueryResult) {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(HistoryEntry::from(result));
    }

    pub fn record_batch(&self, batch: &BatchResult) {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(batch.results.iter().map(HistoryEntry::from));
    }

    /// Decision history in insertion order.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop all documents and history. Returns the number of history entries removed.
    pub fn clear(&self) -> usize {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        let mut history = self.history.write().unwrap_or_else(PoisonError::into_inner);
        let removed = history.len();
        history.clear();
        removed
    }

    pub fn export_csv(&self) -> Result<String, StoreError> {
        let history = self.history.read().unwrap_or_else(PoisonError::into_inner);
        history_to_csv(&history)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use intelliclaim_core::{
        BatchItem, BatchSummary, Decision, DecisionLabel, DocumentMetadata, ParsedQuery,
    };

    fn result(id: u64, query: &str) -> QueryResult {
        QueryResult {
            id,
            query: query.into(),
            timestamp: "2026-10-19T09:00:00.000Z".into(),
            parsed_query: ParsedQuery::default(),
            decision: Decision {
                label: DecisionLabel::Rejected,
                confidence: 0.88,
                amount: 0.0,
                justification: "Waiting period not met".into(),
                risk_factors: vec![],
                required_documents: vec![],
            },
            additional_context: None,
            relevant_clauses: vec![],
            processing_time: "1.2s".into(),
            documents_searched: 0,
        }
    }

    fn batch(queries: &[&str]) -> BatchResult {
        let results: Vec<BatchItem> = queries
            .iter()
            .enumerate()
            .map(|(i, q)| BatchItem {
                id: 100 + i as u64,
                query: q.to_string(),
                decision: DecisionLabel::Pending,
                confidence: 0.5,
                amount: 0.0,
                justification: "Needs review".into(),
                timestamp: "2026-10-19T09:00:00.000Z".into(),
                processing_time: "0.9s".into(),
            })
            .collect();
        BatchResult {
            batch_id: 99,
            total_queries: results.len(),
            processed_at: "2026-10-19T09:00:00.000Z".into(),
            summary: BatchSummary::from_items(&results),
            results,
        }
    }

    fn document(name: &str) -> UploadedDocument {
        document_with_id(7, name)
    }

    fn document_with_id(id: u64, name: &str) -> UploadedDocument {
        UploadedDocument {
            id,
            name: name.into(),
            mime_type: "text/plain".into(),
            size: 12,
            uploaded_at: "2026-10-19T09:00:00.000Z".into(),
            status: "processed".into(),
            extracted_text: "Section 1 Coverage".into(),
            analysis: "A policy".into(),
            metadata: DocumentMetadata {
                pages: 3,
                language: "en".into(),
                confidence: 0.97,
                word_count: 3,
                processing_time: "2.1s".into(),
            },
        }
    }

    #[test]
    fn history_keeps_insertion_order() {
        let store = SessionStore::new();
        store.record_result(&result(1, "first"));
        store.record_batch(&batch(&["b1", "b2"]));
        store.record_result(&result(2, "last"));

        let queries: Vec<_> = store.history().into_iter().map(|e| e.query).collect();
        assert_eq!(queries, ["first", "b1", "b2", "last"]);
    }

    #[test]
    fn documents_expose_pipeline_context() {
        let store = SessionStore::new();
        store.add_document(document("policy.txt"));
        let contexts = store.document_contexts();
        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].name, "policy.txt");
        assert_eq!(contexts[0].extracted_text, "Section 1 Coverage");
    }

    #[test]
    fn documents_list_newest_first() {
        let store = SessionStore::new();
        store.add_document(document_with_id(1, "old.txt"));
        store.add_document(document_with_id(2, "new.txt"));

        let names: Vec<_> = store.documents().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["new.txt", "old.txt"]);

        let contexts: Vec<_> = store.document_contexts().into_iter().map(|c| c.name).collect();
        assert_eq!(contexts, ["old.txt", "new.txt"]);
    }

    #[test]
    fn document_lookup_by_id() {
        let store = SessionStore::new();
        store.add_document(document_with_id(1, "old.txt"));
        store.add_document(document_with_id(2, "new.txt"));

        assert_eq!(store.document(1).map(|d| d.name).as_deref(), Some("old.txt"));
        assert!(store.document(3).is_none());

        store.clear();
        assert!(store.document(2).is_none());
    }

    #[test]
    fn clear_empties_documents_and_history() {
        let store = SessionStore::new();
        store.add_document(document("policy.txt"));
        store.record_result(&result(1, "q"));

        assert_eq!(store.clear(), 1);
        assert!(store.history().is_empty());
        assert!(store.documents().is_empty());
        assert_eq!(store.export_csv().unwrap().lines().count(), 1);
    }

    #[test]
    fn export_has_one_row_per_entry() {
        let store = SessionStore::new();
        store.record_batch(&batch(&["a", "b", "c"]));
        let csv = store.export_csv().unwrap();
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn concurrent_batches_stay_contiguous() {
        let store = Arc::new(SessionStore::new());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let names: Vec<String> = (0..5).map(|i| format!("t{n}-{i}")).collect();
                    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                    store.record_batch(&batch(&refs));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let history = store.history();
        assert_eq!(history.len(), 20);
        for run in history.chunks(5) {
            let prefix = run[0].query.split('-').next().unwrap().to_string();
            assert!(run.iter().all(|e| e.query.starts_with(&prefix)));
        }
    }
}
