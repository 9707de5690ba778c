//! Batch decision types returned by `POST /batch-process`.

use serde::{Deserialize, Serialize};

use crate::claim::DecisionLabel;

/// One decision in a batch, aligned by position with the submitted queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub id: u64,
    pub query: String,
    pub decision: DecisionLabel,
    pub confidence: f64,
    pub amount: f64,
    pub justification: String,
    /// RFC 3339 timestamp string.
    pub timestamp: String,
    pub processing_time: String,
}

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    pub total_amount: f64,
}

impl BatchSummary {
    /// Sum counts and amounts over `items`.
    pub fn from_items(items: &[BatchItem]) -> Self {
        let mut summary = Self::default();
        for item in items {
            match item.decision {
                DecisionLabel::Approved => summary.approved += 1,
                DecisionLabel::Rejected => summary.rejected += 1,
                DecisionLabel::Pending => summary.pending += 1,
            }
            summary.total_amount += item.amount;
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.approved + self.rejected + self.pending
    }
}

/// Response envelope of `POST /batch-process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub batch_id: u64,
    pub total_queries: usize,
    /// RFC 3339 timestamp string.
    pub processed_at: String,
    pub results: Vec<BatchItem>,
    pub summary: BatchSummary,
}
