//! Decision history rows, as rendered by the history view and CSV export.

use serde::{Deserialize, Serialize};

use crate::batch::BatchItem;
use crate::claim::{DecisionLabel, QueryResult};

/// One decision in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub timestamp: String,
    pub query: String,
    pub decision: DecisionLabel,
    pub amount: f64,
    pub confidence: f64,
    pub justification: String,
}

impl From<&QueryResult> for HistoryEntry {
    fn from(result: &QueryResult) -> Self {
        Self {
            id: result.id,
            timestamp: result.timestamp.clone(),
            query: result.query.clone(),
            decision: result.decision.label,
            amount: result.decision.amount,
            confidence: result.decision.confidence,
            justification: result.decision.justification.clone(),
        }
    }
}

impl From<&BatchItem> for HistoryEntry {
    fn from(item: &BatchItem) -> Self {
        Self {
            id: item.id,
            timestamp: item.timestamp.clone(),
            query: item.query.clone(),
            decision: item.decision,
            amount: item.amount,
            confidence: item.confidence,
            justification: item.justification.clone(),
        }
    }
}
