//! Core types for IntelliClaim: parsed queries, policy clauses, decisions,
//! batch results and uploaded documents, in their camelCase JSON wire shapes.

pub mod batch;
pub mod claim;
pub mod document;
pub mod history;
pub mod ids;

pub use batch::{BatchItem, BatchResult, BatchSummary};
pub use claim::{Clause, Decision, DecisionLabel, DocumentContext, ParsedQuery, QueryResult};
pub use document::{DocumentMetadata, UploadedDocument};
pub use history::HistoryEntry;
pub use ids::{next_id, timestamp};
