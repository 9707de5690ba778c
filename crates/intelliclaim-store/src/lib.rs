//! Storage layer: clause stores feeding the decision engine, and the
//! process-wide session store holding uploads and decision history.

pub mod clauses;
pub mod error;
pub mod export;
pub mod session;
mod tokenize;

pub use clauses::{ClauseStore, DocumentClauses, StaticClauses, sort_by_relevance};
pub use error::StoreError;
pub use export::history_to_csv;
pub use session::SessionStore;
