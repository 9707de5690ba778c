//! Claim processing: the single-query pipeline, the one-call batch pipeline,
//! document ingestion and model-backed clause retrieval.

pub mod batch;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod retrieval;
pub mod simulation;

pub use batch::BatchPipeline;
pub use error::{BatchError, ErrorKind, PipelineError};
pub use ingest::{DEFAULT_EXTENSIONS, DocumentIngestor, IncomingFile};
pub use pipeline::{QueryPipeline, Stage};
pub use retrieval::LlmClauses;
pub use simulation::SimulatedMetrics;
