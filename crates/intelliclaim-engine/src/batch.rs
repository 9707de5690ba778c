//! Batch decisions: every query decided by one schema-constrained call.

use std::sync::Arc;

use intelliclaim_ai::{DecisionEngine, LanguageModel, Models};
use intelliclaim_core::{BatchItem, BatchResult, BatchSummary, next_id, timestamp};
use tracing::{info, warn};

use crate::error::{BatchError, PipelineError};
use crate::simulation::SimulatedMetrics;

pub const QUERIES_REQUIRED: &str = "Queries array is required";
pub const QUERIES_EMPTY: &str = "Queries array must not be empty";

pub struct BatchPipeline {
    engine: DecisionEngine,
    metrics: Arc<SimulatedMetrics>,
}

impl BatchPipeline {
    pub fn new(lm: Arc<dyn LanguageModel>, models: &Models, metrics: Arc<SimulatedMetrics>) -> Self {
        Self {
            engine: DecisionEngine::new(lm, &models.query, &models.batch),
            metrics,
        }
    }

    /// Decide `queries` in one call and assemble the batch envelope.
    ///
    /// The whole batch fails when the model returns a different number of
    /// decisions than queries. `results[i].query` is always `queries[i]`.
    pub async fn run(&self, queries: &[String]) -> Result<BatchResult, PipelineError> {
        validate_queries(queries)?;

        let records = self
            .engine
            .decide_batch(queries)
            .await
            .map_err(BatchError::Ai)?;

        if records.len() != queries.len() {
            warn!(expected = queries.len(), got = records.len(), "batch length mismatch");
            return Err(BatchError::LengthMismatch {
                expected: queries.len(),
                got: records.len(),
            }
            .into());
        }

        let results: Vec<BatchItem> = queries
            .iter()
            .zip(records)
            .map(|(query, record)| BatchItem {
                id: next_id(),
                query: query.clone(),
                decision: record.decision,
                confidence: record.confidence,
                amount: record.amount,
                justification: record.justification,
                timestamp: timestamp(),
                processing_time: self.metrics.item_processing_time(),
            })
            .collect();

        let summary = BatchSummary::from_items(&results);
        let batch = BatchResult {
            batch_id: next_id(),
            total_queries: results.len(),
            processed_at: timestamp(),
            results,
            summary,
        };
        info!(
            batch_id = batch.batch_id,
            total = batch.total_queries,
            approved = batch.summary.approved,
            rejected = batch.summary.rejected,
            pending = batch.summary.pending,
            "batch processed"
        );
        Ok(batch)
    }
}

fn validate_queries(queries: &[String]) -> Result<(), PipelineError> {
    if queries.is_empty() {
        return Err(PipelineError::Validation(QUERIES_EMPTY.into()));
    }
    if let Some(i) = queries.iter().position(|q| q.trim().is_empty()) {
        return Err(PipelineError::Validation(format!("Query {} is empty", i + 1)));
    }
    Ok(())
}
