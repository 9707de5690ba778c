//! Single-query decision pipeline.
//!
//! `Received → Extracting → Retrieving → Deciding → Narrating → Complete`,
//! with `Failed` reachable from every working stage. Stages run strictly in
//! sequence; nothing is persisted here, the caller records the result.

use std::sync::Arc;
use std::time::Instant;

use intelliclaim_ai::{DecisionEngine, FieldExtractor, LanguageModel, Models, NarrativeGenerator};
use intelliclaim_core::{DocumentContext, QueryResult, next_id, timestamp};
use intelliclaim_store::ClauseStore;
use tracing::{debug, info, warn};

use crate::error::PipelineError;

pub const QUERY_REQUIRED: &str = "Query is required";

/// Position of a query in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Extracting,
    Retrieving,
    Deciding,
    Narrating,
    Complete,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Extracting => "extracting",
            Self::Retrieving => "retrieving",
            Self::Deciding => "deciding",
            Self::Narrating => "narrating",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = stage.as_str(), to = next.as_str(), "query stage");
    *stage = next;
}

/// Trimmed query, or a validation error when nothing is left.
pub fn validate_query(query: &str) -> Result<&str, PipelineError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::Validation(QUERY_REQUIRED.into()));
    }
    Ok(trimmed)
}

pub struct QueryPipeline {
    extractor: FieldExtractor,
    clauses: Arc<dyn ClauseStore>,
    engine: DecisionEngine,
    narrative: NarrativeGenerator,
}

impl QueryPipeline {
    pub fn new(lm: Arc<dyn LanguageModel>, clauses: Arc<dyn ClauseStore>, models: &Models) -> Self {
        Self {
            extractor: FieldExtractor::new(lm.clone(), &models.query),
            clauses,
            engine: DecisionEngine::new(lm.clone(), &models.query, &models.batch),
            narrative: NarrativeGenerator::new(lm, &models.query),
        }
    }

    pub fn clause_source(&self) -> &'static str {
        self.clauses.name()
    }

    /// Decide one claim query against the supplied documents.
    pub async fn run(
        &self,
        query: &str,
        documents: &[DocumentContext],
    ) -> Result<QueryResult, PipelineError> {
        let started = Instant::now();
        let mut stage = Stage::Received;

        let result = self.run_stages(query, documents, started, &mut stage).await;
        if let Err(e) = &result {
            let failed_in = stage;
            advance(&mut stage, Stage::Failed);
            warn!(stage = failed_in.as_str(), kind = e.kind().as_str(), error = %e, "query pipeline failed");
        }
        result
    }

    async fn run_stages(
        &self,
        query: &str,
        documents: &[DocumentContext],
        started: Instant,
        stage: &mut Stage,
    ) -> Result<QueryResult, PipelineError> {
        let query = validate_query(query)?;

        advance(stage, Stage::Extracting);
        let parsed = self
            .extractor
            .extract(query)
            .await
            .map_err(PipelineError::Extraction)?;

        advance(stage, Stage::Retrieving);
        let clauses = self
            .clauses
            .retrieve(query, documents)
            .await
            .map_err(PipelineError::Retrieval)?;
        debug!(source = self.clauses.name(), clauses = clauses.len(), "clauses retrieved");

        advance(stage, Stage::Deciding);
        let decision = self
            .engine
            .decide(&parsed, &clauses)
            .await
            .map_err(PipelineError::Decision)?;

        advance(stage, Stage::Narrating);
        let additional_context = match self.narrative.narrate(query, &decision).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "narrative unavailable, continuing without it");
                None
            }
        };

        let result = QueryResult {
            id: next_id(),
            query: query.to_string(),
            timestamp: timestamp(),
            parsed_query: parsed,
            decision,
            additional_context,
            relevant_clauses: clauses,
            processing_time: format!("{:.1}s", started.elapsed().as_secs_f64()),
            documents_searched: documents.len(),
        };
        advance(stage, Stage::Complete);
        info!(
            id = result.id,
            decision = %result.decision.label,
            documents = result.documents_searched,
            elapsed = %result.processing_time,
            "query processed"
        );
        Ok(result)
    }
}
