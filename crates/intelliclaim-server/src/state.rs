use std::sync::Arc;

use anyhow::Context;
use intelliclaim_ai::{LanguageModel, MockProvider, OpenAiProvider};
use intelliclaim_engine::{BatchPipeline, DocumentIngestor, LlmClauses, QueryPipeline, SimulatedMetrics};
use intelliclaim_store::{ClauseStore, DocumentClauses, SessionStore, StaticClauses};

use crate::config::{BackendKind, ClauseSource, Config};

/// Everything a request handler needs, shared behind one `Arc`.
pub struct AppState {
    pub query: QueryPipeline,
    pub batch: BatchPipeline,
    pub ingestor: DocumentIngestor,
    pub session: SessionStore,
    /// `live` or `mock`.
    pub backend: &'static str,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let lm = language_model(config)?;
        Ok(Self::new(lm, config))
    }

    pub fn new(lm: Arc<dyn LanguageModel>, config: &Config) -> Self {
        let models = config.models();
        let metrics = Arc::new(match config.seed {
            Some(seed) => SimulatedMetrics::seeded(seed),
            None => SimulatedMetrics::from_entropy(),
        });

        let clauses: Arc<dyn ClauseStore> = match config.clause_source {
            ClauseSource::Static => Arc::new(StaticClauses::default()),
            ClauseSource::Documents => Arc::new(DocumentClauses::new(
                StaticClauses::default(),
                config.max_clauses,
            )),
            ClauseSource::Llm => Arc::new(LlmClauses::new(
                lm.clone(),
                &models.document,
                config.max_clauses,
            )),
        };

        Self {
            backend: lm.name(),
            query: QueryPipeline::new(lm.clone(), clauses, &models),
            batch: BatchPipeline::new(lm.clone(), &models, metrics.clone()),
            ingestor: DocumentIngestor::new(
                lm,
                &models.document,
                &config.allowed_extensions,
                metrics,
            ),
            session: SessionStore::new(),
        }
    }
}

fn language_model(config: &Config) -> anyhow::Result<Arc<dyn LanguageModel>> {
    match config.backend {
        BackendKind::Mock => Ok(Arc::new(MockProvider::new())),
        BackendKind::Live => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .context("the live backend needs --api-key or OPENAI_API_KEY")?;
            let provider = OpenAiProvider::new(config.base_url.clone(), api_key, config.timeout())
                .context("building the provider HTTP client")?;
            Ok(Arc::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn live_backend_requires_api_key() {
        let mut config = Config::parse_from(["intelliclaim", "--backend", "live"]);
        config.api_key = None;
        assert!(AppState::from_config(&config).is_err());

        config.api_key = Some("sk-test".into());
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.backend, "live");
    }

    #[test]
    fn clause_source_is_wired() {
        let config = Config::parse_from(["intelliclaim", "--backend", "mock", "--clause-source", "llm"]);
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.backend, "mock");
        assert_eq!(state.query.clause_source(), "llm");
    }
}
