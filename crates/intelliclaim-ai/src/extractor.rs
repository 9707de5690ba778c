use std::sync::Arc;

use intelliclaim_core::ParsedQuery;
use tracing::debug;

use crate::error::AiError;
use crate::prompts;
use crate::provider::LanguageModel;
use crate::structured::{Validate, generate};

impl Validate for ParsedQuery {
    fn validate(self) -> Result<Self, String> {
        Ok(self.normalized())
    }
}

/// Turns a free-text claim query into a [`ParsedQuery`].
pub struct FieldExtractor {
    lm: Arc<dyn LanguageModel>,
    model: String,
}

impl FieldExtractor {
    pub fn new(lm: Arc<dyn LanguageModel>, model: impl Into<String>) -> Self {
        Self {
            lm,
            model: model.into(),
        }
    }

    /// Extract the six optional fields. Fields the model leaves blank come back `None`.
    pub async fn extract(&self, query: &str) -> Result<ParsedQuery, AiError> {
        let parsed: ParsedQuery = generate(
            self.lm.as_ref(),
            &self.model,
            prompts::EXTRACTION_SYSTEM,
            prompts::extraction_prompt(query),
        )
        .await?;
        debug!(fields = parsed.field_count(), "query fields extracted");
        Ok(parsed)
    }
}
