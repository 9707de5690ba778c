use std::sync::Arc;

use intelliclaim_core::Decision;

use crate::error::AiError;
use crate::prompts;
use crate::provider::LanguageModel;
use crate::structured::generate_text;

/// Free-text explanation of a decision: applicable terms, alternatives, appeals.
pub struct NarrativeGenerator {
    lm: Arc<dyn LanguageModel>,
    model: String,
}

impl NarrativeGenerator {
    pub fn new(lm: Arc<dyn LanguageModel>, model: impl Into<String>) -> Self {
        Self {
            lm,
            model: model.into(),
        }
    }

    pub async fn narrate(&self, query: &str, decision: &Decision) -> Result<String, AiError> {
        generate_text(
            self.lm.as_ref(),
            &self.model,
            prompts::narrative_prompt(query, decision),
            Some(0.3),
        )
        .await
    }
}
