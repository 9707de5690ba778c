//! The provider capability every backend implements.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;

/// JSON schema the provider should constrain its output to.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

/// One call to a language model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: Option<String>,
    pub prompt: String,
    /// `None` for free-text generation.
    pub schema: Option<OutputSchema>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            prompt: prompt.into(),
            schema: None,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    pub fn with_schema(mut self, schema: OutputSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Name of the requested output schema, if any.
    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_ref().map(|s| s.name.as_str())
    }
}

/// A text or structured generation backend.
///
/// Implementations return the raw message text; schema validation happens in
/// [`crate::generate`], not here. No implementation retries.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Short backend name for logs and the health endpoint.
    fn name(&self) -> &'static str;
}
