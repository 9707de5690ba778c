use thiserror::Error;

/// Failure talking to an LLM provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("provider response contained no message content")]
    EmptyResponse,
    #[error("mock provider failure: {0}")]
    Mock(String),
}

/// Failure of a generation call, after the provider has been reached.
#[derive(Error, Debug)]
pub enum AiError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("output violates schema {schema}: {reason}")]
    SchemaViolation { schema: String, reason: String },
    #[error("model returned empty text")]
    EmptyText,
}

impl AiError {
    pub fn schema_violation(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            schema: schema.into(),
            reason: reason.into(),
        }
    }

    /// True when the provider answered but the answer was unusable.
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaViolation { .. } | Self::EmptyText)
    }
}
