use intelliclaim_ai::AiError;
use intelliclaim_store::StoreError;
use thiserror::Error;

/// Coarse classification of a failure, as seen by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; nothing was sent to the provider.
    Validation,
    /// The provider could not be reached or answered with an error.
    Provider,
    /// The provider answered but the output was unusable.
    SchemaViolation,
    /// A rejected upload.
    Upload,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Provider => "provider",
            Self::SchemaViolation => "schema_violation",
            Self::Upload => "upload",
        }
    }

    /// HTTP status code for this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation | Self::Upload => 400,
            Self::Provider | Self::SchemaViolation => 500,
        }
    }

    fn of(err: &AiError) -> Self {
        if err.is_schema_violation() {
            Self::SchemaViolation
        } else {
            Self::Provider
        }
    }
}

/// Failure of the single batch call.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("batch returned {got} decisions for {expected} queries")]
    LengthMismatch { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error("field extraction failed: {0}")]
    Extraction(#[source] AiError),

    #[error("clause retrieval failed: {0}")]
    Retrieval(#[source] StoreError),

    #[error("decision failed: {0}")]
    Decision(#[source] AiError),

    #[error("batch failed: {0}")]
    Batch(#[from] BatchError),

    #[error("{0}")]
    Upload(String),

    #[error("document analysis failed: {0}")]
    Ingestion(#[source] AiError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Upload(_) => ErrorKind::Upload,
            Self::Retrieval(_) => ErrorKind::Provider,
            Self::Extraction(e) | Self::Decision(e) | Self::Ingestion(e) => ErrorKind::of(e),
            Self::Batch(BatchError::Ai(e)) => ErrorKind::of(e),
            Self::Batch(BatchError::LengthMismatch { .. }) => ErrorKind::SchemaViolation,
        }
    }

    /// Name of the stage that failed, for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Extraction(_) => "extraction",
            Self::Retrieval(_) => "retrieval",
            Self::Decision(_) => "decision",
            Self::Batch(_) => "batch",
            Self::Upload(_) => "upload",
            Self::Ingestion(_) => "ingestion",
        }
    }

    /// Message safe to show a client: the validation text for 4xx errors,
    /// nothing for 5xx errors.
    pub fn client_message(&self) -> Option<&str> {
        match self {
            Self::Validation(msg) | Self::Upload(msg) => Some(msg),
            _ => None,
        }
    }
}
