//! LLM layer: the `LanguageModel` capability with live and mock backends,
//! schema-constrained generation, and the three claim-specific LLM steps
//! (field extraction, adjudication, narrative).

pub mod decision;
pub mod error;
pub mod extractor;
pub mod mock;
pub mod narrative;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod structured;

pub use decision::{BatchDecisionRecord, BatchDecisions, DecisionEngine};
pub use error::{AiError, ProviderError};
pub use extractor::FieldExtractor;
pub use mock::MockProvider;
pub use narrative::NarrativeGenerator;
pub use openai::OpenAiProvider;
pub use provider::{CompletionRequest, LanguageModel, OutputSchema};
pub use structured::{Validate, extract_json_from_text, generate, generate_text};

/// Model identifiers used for each kind of call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Models {
    /// Extraction, adjudication and narrative for single queries.
    pub query: String,
    /// The single call behind a batch.
    pub batch: String,
    /// Document analysis and LLM clause retrieval.
    pub document: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            query: "gpt-4o-mini".into(),
            batch: "gpt-4o".into(),
            document: "gpt-4o-mini".into(),
        }
    }
}
