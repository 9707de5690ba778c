use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use intelliclaim_ai::Models;

/// Which `LanguageModel` implementation answers prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// OpenAI-compatible chat completions over HTTP.
    Live,
    /// Canned offline responses.
    Mock,
}

/// Where candidate clauses come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClauseSource {
    /// The fixed three-clause policy set.
    Static,
    /// Heading-split sections of the uploaded documents.
    Documents,
    /// Ask the model.
    Llm,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "intelliclaim", version, about = "Insurance claim decisions backed by an LLM")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "INTELLICLAIM_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    #[arg(long, env = "INTELLICLAIM_BACKEND", value_enum, default_value_t = BackendKind::Live)]
    pub backend: BackendKind,

    /// API key for the live backend.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    /// Model for extraction, decisions and narratives.
    #[arg(long, env = "INTELLICLAIM_QUERY_MODEL", default_value = "gpt-4o-mini")]
    pub query_model: String,

    /// Model for the batch call.
    #[arg(long, env = "INTELLICLAIM_BATCH_MODEL", default_value = "gpt-4o")]
    pub batch_model: String,

    /// Model for document analysis and LLM clause retrieval.
    #[arg(long, env = "INTELLICLAIM_DOCUMENT_MODEL", default_value = "gpt-4o-mini")]
    pub document_model: String,

    /// Provider HTTP timeout in seconds.
    #[arg(long, env = "INTELLICLAIM_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,

    #[arg(long, env = "INTELLICLAIM_CLAUSE_SOURCE", value_enum, default_value_t = ClauseSource::Static)]
    pub clause_source: ClauseSource,

    /// Upper bound on clauses offered to the decision step.
    #[arg(long, env = "INTELLICLAIM_MAX_CLAUSES", default_value_t = 5)]
    pub max_clauses: usize,

    /// Request body limit in bytes (uploads included).
    #[arg(long, env = "INTELLICLAIM_UPLOAD_LIMIT", default_value_t = 16 * 1024 * 1024)]
    pub upload_limit: usize,

    /// Accepted upload extensions, comma separated.
    #[arg(
        long,
        env = "INTELLICLAIM_ALLOWED_EXTENSIONS",
        value_delimiter = ',',
        default_values = ["pdf", "docx", "doc", "txt", "eml"]
    )]
    pub allowed_extensions: Vec<String>,

    /// Seed for simulated metrics.
    #[arg(long, env = "INTELLICLAIM_SEED")]
    pub seed: Option<u64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "INTELLICLAIM_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn models(&self) -> Models {
        Models {
            query: self.query_model.clone(),
            batch: self.batch_model.clone(),
            document: self.document_model.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
