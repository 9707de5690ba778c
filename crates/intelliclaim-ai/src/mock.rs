//! Offline backend with canned answers and scripted overrides.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::error::ProviderError;
use crate::prompts::CLAUSE_RETRIEVAL_HEADER;
use crate::provider::{CompletionRequest, LanguageModel};

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(\d+)\.\s+(.+?)\s*$").expect("valid numbered-line regex"));

/// A provider that never leaves the process.
///
/// Scripted responses (or failures) queued with [`push_response`](Self::push_response)
/// and friends are returned first, in order. When the queue is empty the
/// provider answers with a canned response chosen by the requested schema, so
/// the whole service can run without credentials.
#[derive(Default)]
pub struct MockProvider {
    scripted: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw text response.
    pub fn push_response(&self, text: impl Into<String>) {
        self.queue().push_back(Ok(text.into()));
    }

    /// Queue a value serialized as JSON.
    pub fn push_json<T: Serialize>(&self, value: &T) {
        let text = serde_json::to_string(value).unwrap_or_default();
        self.queue().push_back(Ok(text));
    }

    /// Queue a provider failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.queue().push_back(Err(message.into()));
    }

    /// Number of `complete` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        self.scripted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LanguageModel for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(next) = self.queue().pop_front() {
            debug!(schema = request.schema_name().unwrap_or("-"), "mock: scripted response");
            return next.map_err(ProviderError::Mock);
        }

        debug!(schema = request.schema_name().unwrap_or("-"), "mock: canned response");
        Ok(canned_response(request))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ── Canned responses ──

fn canned_response(request: &CompletionRequest) -> String {
    match request.schema_name() {
        Some("ParsedQuery") => json!({
            "age": "46",
            "gender": "male",
            "procedure": "knee surgery",
            "location": "Pune",
            "policyAge": "3 months"
        })
        .to_string(),
        Some("Decision") => json!({
            "decision": "approved",
            "confidence": 0.91,
            "amount": 120000,
            "justification": "The procedure is covered under the policy clauses and the claim falls within the waiting period and geographic rules.",
            "riskFactors": ["Mock backend: decision not produced by a live model"],
            "requiredDocuments": ["Discharge summary", "Hospital bills"]
        })
        .to_string(),
        Some("BatchDecisions") => {
            let results: Vec<_> = numbered_queries(&request.prompt)
                .into_iter()
                .map(|query| {
                    json!({
                        "query": query,
                        "decision": "pending",
                        "confidence": 0.5,
                        "amount": 0,
                        "justification": "Mock backend: queued for manual review."
                    })
                })
                .collect();
            json!({ "results": results }).to_string()
        }
        Some(_) => "{}".to_string(),
        None if request.prompt.starts_with(CLAUSE_RETRIEVAL_HEADER) => json!([
            {
                "clauseId": "C1",
                "document": "policy_doc_1.pdf",
                "page": 3,
                "text": "Surgery is covered after 3 months of policy issuance.",
                "relevanceScore": 0.87
            },
            {
                "clauseId": "C2",
                "document": "policy_doc_2.pdf",
                "page": 5,
                "text": "Knee replacements are eligible for reimbursement under premium policies.",
                "relevanceScore": 0.76
            }
        ])
        .to_string(),
        None => "Mock backend response: no live model was consulted. \
                 Review the applicable policy terms with your insurer before relying on this text."
            .to_string(),
    }
}

/// The `N. text` lines of a batch prompt, in order.
fn numbered_queries(prompt: &str) -> Vec<String> {
    NUMBERED_LINE
        .captures_iter(prompt)
        .map(|c| c[2].to_string())
        .collect()
}
