//! Clause retrieval by asking the model.
//!
//! The answer is free text, parsed leniently: malformed entries are dropped,
//! scores are clamped and the list is re-sorted. Nothing checks that the
//! returned clauses exist in any document.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use intelliclaim_ai::{LanguageModel, extract_json_from_text, generate_text, prompts};
use intelliclaim_core::{Clause, DocumentContext};
use intelliclaim_store::{ClauseStore, StoreError, sort_by_relevance};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// One clause as the model tends to write it. Every field is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LooseClause {
    #[serde(default, alias = "id", alias = "clause_id")]
    clause_id: Option<String>,
    #[serde(default, alias = "source")]
    document: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "relevance", alias = "score", alias = "relevance_score")]
    relevance_score: Option<f64>,
    #[serde(default)]
    page: Option<u32>,
}

pub struct LlmClauses {
    lm: Arc<dyn LanguageModel>,
    model: String,
    max_clauses: usize,
}

impl LlmClauses {
    pub fn new(lm: Arc<dyn LanguageModel>, model: impl Into<String>, max_clauses: usize) -> Self {
        Self {
            lm,
            model: model.into(),
            max_clauses: max_clauses.max(1),
        }
    }
}

#[async_trait]
impl ClauseStore for LlmClauses {
    async fn retrieve(
        &self,
        query: &str,
        documents: &[DocumentContext],
    ) -> Result<Vec<Clause>, StoreError> {
        let docs: Vec<(String, String)> = documents
            .iter()
            .map(|d| (d.name.clone(), d.extracted_text.clone()))
            .collect();
        let text = generate_text(
            self.lm.as_ref(),
            &self.model,
            prompts::clause_retrieval_prompt(query, &docs),
            Some(0.0),
        )
        .await
        .map_err(|e| StoreError::Retrieval(e.to_string()))?;

        let value = extract_json_from_text(&text)
            .ok_or_else(|| StoreError::Retrieval("no JSON in clause answer".into()))?;
        let mut clauses = parse_clauses(value);
        sort_by_relevance(&mut clauses);
        clauses.truncate(self.max_clauses);
        debug!(clauses = clauses.len(), "model clauses parsed");
        Ok(clauses)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// Accepts a bare array or an object wrapping one under `clauses`.
fn parse_clauses(value: Value) -> Vec<Clause> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("clauses") {
            Some(Value::Array(items)) => items,
            _ => vec![Value::Object(map)],
        },
        _ => Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut clauses = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let loose: LooseClause = match serde_json::from_value(item) {
            Ok(c) => c,
            Err(e) => {
                warn!(index = i, error = %e, "dropping malformed clause");
                continue;
            }
        };
        let Some(text) = loose.text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
            continue;
        };

        let base = loose
            .clause_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("C{}", i + 1));
        let mut clause_id = base.clone();
        let mut suffix = i + 1;
        while !seen.insert(clause_id.clone()) {
            clause_id = format!("{base}-{suffix}");
            suffix += 1;
        }

        let score = loose.relevance_score.filter(|s| s.is_finite()).unwrap_or(0.0);
        clauses.push(Clause {
            clause_id,
            document: loose.document.unwrap_or_default(),
            text,
            relevance_score: score.clamp(0.0, 1.0) as f32,
            page: loose.page,
        });
    }
    clauses
}
