//! Adjudication: single decisions and the one-call batch variant.
//!
//! All adjudication logic (waiting periods, limits, exclusions) lives in the
//! prompt and the model's answer. The schema layer only enforces shape and
//! clamps numeric ranges; the decision is not checked against the clauses.

use std::sync::Arc;

use intelliclaim_core::{Clause, Decision, DecisionLabel, ParsedQuery};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AiError;
use crate::prompts;
use crate::provider::LanguageModel;
use crate::structured::{Validate, generate};

/// Clamp confidence into `[0, 1]` and amount to `>= 0`, rejecting NaN.
fn clamp_scores(confidence: f64, amount: f64) -> Result<(f64, f64), String> {
    if confidence.is_nan() || amount.is_nan() {
        return Err("confidence and amount must be numbers".into());
    }
    Ok((confidence.clamp(0.0, 1.0), amount.max(0.0)))
}

impl Validate for Decision {
    fn validate(mut self) -> Result<Self, String> {
        let (confidence, amount) = clamp_scores(self.confidence, self.amount)?;
        self.confidence = confidence;
        self.amount = amount;
        self.justification = self.justification.trim().to_string();
        if self.justification.is_empty() {
            return Err("justification is empty".into());
        }
        Ok(self)
    }
}

/// One decision as returned by the batch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchDecisionRecord {
    /// Echo of the query; not trusted for ordering.
    #[serde(default)]
    pub query: String,
    pub decision: DecisionLabel,
    pub confidence: f64,
    pub amount: f64,
    pub justification: String,
}

/// Output schema of the batch call: one record per input query, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchDecisions {
    pub results: Vec<BatchDecisionRecord>,
}

impl Validate for BatchDecisions {
    fn validate(self) -> Result<Self, String> {
        let results = self
            .results
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                let (confidence, amount) =
                    clamp_scores(r.confidence, r.amount).map_err(|e| format!("result {i}: {e}"))?;
                r.confidence = confidence;
                r.amount = amount;
                r.justification = r.justification.trim().to_string();
                if r.justification.is_empty() {
                    return Err(format!("result {i}: justification is empty"));
                }
                Ok(r)
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Self { results })
    }
}

/// Produces structured claim decisions.
pub struct DecisionEngine {
    lm: Arc<dyn LanguageModel>,
    model: String,
    batch_model: String,
}

impl DecisionEngine {
    pub fn new(
        lm: Arc<dyn LanguageModel>,
        model: impl Into<String>,
        batch_model: impl Into<String>,
    ) -> Self {
        Self {
            lm,
            model: model.into(),
            batch_model: batch_model.into(),
        }
    }

    /// Decide a single claim from its parsed fields and candidate clauses.
    pub async fn decide(
        &self,
        parsed: &ParsedQuery,
        clauses: &[Clause],
    ) -> Result<Decision, AiError> {
        let decision: Decision = generate(
            self.lm.as_ref(),
            &self.model,
            prompts::DECISION_SYSTEM,
            prompts::decision_prompt(parsed, clauses),
        )
        .await?;
        info!(
            decision = %decision.label,
            confidence = decision.confidence,
            amount = decision.amount,
            "claim decided"
        );
        Ok(decision)
    }

    /// Decide every query in one call. The caller checks the result length.
    pub async fn decide_batch(&self, queries: &[String]) -> Result<Vec<BatchDecisionRecord>, AiError> {
        let batch: BatchDecisions = generate(
            self.lm.as_ref(),
            &self.batch_model,
            prompts::BATCH_SYSTEM,
            prompts::batch_prompt(queries),
        )
        .await?;
        Ok(batch.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use serde_json::json;

    fn engine(lm: &Arc<MockProvider>) -> DecisionEngine {
        DecisionEngine::new(lm.clone(), "gpt-4o-mini", "gpt-4o")
    }

    #[tokio::test]
    async fn clamps_out_of_range_numbers() {
        let lm = Arc::new(MockProvider::new());
        lm.push_json(&json!({
            "decision": "approved",
            "confidence": 1.4,
            "amount": -50,
            "justification": "Covered",
            "riskFactors": []
        }));
        let d = engine(&lm).decide(&ParsedQuery::default(), &[]).await.unwrap();
        assert_eq!(d.label, DecisionLabel::Approved);
        assert_eq!(d.confidence, 1.0);
        assert_eq!(d.amount, 0.0);
    }

    #[tokio::test]
    async fn unknown_label_is_schema_violation() {
        let lm = Arc::new(MockProvider::new());
        lm.push_json(&json!({
            "decision": "partially_approved",
            "confidence": 0.5,
            "amount": 10,
            "justification": "Partial",
            "riskFactors": []
        }));
        let err = engine(&lm)
            .decide(&ParsedQuery::default(), &[])
            .await
            .unwrap_err();
        assert!(err.is_schema_violation());
    }

    #[tokio::test]
    async fn empty_justification_is_schema_violation() {
        let lm = Arc::new(MockProvider::new());
        lm.push_json(&json!({
            "decision": "rejected",
            "confidence": 0.5,
            "amount": 0,
            "justification": "  ",
            "riskFactors": []
        }));
        let err = engine(&lm)
            .decide(&ParsedQuery::default(), &[])
            .await
            .unwrap_err();
        assert!(err.is_schema_violation());
    }

    #[tokio::test]
    async fn batch_uses_batch_model() {
        let lm = Arc::new(MockProvider::new());
        let records = engine(&lm)
            .decide_batch(&["knee surgery".into(), "dental cleaning".into()])
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(lm.requests()[0].model, "gpt-4o");
        assert_eq!(lm.requests()[0].schema_name(), Some("BatchDecisions"));
    }

    #[tokio::test]
    async fn batch_clamps_each_record() {
        let lm = Arc::new(MockProvider::new());
        lm.push_json(&json!({ "results": [
            { "query": "a", "decision": "approved", "confidence": 3, "amount": 100, "justification": "ok" },
            { "query": "b", "decision": "rejected", "confidence": -1, "amount": -5, "justification": "no" }
        ]}));
        let records = engine(&lm)
            .decide_batch(&["a".into(), "b".into()])
            .await
            .unwrap();
        assert_eq!(records[0].confidence, 1.0);
        assert_eq!(records[1].confidence, 0.0);
        assert_eq!(records[1].amount, 0.0);
    }
}
