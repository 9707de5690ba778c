//! Schema-constrained generation.
//!
//! [`generate`] derives a JSON schema for the target type, asks the provider
//! for output conforming to it, then parses and validates what comes back so
//! malformed output fails fast as [`AiError::SchemaViolation`].

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::AiError;
use crate::provider::{CompletionRequest, LanguageModel, OutputSchema};

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid fence regex"));

/// Post-deserialization checks and coercions for generated types.
///
/// Returns the (possibly clamped) value or a reason the value is unusable.
pub trait Validate: Sized {
    fn validate(self) -> Result<Self, String>;
}

/// Build the [`OutputSchema`] for `T`.
pub fn output_schema<T: JsonSchema>() -> OutputSchema {
    let schema = schemars::schema_for!(T);
    OutputSchema {
        name: T::schema_name().to_string(),
        schema: serde_json::to_value(schema).unwrap_or(Value::Null),
    }
}

/// Request a `T` from the model and validate it.
pub async fn generate<T>(
    lm: &dyn LanguageModel,
    model: &str,
    system: &str,
    prompt: String,
) -> Result<T, AiError>
where
    T: DeserializeOwned + JsonSchema + Validate,
{
    let schema = output_schema::<T>();
    let name = schema.name.clone();
    let request = CompletionRequest::text(model, prompt)
        .with_system(system)
        .with_temperature(0.0)
        .with_schema(schema);

    let raw = lm.complete(&request).await?;
    let value = extract_json_from_text(&raw).ok_or_else(|| {
        warn!(schema = %name, raw = %truncate(&raw, 200), "no JSON in model output");
        AiError::schema_violation(&name, "no valid JSON found in model output")
    })?;

    let parsed: T = serde_json::from_value(value)
        .map_err(|e| AiError::schema_violation(&name, e.to_string()))?;
    parsed
        .validate()
        .map_err(|reason| AiError::schema_violation(&name, reason))
}

/// Request free text from the model. Empty output is an error.
pub async fn generate_text(
    lm: &dyn LanguageModel,
    model: &str,
    prompt: String,
    temperature: Option<f32>,
) -> Result<String, AiError> {
    let mut request = CompletionRequest::text(model, prompt);
    request.temperature = temperature;
    let text = lm.complete(&request).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(AiError::EmptyText);
    }
    Ok(text.to_string())
}

/// Pull a JSON value out of model output.
///
/// Accepts bare JSON, JSON inside a Markdown code fence, or JSON surrounded
/// by prose (outermost `{...}` or `[...]`).
pub fn extract_json_from_text(s: &str) -> Option<Value> {
    let t = s.trim().trim_matches('\u{feff}');

    if let Ok(v) = serde_json::from_str::<Value>(t) {
        return Some(v);
    }

    for cap in FENCED_BLOCK.captures_iter(t) {
        if let Ok(v) = serde_json::from_str::<Value>(cap[1].trim()) {
            return Some(v);
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(i), Some(j)) = (t.find(open), t.rfind(close))
            && i < j
            && let Ok(v) = serde_json::from_str::<Value>(&t[i..=j])
        {
            return Some(v);
        }
    }

    None
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Score {
        value: f64,
    }

    impl Validate for Score {
        fn validate(self) -> Result<Self, String> {
            if self.value.is_nan() {
                return Err("value is NaN".into());
            }
            Ok(Self {
                value: self.value.clamp(0.0, 1.0),
            })
        }
    }

    #[test]
    fn extract_bare_object() {
        let v = extract_json_from_text(r#"{"a": 1}"#).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn extract_fenced_block() {
        let text = "Here you go:\n```json\n{\"decision\": \"approved\"}\n```\nThanks";
        let v = extract_json_from_text(text).unwrap();
        assert_eq!(v["decision"], "approved");
    }

    #[test]
    fn extract_object_inside_prose() {
        let v = extract_json_from_text("Result: {\"x\": [1, 2]} end").unwrap();
        assert_eq!(v["x"][1], 2);
    }

    #[test]
    fn extract_array_inside_prose() {
        let v = extract_json_from_text("Clauses: [{\"clauseId\": \"C1\"}]").unwrap();
        assert_eq!(v[0]["clauseId"], "C1");
    }

    #[test]
    fn extract_nothing_from_prose() {
        assert!(extract_json_from_text("The claim is approved.").is_none());
    }

    #[test]
    fn output_schema_is_named_after_type() {
        let schema = output_schema::<Score>();
        assert_eq!(schema.name, "Score");
        assert_eq!(schema.schema["properties"]["value"]["type"], "number");
    }

    #[tokio::test]
    async fn generate_clamps_via_validate() {
        let lm = MockProvider::new();
        lm.push_response(r#"{"value": 1.7}"#);
        let score: Score = generate(&lm, "m", "sys", "p".into()).await.unwrap();
        assert_eq!(score.value, 1.0);
    }

    #[tokio::test]
    async fn generate_sends_schema_to_provider() {
        let lm = MockProvider::new();
        lm.push_response(r#"{"value": 0.5}"#);
        let _: Score = generate(&lm, "m", "sys", "p".into()).await.unwrap();
        let requests = lm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].schema_name(), Some("Score"));
        assert_eq!(requests[0].system_prompt.as_deref(), Some("sys"));
    }

    #[tokio::test]
    async fn generate_rejects_wrong_shape() {
        let lm = MockProvider::new();
        lm.push_response(r#"{"value": "high"}"#);
        let err = generate::<Score>(&lm, "m", "sys", "p".into())
            .await
            .unwrap_err();
        assert!(err.is_schema_violation(), "got {err:?}");
    }

    #[tokio::test]
    async fn generate_rejects_non_json() {
        let lm = MockProvider::new();
        lm.push_response("I cannot answer that.");
        let err = generate::<Score>(&lm, "m", "sys", "p".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::SchemaViolation { .. }));
    }

    #[tokio::test]
    async fn generate_propagates_provider_failure() {
        let lm = MockProvider::new();
        lm.push_failure("rate limited");
        let err = generate::<Score>(&lm, "m", "sys", "p".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Provider(_)));
    }

    #[tokio::test]
    async fn generate_text_trims_and_rejects_empty() {
        let lm = MockProvider::new();
        lm.push_response("  Appeal within 30 days.  ");
        lm.push_response("   ");
        let text = generate_text(&lm, "m", "p".into(), None).await.unwrap();
        assert_eq!(text, "Appeal within 30 days.");
        let err = generate_text(&lm, "m", "p".into(), None).await.unwrap_err();
        assert!(matches!(err, AiError::EmptyText));
    }
}
