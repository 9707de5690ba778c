//! Single-query claim types: the parsed query, candidate clauses, the decision
//! and the assembled result envelope.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured fields extracted from a free-text claim query.
///
/// Every field is independently optional; a field the query does not clearly
/// mention stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    /// Patient age if mentioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    /// Patient gender if mentioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Medical procedure or treatment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    /// City or location mentioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// How long the policy has been active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_age: Option<String>,
    /// Emergency, routine, elective, etc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
}

impl ParsedQuery {
    /// Trim every field and drop the ones left empty.
    ///
    /// Models frequently answer "" or "  " for fields they could not find.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            age: clean(self.age),
            gender: clean(self.gender),
            procedure: clean(self.procedure),
            location: clean(self.location),
            policy_age: clean(self.policy_age),
            urgency: clean(self.urgency),
        }
    }

    /// Number of fields that were extracted.
    pub fn field_count(&self) -> usize {
        [
            &self.age,
            &self.gender,
            &self.procedure,
            &self.location,
            &self.policy_age,
            &self.urgency,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
    }
}

/// A snippet of policy text offered to the decision engine as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    /// Unique within one response, not globally.
    pub clause_id: String,
    pub document: String,
    pub text: String,
    /// In `[0, 1]`.
    pub relevance_score: f32,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Outcome label of a claim decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecisionLabel {
    Approved,
    Rejected,
    Pending,
}

impl DecisionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for DecisionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured claim decision.
///
/// `amount` is only authoritative when `label` is [`DecisionLabel::Approved`];
/// for rejected and pending decisions it is passed through as the model
/// reported it and should be read as an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    #[serde(rename = "decision")]
    pub label: DecisionLabel,
    /// Model self-assessed certainty in `[0, 1]`.
    pub confidence: f64,
    /// Payout amount, `>= 0`.
    pub amount: f64,
    pub justification: String,
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub required_documents: Vec<String>,
}

/// The document fields the pipeline reads from an uploaded document.
///
/// Accepts a full `UploadedDocument` JSON object; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContext {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extracted_text: String,
}

/// Response envelope of `POST /process-query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub id: u64,
    pub query: String,
    /// RFC 3339 timestamp string.
    pub timestamp: String,
    pub parsed_query: ParsedQuery,
    #[serde(flatten)]
    pub decision: Decision,
    /// Absent when the narrative step failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    pub relevant_clauses: Vec<Clause>,
    pub processing_time: String,
    pub documents_searched: usize,
}
