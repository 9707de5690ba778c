//! Prompt templates for every LLM call the service makes.

use intelliclaim_core::{Clause, Decision, ParsedQuery};

// ── System prompts ──

pub const EXTRACTION_SYSTEM: &str = "\
You are an insurance claim intake assistant. You read a short free-text claim description \
and extract structured fields. Respond ONLY with a JSON object matching the given schema.";

pub const DECISION_SYSTEM: &str = "\
You are an insurance claim adjudicator for health insurance policies. \
You decide whether a claim is approved, rejected or pending using only the parsed claim \
and the policy clauses provided. Respond ONLY with a JSON object matching the given schema.";

pub const BATCH_SYSTEM: &str = "\
You are an insurance claim adjudicator processing several claims at once. \
Return exactly one result per numbered query, in the same order. \
Respond ONLY with a JSON object matching the given schema.";

/// First line of the clause retrieval prompt.
pub const CLAUSE_RETRIEVAL_HEADER: &str = "Find clauses relevant to this insurance claim.";

// ── User prompts ──

pub fn extraction_prompt(query: &str) -> String {
    format!(
        "Parse this insurance claim query and extract key information.\n\
         \n\
         Query: \"{query}\"\n\
         \n\
         Extract:\n\
         - age: patient age if mentioned\n\
         - gender: patient gender if mentioned\n\
         - procedure: medical procedure or treatment\n\
         - location: city or location mentioned\n\
         - policyAge: how long the policy has been active\n\
         - urgency: emergency, routine, elective, etc.\n\
         \n\
         If a field is not clearly stated, leave it out. Do not guess."
    )
}

pub fn decision_prompt(parsed: &ParsedQuery, clauses: &[Clause]) -> String {
    let parsed_json = serde_json::to_string_pretty(parsed).unwrap_or_else(|_| "{}".into());
    let clause_lines = clauses
        .iter()
        .map(|c| format!("{}: {}", c.clause_id, c.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Make a claim decision based on the parsed query and the policy clauses.\n\
         \n\
         Parsed query:\n\
         {parsed_json}\n\
         \n\
         Relevant policy clauses:\n\
         {clause_lines}\n\
         \n\
         Consider:\n\
         - policy waiting periods and maturity requirements\n\
         - coverage for the specific procedure\n\
         - geographic coverage\n\
         - patient eligibility criteria\n\
         \n\
         Give the decision (approved, rejected or pending), a confidence between 0 and 1, \
         the payout amount if approved (0 otherwise), a detailed justification, the risk \
         factors that influenced the decision and any documents still required."
    )
}

pub fn narrative_prompt(query: &str, decision: &Decision) -> String {
    format!(
        "Provide additional context for this insurance claim decision.\n\
         \n\
         Query: {query}\n\
         Decision: {label}\n\
         Justification: {justification}\n\
         \n\
         Explain:\n\
         1. Which specific policy terms apply\n\
         2. Any alternative options for the patient\n\
         3. Next steps or the appeals process if applicable\n\
         \n\
         Keep it concise and professional.",
        label = decision.label,
        justification = decision.justification,
    )
}

/// Queries are flattened to one line each so the numbering stays unambiguous.
pub fn batch_prompt(queries: &[String]) -> String {
    let numbered = queries
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q.split_whitespace().collect::<Vec<_>>().join(" ")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Process these insurance claim queries in batch and decide each one.\n\
         \n\
         Queries:\n\
         {numbered}\n\
         \n\
         For each query give:\n\
         - query: the query text\n\
         - decision: approved, rejected or pending\n\
         - confidence: a score between 0 and 1\n\
         - amount: the claim amount if approved, otherwise 0\n\
         - justification: a brief explanation\n\
         \n\
         Assume standard policies with 6-month waiting periods for surgeries, coverage limits \
         of Rs 5,00,000 per year and standard exclusions (cosmetic, dental unless accidental, \
         alternative medicine)."
    )
}

pub fn clause_retrieval_prompt(query: &str, documents: &[(String, String)]) -> String {
    let context = if documents.is_empty() {
        "No policy documents were supplied; use typical health insurance policy terms.".to_string()
    } else {
        documents
            .iter()
            .map(|(name, text)| format!("Document: {name}\n{text}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        "{CLAUSE_RETRIEVAL_HEADER}\n\
         \n\
         Query: {query}\n\
         \n\
         Policy documents:\n\
         {context}\n\
         \n\
         Return a JSON array of objects with fields clauseId, document, text, \
         relevanceScore (0 to 1) and page (number or null), most relevant first."
    )
}

pub fn document_analysis_prompt(text: &str) -> String {
    format!(
        "Analyze this document and extract key information.\n\
         \n\
         Document:\n\
         {text}\n\
         \n\
         Identify:\n\
         1. Document type (policy, contract, terms, etc.)\n\
         2. Key coverage amounts and limits\n\
         3. Waiting periods and restrictions\n\
         4. Geographic coverage areas\n\
         5. Important clauses and conditions\n\
         \n\
         Provide a structured analysis."
    )
}
