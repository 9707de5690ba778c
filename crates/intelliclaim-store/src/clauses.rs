//! Clause stores: query (+ documents) → candidate clauses, most relevant first.
//!
//! None of these is a real retrieval engine. [`StaticClauses`] returns a fixed
//! policy set; [`DocumentClauses`] splits uploaded text on section headings and
//! ranks sections by word overlap with the query.

use std::cmp::Ordering;
use std::sync::LazyLock;

use async_trait::async_trait;
use intelliclaim_core::{Clause, DocumentContext};
use regex::Regex;
use tracing::debug;

use crate::error::StoreError;
use crate::tokenize::{overlap_score, tokenize};

/// Source of candidate clauses for a claim.
///
/// Implementations return clauses sorted by descending `relevance_score`.
#[async_trait]
pub trait ClauseStore: Send + Sync {
    async fn retrieve(
        &self,
        query: &str,
        documents: &[DocumentContext],
    ) -> Result<Vec<Clause>, StoreError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Sort clauses by descending relevance, ties keep their input order.
pub fn sort_by_relevance(clauses: &mut [Clause]) {
    clauses.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
}

// ── StaticClauses ──

/// The fixed three-clause policy set, returned for every query.
#[derive(Debug, Clone)]
pub struct StaticClauses {
    clauses: Vec<Clause>,
}

impl Default for StaticClauses {
    fn default() -> Self {
        let clauses = vec![
            Clause {
                clause_id: "C-001".into(),
                document: "Policy Terms & Conditions".into(),
                text: "Orthopedic procedures including knee surgery are covered under Section 4.2 after completion of waiting period.".into(),
                relevance_score: 0.94,
                page: Some(12),
            },
            Clause {
                clause_id: "C-015".into(),
                document: "Coverage Guidelines".into(),
                text: "Surgical procedures require minimum 6-month policy maturity for coverage eligibility.".into(),
                relevance_score: 0.89,
                page: Some(8),
            },
            Clause {
                clause_id: "C-023".into(),
                document: "Geographic Coverage".into(),
                text: "Treatment in Tier-1 and Tier-2 cities including major metros is covered under standard rates.".into(),
                relevance_score: 0.82,
                page: Some(15),
            },
        ];
        Self::new(clauses)
    }
}

impl StaticClauses {
    pub fn new(mut clauses: Vec<Clause>) -> Self {
        sort_by_relevance(&mut clauses);
        Self { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

#[async_trait]
impl ClauseStore for StaticClauses {
    async fn retrieve(&self, _: &str, _: &[DocumentContext]) -> Result<Vec<Clause>, StoreError> {
        Ok(self.clauses.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// ── DocumentClauses ──

static NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:section|clause)\s+\d+(?:\.\d+)*\b").expect("valid heading regex")
});
static TITLE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z ]{2,40}:$").expect("valid title regex"));

/// Minimum overlap score for a section to be offered.
const MIN_SCORE: f32 = 0.1;
/// Sections shorter than this many words are skipped.
const MIN_WORDS: usize = 5;

/// A heading-delimited section of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// Ranks sections of the supplied documents by word overlap with the query.
///
/// Falls back to [`StaticClauses`] when no document is supplied or no section
/// clears the score threshold.
#[derive(Debug, Clone)]
pub struct DocumentClauses {
    fallback: StaticClauses,
    max_clauses: usize,
}

impl DocumentClauses {
    pub fn new(fallback: StaticClauses, max_clauses: usize) -> Self {
        Self {
            fallback,
            max_clauses: max_clauses.max(1),
        }
    }

    /// Rank sections of `documents` against `query` without falling back.
    pub fn rank(&self, query: &str, documents: &[DocumentContext]) -> Vec<Clause> {
        let query_words = tokenize(query);
        let mut clauses = Vec::new();
        let mut seq = 0usize;

        for doc in documents {
            for section in split_sections(&doc.extracted_text) {
                seq += 1;
                if section.body.split_whitespace().count() < MIN_WORDS {
                    continue;
                }
                let scored = format!("{} {}", section.heading, section.body);
                let score = overlap_score(&query_words, &scored).min(1.0);
                if score < MIN_SCORE {
                    continue;
                }
                clauses.push(Clause {
                    clause_id: format!("C{seq:03}"),
                    document: doc.name.clone(),
                    text: format!("{}: {}", section.heading, section.body),
                    relevance_score: (score * 100.0).round() / 100.0,
                    page: None,
                });
            }
        }

        sort_by_relevance(&mut clauses);
        clauses.truncate(self.max_clauses);
        clauses
    }
}

#[async_trait]
impl ClauseStore for DocumentClauses {
    async fn retrieve(
        &self,
        query: &str,
        documents: &[DocumentContext],
    ) -> Result<Vec<Clause>, StoreError> {
        let ranked = self.rank(query, documents);
        if ranked.is_empty() {
            debug!(documents = documents.len(), "no document clauses matched, using static set");
            return self.fallback.retrieve(query, documents).await;
        }
        debug!(clauses = ranked.len(), "document clauses matched");
        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "documents"
    }
}

/// Split text into sections at `Section N` / `Clause N` lines and short
/// `Title:` lines. Text before the first heading is dropped.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if NUMBERED_HEADING.is_match(line) || TITLE_HEADING.is_match(line) {
            if let Some(last) = sections.last_mut() {
                last.body = body.join(" ");
            }
            body.clear();
            sections.push(Section {
                heading: line.trim_end_matches(':').trim().to_string(),
                body: String::new(),
            });
        } else if !sections.is_empty() {
            body.push(line);
        }
    }
    if let Some(last) = sections.last_mut() {
        last.body = body.join(" ");
    }

    sections
}
