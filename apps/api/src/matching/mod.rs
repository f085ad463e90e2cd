//! Search: job description → embedding → nearest candidates → LLM re-rank.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod rerank;
pub mod retrieval;

use serde::Serialize;
use uuid::Uuid;

/// One ranked candidate for a job description. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub id: Uuid,
    pub score: f64,
    pub reason: String,
    /// Retrieval similarity; only used to break score ties.
    #[serde(skip_serializing)]
    pub similarity: f64,
}

/// Descending score, then descending similarity.
pub fn sort_by_score_desc(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.similarity.total_cmp(&a.similarity))
    });
}
