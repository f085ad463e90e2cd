//! LLM re-ranking of retrieved candidates.
//!
//! The model only ever scores candidates we retrieved: unknown ids are
//! dropped, duplicates keep their first ranking, scores are clamped.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::NO_FABRICATION_INSTRUCTION;
use crate::llm_client::{fill_template, truncate_chars, CallOptions, LlmClient};
use crate::matching::prompts::{RERANK_PROMPT, RERANK_SYSTEM};
use crate::matching::{sort_by_score_desc, MatchResult};
use crate::models::candidate::CandidateHit;

/// Each candidate profile is cut to this many characters in the prompt.
pub const MAX_PROFILE_CHARS: usize = 4_000;

const RERANK_OPTIONS: CallOptions = CallOptions {
    max_tokens: 4096,
    temperature: 0.0,
};

#[derive(Debug, Default, Deserialize)]
pub struct RawRankings {
    #[serde(default)]
    pub rankings: Vec<RawRanking>,
}

/// A ranking as the model returned it. Fields stay loosely typed: ids and
/// scores sometimes come back as numbers or strings.
#[derive(Debug, Default, Deserialize)]
pub struct RawRanking {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub reason: Value,
}

pub fn build_rerank_prompt(job_description: &str, hits: &[CandidateHit]) -> String {
    let candidates = hits
        .iter()
        .map(|hit| {
            format!(
                "--- CANDIDATE ---\nid: {}\nsimilarity: {:.4}\nprofile:\n{}\n",
                hit.id,
                hit.similarity,
                truncate_chars(hit.profile_text.trim(), MAX_PROFILE_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    fill_template(
        RERANK_PROMPT,
        &[
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("job_description", job_description.trim()),
            ("candidates", &candidates),
        ],
    )
}

/// Scores the retrieved candidates against the job description.
pub async fn rerank(
    llm: &LlmClient,
    job_description: &str,
    hits: &[CandidateHit],
) -> Result<Vec<MatchResult>, AppError> {
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let prompt = build_rerank_prompt(job_description, hits);
    info!("Re-ranking {} candidates", hits.len());

    let raw: RawRankings = llm
        .call_json(&prompt, RERANK_SYSTEM, RERANK_OPTIONS)
        .await
        .map_err(|e| AppError::Llm(format!("Candidate re-ranking failed: {e}")))?;

    Ok(merge_rankings(hits, raw.rankings))
}

/// Joins model rankings with the retrieved hits, sorted best first with
/// scores rounded to four decimals.
pub fn merge_rankings(hits: &[CandidateHit], rankings: Vec<RawRanking>) -> Vec<MatchResult> {
    let similarity: HashMap<Uuid, f64> = hits.iter().map(|h| (h.id, h.similarity)).collect();
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for ranking in rankings {
        let Some(id) = parse_id(&ranking.id) else {
            warn!("Dropping ranking with invalid id: {}", ranking.id);
            continue;
        };
        let Some(&sim) = similarity.get(&id) else {
            warn!("Dropping ranking for unknown candidate {id}");
            continue;
        };
        let Some(score) = parse_score(&ranking.score) else {
            warn!("Dropping ranking for {id} with invalid score: {}", ranking.score);
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        results.push(MatchResult {
            id,
            score: score.clamp(0.0, 1.0),
            reason: ranking.reason.as_str().unwrap_or_default().trim().to_string(),
            similarity: sim,
        });
    }

    let omitted = hits.len() - results.len();
    if omitted > 0 {
        warn!("Re-ranker omitted {omitted} retrieved candidate(s)");
    }

    sort_by_score_desc(&mut results);
    for result in &mut results {
        result.score = round4(result.score);
    }
    results
}

fn parse_id(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok())
}

fn parse_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    score.is_finite().then_some(score)
}

fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(n: u128, similarity: f64) -> CandidateHit {
        CandidateHit {
            id: Uuid::from_u128(n),
            profile_text: format!("Personal Information:\n  full_name: Candidate {n}"),
            similarity,
        }
    }

    fn rankings(value: Value) -> Vec<RawRanking> {
        serde_json::from_value::<RawRankings>(value).unwrap().rankings
    }

    #[test]
    fn test_merge_drops_unknown_and_invalid_ids() {
        let hits = vec![hit(1, 0.8), hit(2, 0.7)];
        let raw = rankings(json!({"rankings": [
            {"id": Uuid::from_u128(1).to_string(), "score": 0.6, "reason": "ok"},
            {"id": Uuid::from_u128(99).to_string(), "score": 0.99, "reason": "ghost"},
            {"id": "candidate-2", "score": 0.9, "reason": "bad id"},
            {"id": 2, "score": 0.9, "reason": "numeric id"}
        ]}));
        let merged = merge_rankings(&hits, raw);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, Uuid::from_u128(1));
        assert_eq!(merged[0].reason, "ok");
    }

    #[test]
    fn test_merge_clamps_dedupes_and_sorts() {
        let hits = vec![hit(1, 0.8), hit(2, 0.7), hit(3, 0.75)];
        let raw = rankings(json!({"rankings": [
            {"id": Uuid::from_u128(2).to_string(), "score": 1.7, "reason": "great"},
            {"id": Uuid::from_u128(1).to_string(), "score": "0.123456", "reason": " fine "},
            {"id": Uuid::from_u128(2).to_string(), "score": 0.1, "reason": "duplicate"},
            {"id": Uuid::from_u128(3).to_string(), "score": -0.4}
        ]}));
        let merged = merge_rankings(&hits, raw);
        let scores: Vec<f64> = merged.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![1.0, 0.1235, 0.0]);
        assert_eq!(merged[0].reason, "great");
        assert_eq!(merged[1].reason, "fine");
        assert_eq!(merged[2].reason, "");
    }

    #[test]
    fn test_merge_drops_missing_scores_and_omitted_candidates() {
        let hits = vec![hit(1, 0.8), hit(2, 0.7)];
        let raw = rankings(json!({"rankings": [
            {"id": Uuid::from_u128(1).to_string(), "reason": "no score"}
        ]}));
        assert!(merge_rankings(&hits, raw).is_empty());
        assert!(rankings(json!({})).is_empty());
    }

    #[test]
    fn test_equal_scores_break_on_similarity() {
        let hits = vec![hit(1, 0.70), hit(2, 0.90)];
        let raw = rankings(json!({"rankings": [
            {"id": Uuid::from_u128(1).to_string(), "score": 0.8, "reason": "a"},
            {"id": Uuid::from_u128(2).to_string(), "score": 0.8, "reason": "b"}
        ]}));
        let merged = merge_rankings(&hits, raw);
        assert_eq!(merged[0].id, Uuid::from_u128(2));
    }

    #[test]
    fn test_prompt_truncates_profiles() {
        let mut long = hit(1, 0.81234);
        long.profile_text = "x".repeat(MAX_PROFILE_CHARS + 500);
        let prompt = build_rerank_prompt("  Senior Rust engineer  ", &[long]);
        assert!(prompt.contains("JOB DESCRIPTION:\nSenior Rust engineer\n"));
        assert!(prompt.contains(&format!("id: {}", Uuid::from_u128(1))));
        assert!(prompt.contains("similarity: 0.8123"));
        assert!(prompt.contains(&"x".repeat(MAX_PROFILE_CHARS)));
        assert!(!prompt.contains(&"x".repeat(MAX_PROFILE_CHARS + 1)));
        assert!(!prompt.contains("{candidates}"));
    }

    #[test]
    fn test_profile_text_cannot_pull_in_job_description() {
        let mut injected = hit(1, 0.8);
        injected.profile_text = "Notes: {job_description}".into();
        let prompt = build_rerank_prompt("SECRET_JD_TEXT", &[injected]);
        assert_eq!(prompt.matches("SECRET_JD_TEXT").count(), 1);
        assert!(prompt.contains("Notes: {job_description}"));
    }

    #[tokio::test]
    async fn test_no_hits_skips_llm() {
        let llm = LlmClient::with_api_url("key".into(), "http://127.0.0.1:9".into()).unwrap();
        assert!(rerank(&llm, "Rust", &[]).await.unwrap().is_empty());
    }
}
