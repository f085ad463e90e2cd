use tracing::debug;

use crate::models::candidate::CandidateHit;

/// Keeps hits whose similarity reaches both the static threshold and the
/// dynamic one (`mean - 0.5 * stddev` over all hits), best first.
pub fn apply_similarity_threshold(hits: Vec<CandidateHit>, threshold: f64) -> Vec<CandidateHit> {
    if hits.is_empty() {
        return hits;
    }

    let n = hits.len() as f64;
    let mean = hits.iter().map(|h| h.similarity).sum::<f64>() / n;
    let variance = hits
        .iter()
        .map(|h| (h.similarity - mean).powi(2))
        .sum::<f64>()
        / n;
    let cutoff = threshold.max(mean - 0.5 * variance.sqrt());

    let total = hits.len();
    let mut kept: Vec<CandidateHit> = hits
        .into_iter()
        .filter(|h| h.similarity >= cutoff)
        .collect();
    kept.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    debug!(
        "Similarity cutoff {cutoff:.4} (mean {mean:.4}) kept {}/{total} candidates",
        kept.len()
    );
    kept
}
