use tracing::info;

use crate::embedding::check_dimensions;
use crate::errors::AppError;
use crate::matching::rerank::rerank;
use crate::matching::retrieval::apply_similarity_threshold;
use crate::matching::MatchResult;
use crate::state::AppState;
use crate::store::candidates::nearest_candidates;

pub const NO_JOB_DESCRIPTION: &str = "No job description provided.";

/// Embeds the job description, retrieves the nearest candidates and
/// re-ranks them. Results are sorted by descending score.
pub async fn match_candidates(
    state: &AppState,
    job_description: &str,
) -> Result<Vec<MatchResult>, AppError> {
    let job_description = job_description.trim();
    if job_description.is_empty() {
        return Err(AppError::Validation(NO_JOB_DESCRIPTION.to_string()));
    }

    let embedding = state
        .embedder
        .embed(job_description)
        .await
        .map_err(|e| AppError::Embedding(e.to_string()))?;
    check_dimensions(&embedding, state.config.embedding_dimensions)
        .map_err(|e| AppError::Embedding(e.to_string()))?;

    let hits = nearest_candidates(&state.db, embedding, state.config.retrieval_top_k).await?;
    let retrieved = hits.len();
    let hits = apply_similarity_threshold(hits, state.config.similarity_threshold);
    info!(
        "Retrieved {retrieved} candidates, {} above the similarity cutoff",
        hits.len()
    );

    let results = rerank(&state.llm, job_description, &hits).await?;
    info!("Returning {} ranked candidates", results.len());
    Ok(results)
}
