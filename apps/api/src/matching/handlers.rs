use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::ingestion::extract::extract_text;
use crate::matching::pipeline::{match_candidates, NO_JOB_DESCRIPTION};
use crate::matching::MatchResult;
use crate::state::AppState;
use crate::uploads::{collect_fields, extension, FormField};

#[derive(Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub job_description: String,
}

/// POST /analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<MatchResult>>, AppError> {
    let job_description = job_description_from_form(&state, multipart).await?;
    Ok(Json(match_candidates(&state, &job_description).await?))
}

/// POST /api/v1/matches
pub async fn handle_matches(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<Vec<MatchResult>>, AppError> {
    Ok(Json(match_candidates(&state, &req.job_description).await?))
}

/// Reads the job description from a `job_text` / `job_file` form.
/// A non-empty `job_file` takes precedence over `job_text`.
pub async fn job_description_from_form(
    state: &AppState,
    multipart: Multipart,
) -> Result<String, AppError> {
    let fields = collect_fields(multipart).await?;

    let text = match fields
        .iter()
        .find(|f| f.name == "job_file" && f.is_nonempty_file())
    {
        Some(file) => job_file_text(state, file).await?,
        None => match fields.iter().find(|f| f.name == "job_text") {
            Some(field) => field.text()?,
            None => String::new(),
        },
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(NO_JOB_DESCRIPTION.to_string()));
    }
    Ok(text.to_string())
}

async fn job_file_text(state: &AppState, file: &FormField) -> Result<String, AppError> {
    let file_name = file.file_name.as_deref().unwrap_or_default();
    match extension(file_name).as_deref() {
        Some("txt") => file.text(),
        Some("pdf") => extract_text(&state.config.tools, file.bytes.to_vec()).await,
        _ => Err(AppError::Validation(format!(
            "Unsupported job description file '{file_name}'. Accepted: txt, pdf"
        ))),
    }
}
