use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::handlers::job_description_from_form;
use crate::matching::pipeline::match_candidates;
use crate::state::AppState;
use crate::store::attachments::get_attachment;
use crate::store::candidates::get_candidate;
use crate::uploads::safe_file_name;
use crate::web::pages::{candidate_page, index_page, results_page};

#[derive(Deserialize)]
pub struct CvQuery {
    #[serde(default)]
    pub download: bool,
}

/// GET /
pub async fn handle_index() -> Html<String> {
    Html(index_page())
}

/// POST /results
pub async fn handle_results(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let job_description = job_description_from_form(&state, multipart).await?;
    let results = match_candidates(&state, &job_description).await?;
    Ok(Html(results_page(&job_description, &results)))
}

/// GET /candidates/:id
pub async fn handle_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let candidate = get_candidate(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    Ok(Html(candidate_page(&candidate)))
}

/// GET /cv/:id
pub async fn handle_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CvQuery>,
) -> Result<Response, AppError> {
    let candidate = get_candidate(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    let pdf = get_attachment(&state.s3, &state.config.s3_bucket, &candidate.attachment_key).await?;

    let disposition = content_disposition(&candidate.file_name, query.download);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// `attachment` when downloading, `inline` otherwise; always names a `.pdf`.
pub fn content_disposition(file_name: &str, download: bool) -> String {
    let kind = if download { "attachment" } else { "inline" };
    let name = safe_file_name(file_name);
    let stem = std::path::Path::new(&name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cv");
    format!("{kind}; filename=\"{stem}.pdf\"")
}
