use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::ingestion::pipeline::{ingest_cv, CvUpload, IngestOutcome};
use crate::state::AppState;
use crate::uploads::collect_fields;

/// POST /api/v1/candidates
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<IngestOutcome>), AppError> {
    let fields = collect_fields(multipart).await?;
    let field = fields
        .into_iter()
        .find(|f| f.name == "cv" && f.file_name.is_some())
        .ok_or_else(|| AppError::Validation("Missing 'cv' file field".to_string()))?;

    let upload = CvUpload {
        file_name: field.file_name.unwrap_or_default(),
        bytes: field.bytes.to_vec(),
    };
    let outcome = ingest_cv(&state, upload).await?;
    let status = if outcome.re_ingested {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}
