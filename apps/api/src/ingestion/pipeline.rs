use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::embedding::check_dimensions;
use crate::errors::AppError;
use crate::ingestion::convert::prepare_pdf;
use crate::ingestion::extract::extract_text;
use crate::profile::structurer::structure_cv;
use crate::profile::{ordered_sections, render_profile_text};
use crate::state::AppState;
use crate::store::attachments::attachment_key;
use crate::store::candidates::NewCandidate;
use crate::store::{CandidateStore, PersistentStore};
use crate::uploads::safe_file_name;

/// A CV file as received, before any processing.
pub struct CvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct IngestOutcome {
    pub candidate_id: Uuid,
    pub file_name: String,
    /// True when the same file had been ingested before and was overwritten.
    pub re_ingested: bool,
    /// Top-level profile sections, in display order.
    pub sections: Vec<String>,
}

/// Hex SHA-256 of the uploaded bytes; identifies a re-ingest.
pub fn file_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Where an ingested CV will be written.
#[derive(Debug, PartialEq, Eq)]
pub struct StoragePlan {
    pub id: Uuid,
    pub attachment_key: String,
    pub re_ingested: bool,
}

/// A file seen before keeps its candidate id (and so its attachment key);
/// a new file gets a fresh id.
pub fn plan_storage(existing: Option<Uuid>) -> StoragePlan {
    let id = existing.unwrap_or_else(Uuid::new_v4);
    StoragePlan {
        id,
        attachment_key: attachment_key(id),
        re_ingested: existing.is_some(),
    }
}

/// Candidate fields produced by the pipeline, before an id is assigned.
pub struct CandidateRecord<'a> {
    pub file_name: &'a str,
    pub file_hash: &'a str,
    pub raw_text: &'a str,
    pub profile: &'a Value,
    pub profile_text: &'a str,
    pub embedding_model: &'a str,
    pub embedding: Vec<f32>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct StoredCandidate {
    pub id: Uuid,
    pub re_ingested: bool,
}

/// Uploads the PDF, then upserts the row. A failed upload leaves the
/// database untouched, so a row never points at a missing object.
pub async fn store_candidate(
    store: &dyn CandidateStore,
    record: CandidateRecord<'_>,
    pdf: Vec<u8>,
) -> Result<StoredCandidate, AppError> {
    let plan = plan_storage(store.find_id_by_hash(record.file_hash).await?);
    store.put_attachment(&plan.attachment_key, pdf).await?;

    let id = store
        .upsert_candidate(NewCandidate {
            id: plan.id,
            file_name: record.file_name,
            file_hash: record.file_hash,
            raw_text: record.raw_text,
            profile: record.profile,
            profile_text: record.profile_text,
            attachment_key: &plan.attachment_key,
            embedding_model: record.embedding_model,
            embedding: record.embedding,
        })
        .await?;

    Ok(StoredCandidate {
        id,
        re_ingested: plan.re_ingested,
    })
}

/// Runs the whole ingestion flow for one CV.
pub async fn ingest_cv(state: &AppState, upload: CvUpload) -> Result<IngestOutcome, AppError> {
    let file_name = safe_file_name(&upload.file_name);
    let hash = file_hash(&upload.bytes);
    info!("Ingesting CV '{file_name}' ({} bytes)", upload.bytes.len());

    // 1. Normalise to PDF and extract text
    let pdf = prepare_pdf(&state.config.tools, &file_name, &upload.bytes).await?;
    let raw_text = extract_text(&state.config.tools, pdf.clone()).await?;

    // 2. Enrich and structure
    let projects = state.github.projects_for_cv(&raw_text).await;
    let profile = structure_cv(&state.llm, &raw_text, &projects).await?;
    let profile_text = render_profile_text(&profile);
    let sections: Vec<String> = ordered_sections(&profile)
        .into_iter()
        .filter(|s| s.content.is_some())
        .map(|s| s.key.to_string())
        .collect();

    // 3. Embed the flattened profile
    let embedding = state
        .embedder
        .embed(&profile_text)
        .await
        .map_err(|e| AppError::Embedding(e.to_string()))?;
    check_dimensions(&embedding, state.config.embedding_dimensions)
        .map_err(|e| AppError::Embedding(e.to_string()))?;

    // 4. Attachment, then candidate row
    let store = PersistentStore {
        db: &state.db,
        s3: &state.s3,
        bucket: &state.config.s3_bucket,
    };
    let profile = Value::Object(profile);
    let stored = store_candidate(
        &store,
        CandidateRecord {
            file_name: &file_name,
            file_hash: &hash,
            raw_text: &raw_text,
            profile: &profile,
            profile_text: &profile_text,
            embedding_model: state.embedder.model(),
            embedding,
        },
        pdf,
    )
    .await?;

    info!(
        "Ingested '{file_name}' as candidate {}{}",
        stored.id,
        if stored.re_ingested { " (re-ingest)" } else { "" }
    );
    Ok(IngestOutcome {
        candidate_id: stored.id,
        file_name,
        re_ingested: stored.re_ingested,
        sections,
    })
}
