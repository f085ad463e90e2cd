use pgvector::Vector;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::candidate::{CandidateHit, CandidateRow};

/// Everything written for one ingested CV.
pub struct NewCandidate<'a> {
    pub id: Uuid,
    pub file_name: &'a str,
    pub file_hash: &'a str,
    pub raw_text: &'a str,
    pub profile: &'a serde_json::Value,
    pub profile_text: &'a str,
    pub attachment_key: &'a str,
    pub embedding_model: &'a str,
    pub embedding: Vec<f32>,
}

/// Id of the candidate previously ingested from a file with this hash.
pub async fn find_id_by_hash(pool: &PgPool, file_hash: &str) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM candidates WHERE file_hash = $1")
        .bind(file_hash)
        .fetch_optional(pool)
        .await
}

/// Inserts the candidate, or overwrites profile and embedding in place when
/// the same file was ingested before. Returns the stored id.
pub async fn upsert_candidate(pool: &PgPool, candidate: NewCandidate<'_>) -> Result<Uuid, sqlx::Error> {
    let NewCandidate {
        id,
        file_name,
        file_hash,
        raw_text,
        profile,
        profile_text,
        attachment_key,
        embedding_model,
        embedding,
    } = candidate;

    let stored: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO candidates
            (id, file_name, file_hash, raw_text, profile, profile_text,
             attachment_key, embedding_model, embedding)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (file_hash) DO UPDATE SET
            file_name = EXCLUDED.file_name,
            raw_text = EXCLUDED.raw_text,
            profile = EXCLUDED.profile,
            profile_text = EXCLUDED.profile_text,
            attachment_key = EXCLUDED.attachment_key,
            embedding_model = EXCLUDED.embedding_model,
            embedding = EXCLUDED.embedding,
            updated_at = now()
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(file_name)
    .bind(file_hash)
    .bind(raw_text)
    .bind(profile)
    .bind(profile_text)
    .bind(attachment_key)
    .bind(embedding_model)
    .bind(Vector::from(embedding))
    .fetch_one(pool)
    .await?;

    info!("Stored candidate {stored} ({file_name})");
    Ok(stored)
}

pub async fn get_candidate(pool: &PgPool, id: Uuid) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        SELECT id, file_name, file_hash, raw_text, profile, profile_text,
               attachment_key, embedding_model, created_at, updated_at
        FROM candidates
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// The `limit` candidates closest to `embedding` by cosine distance.
pub async fn nearest_candidates(
    pool: &PgPool,
    embedding: Vec<f32>,
    limit: i64,
) -> Result<Vec<CandidateHit>, sqlx::Error> {
    sqlx::query_as::<_, CandidateHit>(
        r#"
        SELECT id, profile_text, 1 - (embedding <=> $1) AS similarity
        FROM candidates
        ORDER BY embedding <=> $1
        LIMIT $2
        "#,
    )
    .bind(Vector::from(embedding))
    .bind(limit)
    .fetch_all(pool)
    .await
}
