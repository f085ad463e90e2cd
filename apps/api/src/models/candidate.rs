use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored candidate, without its embedding.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub file_name: String,
    pub file_hash: String,
    pub raw_text: String,
    pub profile: Value,
    pub profile_text: String,
    pub attachment_key: String,
    pub embedding_model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One nearest-neighbour hit. `similarity = 1 - cosine distance`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CandidateHit {
    pub id: Uuid,
    pub profile_text: String,
    pub similarity: f64,
}
