//! Persistence: candidate rows in PostgreSQL (pgvector) and CV attachments in S3.

pub mod attachments;
pub mod candidates;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use candidates::NewCandidate;

/// The writes one ingest performs, behind a seam so the pipeline's ordering
/// can be exercised without PostgreSQL or S3.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn find_id_by_hash(&self, file_hash: &str) -> Result<Option<Uuid>, AppError>;

    async fn put_attachment(&self, key: &str, pdf: Vec<u8>) -> Result<(), AppError>;

    async fn upsert_candidate(&self, candidate: NewCandidate<'_>) -> Result<Uuid, AppError>;
}

/// PostgreSQL rows plus S3 attachments.
pub struct PersistentStore<'a> {
    pub db: &'a PgPool,
    pub s3: &'a S3Client,
    pub bucket: &'a str,
}

#[async_trait]
impl CandidateStore for PersistentStore<'_> {
    async fn find_id_by_hash(&self, file_hash: &str) -> Result<Option<Uuid>, AppError> {
        Ok(candidates::find_id_by_hash(self.db, file_hash).await?)
    }

    async fn put_attachment(&self, key: &str, pdf: Vec<u8>) -> Result<(), AppError> {
        attachments::put_attachment(self.s3, self.bucket, key, pdf).await
    }

    async fn upsert_candidate(&self, candidate: NewCandidate<'_>) -> Result<Uuid, AppError> {
        Ok(candidates::upsert_candidate(self.db, candidate).await?)
    }
}
