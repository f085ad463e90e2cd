//! Embeddings: pluggable, trait-based text → vector conversion.
//!
//! Default: `OpenAiEmbedder` (any OpenAI-compatible `/embeddings` endpoint).
//! `AppState` holds an `Arc<dyn Embedder>`, optionally wrapped in the Redis
//! cache from `cache.rs`.

pub mod cache;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::llm_client::truncate_chars;

/// Inputs beyond this many characters are cut before embedding.
pub const MAX_INPUT_CHARS: usize = 24_000;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding response contained no vectors")]
    Empty,

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    Dimensions { expected: usize, actual: usize },

    #[error("Cannot embed empty text")]
    EmptyInput,
}

/// Converts text into a fixed-length vector.
///
/// Carried in `AppState` as `Arc<dyn Embedder>`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, stored alongside every embedding.
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAiEmbedder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        dimensions: usize,
    ) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = prepare_input(text)?;
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::Empty)?;
        check_dimensions(&vector, self.dimensions)?;

        debug!("Embedded {} characters with {}", input.len(), self.model);
        Ok(vector)
    }
}

/// Trims and truncates embedding input; blank input is an error.
pub fn prepare_input(text: &str) -> Result<&str, EmbeddingError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }
    Ok(truncate_chars(text, MAX_INPUT_CHARS))
}

pub fn check_dimensions(vector: &[f32], expected: usize) -> Result<(), EmbeddingError> {
    if vector.len() != expected {
        return Err(EmbeddingError::Dimensions {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_input_rejects_blank() {
        assert!(matches!(prepare_input("  \n"), Err(EmbeddingError::EmptyInput)));
    }

    #[test]
    fn test_prepare_input_truncates() {
        let long = "a".repeat(MAX_INPUT_CHARS + 10);
        assert_eq!(prepare_input(&long).unwrap().len(), MAX_INPUT_CHARS);
        assert_eq!(prepare_input("  job  ").unwrap(), "job");
    }

    #[test]
    fn test_check_dimensions() {
        assert!(check_dimensions(&[0.0; 3], 3).is_ok());
        let err = check_dimensions(&[0.0; 2], 3).unwrap_err();
        assert_eq!(err.to_string(), "Embedding has 2 dimensions, expected 3");
    }

    #[test]
    fn test_response_parsing_takes_first_vector() {
        let parsed: EmbeddingResponse = serde_json::from_str(
            r#"{"object": "list", "data": [{"object": "embedding", "index": 0, "embedding": [0.1, -0.2]}],
                "model": "text-embedding-ada-002", "usage": {"prompt_tokens": 3, "total_tokens": 3}}"#,
        )
        .unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, -0.2]);
    }

    #[tokio::test]
    async fn test_blank_input_never_hits_network() {
        let embedder = OpenAiEmbedder::new(
            "key".into(),
            "http://127.0.0.1:9/v1/".into(),
            "text-embedding-ada-002".into(),
            1536,
        )
        .unwrap();
        assert!(matches!(embedder.embed("   ").await, Err(EmbeddingError::EmptyInput)));
        assert_eq!(embedder.model(), "text-embedding-ada-002");
    }
}
