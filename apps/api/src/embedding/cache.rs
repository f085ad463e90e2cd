//! Redis-backed embedding cache.
//!
//! Repeated job descriptions (and re-ingested CVs) reuse the stored vector.
//! The cache never fails a request: Redis errors are logged and the call
//! falls through to the wrapped embedder. A cached vector of the wrong
//! length counts as a miss.

use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::embedding::{check_dimensions, prepare_input, Embedder, EmbeddingError};

pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    redis: redis::Client,
    ttl_secs: u64,
    dimensions: usize,
}

impl CachedEmbedder {
    pub fn new(
        inner: Arc<dyn Embedder>,
        redis: redis::Client,
        ttl_secs: u64,
        dimensions: usize,
    ) -> Self {
        Self {
            inner,
            redis,
            ttl_secs,
            dimensions,
        }
    }

    async fn lookup(&self, key: &str) -> redis::RedisResult<Option<Vec<f32>>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key).await?;
        Ok(cached.and_then(|payload| serde_json::from_str(&payload).ok()))
    }

    async fn store(&self, key: &str, vector: &[f32]) -> redis::RedisResult<()> {
        let payload = serde_json::to_string(vector).unwrap_or_default();
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
    }
}

/// `embedding:{model}:{sha256(text)}`. Text is normalised the same way the
/// embedder normalises it, so equivalent inputs share an entry.
pub fn cache_key(model: &str, text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("embedding:{model}:{}", hex::encode(digest))
}

/// Keeps a cached vector only if it has the expected width.
fn usable_hit(vector: Vec<f32>, expected: usize) -> Option<Vec<f32>> {
    match check_dimensions(&vector, expected) {
        Ok(()) => Some(vector),
        Err(e) => {
            warn!("Ignoring cached embedding: {e}");
            None
        }
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = prepare_input(text)?;
        let key = cache_key(self.inner.model(), input);

        match self.lookup(&key).await {
            Ok(Some(cached)) => {
                if let Some(vector) = usable_hit(cached, self.dimensions) {
                    debug!("Embedding cache hit");
                    return Ok(vector);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Embedding cache lookup failed: {e}"),
        }

        let vector = self.inner.embed(input).await?;
        if let Err(e) = self.store(&key, &vector).await {
            warn!("Embedding cache write failed: {e}");
        }
        Ok(vector)
    }
}
