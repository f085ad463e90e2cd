use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::cache::CachedEmbedder;
use crate::embedding::{Embedder, OpenAiEmbedder};
use crate::ingestion::github::GithubClient;
use crate::llm_client::{self, LlmClient};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    /// Pluggable embedder. Default: OpenAiEmbedder, behind the Redis cache when REDIS_URL is set.
    pub embedder: Arc<dyn Embedder>,
    pub github: GithubClient,
    pub config: Config,
}

impl AppState {
    /// Connects every backing service. Shared by the server and the batch ingester.
    pub async fn build(config: Config) -> Result<Self> {
        // PostgreSQL (migrations run on connect)
        let db = create_pool(&config.database_url).await?;

        // S3 / MinIO
        let s3 = build_s3_client(&config).await;
        info!("S3 client initialized (bucket: {})", config.s3_bucket);

        // LLM
        let llm = LlmClient::new(config.anthropic_api_key.clone())
            .context("Failed to build LLM client")?;
        info!("LLM client initialized (model: {})", llm_client::MODEL);

        // Embeddings, optionally cached in Redis
        let embedder: Arc<dyn Embedder> = Arc::new(
            OpenAiEmbedder::new(
                config.openai_api_key.clone(),
                config.openai_base_url.clone(),
                config.embedding_model.clone(),
                config.embedding_dimensions,
            )
            .context("Failed to build embedding client")?,
        );
        let embedder: Arc<dyn Embedder> = match &config.redis_url {
            Some(url) => {
                let redis = redis::Client::open(url.as_str()).context("Invalid REDIS_URL")?;
                info!("Embedding cache enabled (ttl {}s)", config.embedding_cache_ttl_secs);
                Arc::new(CachedEmbedder::new(
                    embedder,
                    redis,
                    config.embedding_cache_ttl_secs,
                    config.embedding_dimensions,
                ))
            }
            None => embedder,
        };
        info!("Embedder initialized (model: {})", embedder.model());

        let github = GithubClient::new(config.github_token.clone())
            .context("Failed to build GitHub client")?;

        Ok(Self {
            db,
            s3,
            llm,
            embedder,
            github,
            config,
        })
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub async fn build_s3_client(config: &Config) -> S3Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "cvmatch-static",
    );

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO only serves path-style bucket URLs
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();
    S3Client::from_conf(s3_config)
}
