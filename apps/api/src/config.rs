use anyhow::{ensure, Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
/// Width of `candidates.embedding` in the schema; the only accepted setting.
pub const STORED_EMBEDDING_DIMENSIONS: usize = 1536;
const DEFAULT_TOP_K: i64 = 20;
const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.65;
const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60 * 24;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Start-up fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub embedding_cache_ttl_secs: u64,
    pub github_token: Option<String>,
    pub retrieval_top_k: i64,
    pub similarity_threshold: f64,
    pub max_upload_bytes: usize,
    pub tools: ToolConfig,
    pub port: u16,
    pub rust_log: String,
}

/// External programs used by ingestion for format conversion and OCR.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub soffice_bin: String,
    pub pdftoppm_bin: String,
    pub tesseract_bin: String,
    pub ocr_lang: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            soffice_bin: "soffice".to_string(),
            pdftoppm_bin: "pdftoppm".to_string(),
            tesseract_bin: "tesseract".to_string(),
            ocr_lang: "eng".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let defaults = ToolConfig::default();

        let embedding_dimensions = parse_or(
            get("EMBEDDING_DIMENSIONS"),
            STORED_EMBEDDING_DIMENSIONS,
            "EMBEDDING_DIMENSIONS must be a positive integer",
        )?;
        ensure!(
            embedding_dimensions == STORED_EMBEDDING_DIMENSIONS,
            "EMBEDDING_DIMENSIONS must be {STORED_EMBEDDING_DIMENSIONS} to match the candidates.embedding column, got {embedding_dimensions}"
        );
        let retrieval_top_k = parse_or(
            get("RETRIEVAL_TOP_K"),
            DEFAULT_TOP_K,
            "RETRIEVAL_TOP_K must be an integer",
        )?;
        ensure!(
            retrieval_top_k >= 1,
            "RETRIEVAL_TOP_K must be at least 1, got {retrieval_top_k}"
        );

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            redis_url: get("REDIS_URL"),
            s3_bucket: require("S3_BUCKET")?,
            s3_endpoint: require("S3_ENDPOINT")?,
            s3_region: get("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            embedding_model: get("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimensions,
            embedding_cache_ttl_secs: parse_or(
                get("EMBEDDING_CACHE_TTL_SECS"),
                DEFAULT_CACHE_TTL_SECS,
                "EMBEDDING_CACHE_TTL_SECS must be a number of seconds",
            )?,
            github_token: get("GITHUB_TOKEN"),
            retrieval_top_k,
            similarity_threshold: parse_or(
                get("SIMILARITY_THRESHOLD"),
                DEFAULT_SIMILARITY_THRESHOLD,
                "SIMILARITY_THRESHOLD must be a number",
            )?,
            max_upload_bytes: parse_or(
                get("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
                "MAX_UPLOAD_BYTES must be a number of bytes",
            )?,
            tools: ToolConfig {
                soffice_bin: get("SOFFICE_BIN").unwrap_or(defaults.soffice_bin),
                pdftoppm_bin: get("PDFTOPPM_BIN").unwrap_or(defaults.pdftoppm_bin),
                tesseract_bin: get("TESSERACT_BIN").unwrap_or(defaults.tesseract_bin),
                ocr_lang: get("OCR_LANG").unwrap_or(defaults.ocr_lang),
            },
            port: parse_or(get("PORT"), 8080, "PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T, msg: &'static str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v.trim().parse::<T>().context(msg),
        None => Ok(default),
    }
}
