use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_PLACEHOLDER_IMAGE_URL: &str =
    "https://cdn-icons-png.flaticon.com/512/12391/12391857.png";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Settings for pushing uploads to an S3-compatible bucket instead of local disk.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    /// Public prefix the object key is appended to, e.g. `https://cdn.example.org/reports`.
    pub public_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Relay configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    /// Overrides the scheme/host derived from each request when building upload URLs.
    pub public_base_url: Option<String>,
    pub routing_table_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub llm_timeout_secs: u64,
    pub manual_placeholder_image_url: String,
    pub s3: Option<S3Config>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port: parse_env("PORT", 5000)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            upload_dir: optional_env("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            public_base_url: optional_env("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            routing_table_path: optional_env("ROUTING_TABLE_PATH").map(PathBuf::from),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            manual_placeholder_image_url: optional_env("MANUAL_PLACEHOLDER_IMAGE_URL")
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER_IMAGE_URL.to_string()),
            s3: S3Config::from_env()?,
        })
    }
}

impl S3Config {
    /// Present only when `S3_BUCKET` is set; the remaining keys are then required.
    fn from_env() -> Result<Option<Self>> {
        let Some(bucket) = optional_env("S3_BUCKET") else {
            return Ok(None);
        };

        Ok(Some(S3Config {
            bucket,
            endpoint: optional_env("S3_ENDPOINT"),
            region: optional_env("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            public_url: require_env("S3_PUBLIC_URL")?
                .trim_end_matches('/')
                .to_string(),
            access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
        }))
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Config for router tests; no env access.
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        Config {
            gemini_api_key: "test-key".to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            upload_dir,
            public_base_url: None,
            routing_table_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            llm_timeout_secs: 5,
            manual_placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
            s3: None,
        }
    }
}
