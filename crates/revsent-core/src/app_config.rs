use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings shared by the server and the CLI.
///
/// `qdrant_url` and `google_api_key` are optional on purpose: when either is
/// absent the corresponding dependency is reported as unavailable instead of
/// failing startup.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub qdrant_url: Option<String>,
    pub collection: String,
    pub product_stats_path: PathBuf,
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub tei_url: String,
    pub dataset_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub model_max_retries: u32,
    pub model_retry_backoff_ms: u64,
    pub upsert_batch_size: usize,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("qdrant_url", &self.qdrant_url)
            .field("collection", &self.collection)
            .field("product_stats_path", &self.product_stats_path)
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("tei_url", &self.tei_url)
            .field("dataset_dir", &self.dataset_dir)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("model_max_retries", &self.model_max_retries)
            .field("model_retry_backoff_ms", &self.model_retry_backoff_ms)
            .field("upsert_batch_size", &self.upsert_batch_size)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
