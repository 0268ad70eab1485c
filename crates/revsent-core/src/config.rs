use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Nothing here is strictly required: the store and the model degrade to
/// "unavailable" when their settings are missing. Only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("REVSENT_ENV", "development"))?;
    let bind_addr = parse_addr("REVSENT_BIND_ADDR", "127.0.0.1:8000")?;
    let log_level = or_default("REVSENT_LOG_LEVEL", "info");

    let qdrant_url = optional("REVSENT_QDRANT_URL").map(|u| u.trim_end_matches('/').to_string());
    let collection = or_default("REVSENT_COLLECTION", "olist_reviews");
    let product_stats_path = PathBuf::from(or_default(
        "REVSENT_PRODUCT_STATS_PATH",
        "data/product_stats.json",
    ));

    let google_api_key = optional("GOOGLE_API_KEY");
    let gemini_model = or_default("REVSENT_GEMINI_MODEL", "gemini-2.5-flash");
    let gemini_base_url = or_default("REVSENT_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL)
        .trim_end_matches('/')
        .to_string();

    let tei_url = or_default("REVSENT_TEI_URL", "http://127.0.0.1:8080")
        .trim_end_matches('/')
        .to_string();
    let dataset_dir = PathBuf::from(or_default("REVSENT_DATASET_DIR", "data/olist"));

    let request_timeout_secs = parse_u64("REVSENT_REQUEST_TIMEOUT_SECS", "60")?;
    let model_max_retries = parse_u32("REVSENT_MODEL_MAX_RETRIES", "0")?;
    let model_retry_backoff_ms = parse_u64("REVSENT_MODEL_RETRY_BACKOFF_MS", "1000")?;
    let upsert_batch_size = parse_positive_usize("REVSENT_UPSERT_BATCH_SIZE", "4096")?;
    let rate_limit_per_minute = parse_positive_usize("REVSENT_RATE_LIMIT_PER_MINUTE", "60")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        qdrant_url,
        collection,
        product_stats_path,
        google_api_key,
        gemini_model,
        gemini_base_url,
        tei_url,
        dataset_dir,
        request_timeout_secs,
        model_max_retries,
        model_retry_backoff_ms,
        upsert_batch_size,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVSENT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
