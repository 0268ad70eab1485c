use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with every dependency configured.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("REVSENT_QDRANT_URL", "http://localhost:6333/");
    m.insert("GOOGLE_API_KEY", "test-key");
    m
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "REVSENT_ENV"));
}

#[test]
fn build_app_config_with_empty_env_uses_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");

    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.qdrant_url.is_none());
    assert!(cfg.google_api_key.is_none());
    assert_eq!(cfg.collection, "olist_reviews");
    assert_eq!(
        cfg.product_stats_path,
        std::path::PathBuf::from("data/product_stats.json")
    );
    assert_eq!(cfg.gemini_model, "gemini-2.5-flash");
    assert_eq!(cfg.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(cfg.tei_url, "http://127.0.0.1:8080");
    assert_eq!(cfg.request_timeout_secs, 60);
    assert_eq!(cfg.model_max_retries, 0, "model retry must be opt-in");
    assert_eq!(cfg.model_retry_backoff_ms, 1000);
    assert_eq!(cfg.upsert_batch_size, 4096);
    assert_eq!(cfg.rate_limit_per_minute, 60);
}

#[test]
fn build_app_config_reads_dependencies() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.qdrant_url.as_deref(), Some("http://localhost:6333"));
    assert_eq!(cfg.google_api_key.as_deref(), Some("test-key"));
}

#[test]
fn blank_api_key_is_treated_as_missing() {
    let mut map = full_env();
    map.insert("GOOGLE_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.google_api_key.is_none());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("REVSENT_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REVSENT_BIND_ADDR"),
        "expected InvalidEnvVar(REVSENT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_retry_count() {
    let mut map = full_env();
    map.insert("REVSENT_MODEL_MAX_RETRIES", "three");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REVSENT_MODEL_MAX_RETRIES"),
        "expected InvalidEnvVar(REVSENT_MODEL_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn zero_batch_size_is_rejected() {
    let mut map = full_env();
    map.insert("REVSENT_UPSERT_BATCH_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REVSENT_UPSERT_BATCH_SIZE"),
        "expected InvalidEnvVar(REVSENT_UPSERT_BATCH_SIZE), got: {result:?}"
    );
}

#[test]
fn overrides_are_applied() {
    let mut map = full_env();
    map.insert("REVSENT_COLLECTION", "reviews_v2");
    map.insert("REVSENT_MODEL_MAX_RETRIES", "2");
    map.insert("REVSENT_GEMINI_BASE_URL", "http://127.0.0.1:9999/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.collection, "reviews_v2");
    assert_eq!(cfg.model_max_retries, 2);
    assert_eq!(cfg.gemini_base_url, "http://127.0.0.1:9999");
}

#[test]
fn debug_output_redacts_api_key() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("test-key"));
    assert!(rendered.contains("[redacted]"));
}
