//! Shared configuration and domain types for revsent.

pub mod app_config;
pub mod config;
pub mod sentiment;
pub mod stats;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use sentiment::{Sentiment, SentimentResult};
pub use stats::{
    load_product_stats, read_product_stats, round2, write_product_stats, ProductStats,
    ProductStatsMap, StatsFileError,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
