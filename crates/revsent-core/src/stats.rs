//! Per-product statistics snapshot and its flat-file persistence.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aggregate review statistics for one product.
///
/// The product id is the key of the surrounding [`ProductStatsMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    /// Mean review score rounded to 2 decimals. `None` when no score of the
    /// product was numeric.
    #[serde(default)]
    pub average_score: Option<f64>,
    /// Number of distinct review ids.
    #[serde(default)]
    pub review_count: u64,
}

impl ProductStats {
    /// The average score, or `0.0` when it is missing.
    #[must_use]
    pub fn average_score_or_zero(&self) -> f64 {
        self.average_score.unwrap_or(0.0)
    }
}

/// `product_id -> ProductStats`, ordered by product id.
pub type ProductStatsMap = BTreeMap<String, ProductStats>;

#[derive(Debug, Error)]
pub enum StatsFileError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid statistics JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Round to 2 decimal places, ties to the even digit (`4.125` -> `4.12`).
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Read the statistics snapshot.
///
/// # Errors
///
/// Returns [`StatsFileError::Io`] if the file cannot be read and
/// [`StatsFileError::Json`] if it is not a valid mapping.
pub fn read_product_stats(path: &Path) -> Result<ProductStatsMap, StatsFileError> {
    let raw = std::fs::read_to_string(path).map_err(|source| StatsFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StatsFileError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Load the statistics snapshot, degrading to an empty mapping.
///
/// A missing file is expected before the first ingest and is logged at
/// `warn`; an unreadable or malformed file is logged at `error`. In both
/// cases every lookup will report "not found".
#[must_use]
pub fn load_product_stats(path: &Path) -> ProductStatsMap {
    match read_product_stats(path) {
        Ok(stats) => {
            tracing::info!(
                path = %path.display(),
                products = stats.len(),
                "loaded product statistics"
            );
            stats
        }
        Err(StatsFileError::Io { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::warn!(
                path = %path.display(),
                "product statistics file not found; starting with an empty mapping"
            );
            ProductStatsMap::new()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load product statistics; starting with an empty mapping");
            ProductStatsMap::new()
        }
    }
}

/// Persist the statistics snapshot as pretty-printed UTF-8 JSON, creating
/// parent directories as needed.
///
/// # Errors
///
/// Returns [`StatsFileError`] on any I/O or serialization failure.
pub fn write_product_stats(path: &Path, stats: &ProductStatsMap) -> Result<(), StatsFileError> {
    let io_err = |source| StatsFileError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(stats).map_err(|source| StatsFileError::Json {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_to_two_decimals() {
        assert!((round2(4.333_333) - 4.33).abs() < f64::EPSILON);
        assert!((round2(4.666_666) - 4.67).abs() < f64::EPSILON);
        assert!((round2(5.0) - 5.0).abs() < f64::EPSILON);
        assert!((round2(4.125) - 4.12).abs() < f64::EPSILON);
        assert!((round2(4.375) - 4.38).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_loads_as_empty_mapping() {
        let dir = tempfile::tempdir().expect("tempdir");
        let stats = load_product_stats(&dir.path().join("absent.json"));
        assert!(stats.is_empty());
    }

    #[test]
    fn malformed_file_loads_as_empty_mapping() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stats.json");
        std::fs::write(&path, "not json").expect("write");

        assert!(matches!(
            read_product_stats(&path),
            Err(StatsFileError::Json { .. })
        ));
        assert!(load_product_stats(&path).is_empty());
    }

    #[test]
    fn write_then_read_preserves_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("product_stats.json");

        let mut stats = ProductStatsMap::new();
        stats.insert(
            "P1".to_string(),
            ProductStats {
                average_score: Some(4.5),
                review_count: 12,
            },
        );
        stats.insert(
            "P2".to_string(),
            ProductStats {
                average_score: None,
                review_count: 1,
            },
        );

        write_product_stats(&path, &stats).expect("write stats");
        let loaded = read_product_stats(&path).expect("read stats");
        assert_eq!(loaded, stats);
    }

    #[test]
    fn missing_average_defaults_to_zero() {
        let stats: ProductStats =
            serde_json::from_str(r#"{"review_count": 3}"#).expect("parse stats");
        assert!(stats.average_score.is_none());
        assert!(stats.average_score_or_zero().abs() < f64::EPSILON);
    }

    #[test]
    fn null_average_is_accepted() {
        let stats: ProductStats =
            serde_json::from_str(r#"{"average_score": null, "review_count": 3}"#)
                .expect("parse stats");
        assert!(stats.average_score.is_none());
        assert_eq!(stats.review_count, 3);
    }
}
