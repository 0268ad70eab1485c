use std::path::PathBuf;

use revsent_core::StatsFileError;
use revsent_sentiment::SentimentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write product statistics: {0}")]
    Stats(#[from] StatsFileError),

    #[error(transparent)]
    Sentiment(#[from] SentimentError),

    #[error("REVSENT_QDRANT_URL must be set to store reviews")]
    StoreNotConfigured,
}
