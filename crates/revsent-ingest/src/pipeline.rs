//! The one-shot ingestion job: statistics snapshot, then embeddings into Qdrant.

use std::path::Path;

use revsent_core::{write_product_stats, AppConfig, ProductStatsMap};
use revsent_sentiment::{QdrantClient, TeiClient};

use crate::dataset::{join_reviews, load_dataset, JoinedReview};
use crate::error::IngestError;
use crate::stats::compute_product_stats;
use crate::text::prepare_documents;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub joined_rows: usize,
    pub products: usize,
    pub documents: usize,
    pub upserted: usize,
}

/// Load and join the dataset in `dataset_dir`, compute per-product
/// statistics and persist them to `output`.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the dataset cannot be read and
/// [`IngestError::Stats`] if the snapshot cannot be written.
pub fn build_stats_snapshot(
    dataset_dir: &Path,
    output: &Path,
) -> Result<(Vec<JoinedReview>, ProductStatsMap), IngestError> {
    let dataset = load_dataset(dataset_dir)?;
    let joined = join_reviews(&dataset);
    let stats = compute_product_stats(&joined);
    write_product_stats(output, &stats)?;
    tracing::info!(
        path = %output.display(),
        products = stats.len(),
        "wrote product statistics"
    );
    Ok((joined, stats))
}

/// Run the full ingestion job described by `config`.
///
/// Documents are embedded and upserted in sequential batches of
/// `config.upsert_batch_size`. The collection is created on the first batch,
/// sized to the embedding dimension TEI returns. Re-running overwrites
/// existing points instead of duplicating them.
///
/// # Errors
///
/// Returns [`IngestError::StoreNotConfigured`] when no Qdrant URL is set
/// (checked before any work), and otherwise propagates dataset, snapshot,
/// TEI and Qdrant failures. A failure aborts the run; batches already
/// upserted stay in the collection.
pub async fn run_ingest(config: &AppConfig) -> Result<IngestSummary, IngestError> {
    let qdrant_url = config
        .qdrant_url
        .as_deref()
        .ok_or(IngestError::StoreNotConfigured)?;
    let qdrant = QdrantClient::new(qdrant_url, &config.collection, config.request_timeout_secs)?;
    let tei = TeiClient::new(&config.tei_url, config.request_timeout_secs)?;

    let (joined, stats) = build_stats_snapshot(&config.dataset_dir, &config.product_stats_path)?;
    let documents = prepare_documents(&joined);
    tracing::info!(documents = documents.len(), "prepared reviews with text");

    let mut summary = IngestSummary {
        joined_rows: joined.len(),
        products: stats.len(),
        documents: documents.len(),
        upserted: 0,
    };

    let batch_size = config.upsert_batch_size.max(1);
    let batch_count = documents.len().div_ceil(batch_size);
    let mut collection_ready = false;

    for (batch_index, batch) in documents.chunks(batch_size).enumerate() {
        let texts: Vec<&str> = batch.iter().map(|d| d.document.as_str()).collect();
        let embeddings = tei.embed(&texts).await?;

        if !collection_ready {
            let dim = embeddings.first().map_or(0, Vec::len);
            qdrant.ensure_collection(dim).await?;
            collection_ready = true;
        }

        qdrant.upsert_reviews(batch, &embeddings).await?;
        summary.upserted += batch.len();
        tracing::info!(
            batch = batch_index + 1,
            batches = batch_count,
            upserted = summary.upserted,
            "upserted review batch"
        );
    }

    if documents.is_empty() {
        tracing::warn!("no reviews with text; collection left untouched");
    }

    Ok(summary)
}
