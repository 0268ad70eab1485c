//! Batch ingestion command handlers.

use std::path::Path;

use revsent_core::AppConfig;
use revsent_ingest::{build_stats_snapshot, product_candidates};

/// Run the full ingestion job and print a one-line summary.
///
/// # Errors
///
/// Returns an error if the dataset cannot be read, the snapshot cannot be
/// written, or TEI or Qdrant fail.
pub(crate) async fn run_ingest(config: &AppConfig) -> anyhow::Result<()> {
    let summary = revsent_ingest::run_ingest(config).await?;
    println!(
        "ingest complete: {} products saved to {}, {} of {} joined rows had text, {} reviews stored in '{}'",
        summary.products,
        config.product_stats_path.display(),
        summary.documents,
        summary.joined_rows,
        summary.upserted,
        config.collection
    );
    Ok(())
}

/// Write the statistics snapshot and print the lowest-rated products that
/// have enough reviews to be worth analyzing.
///
/// # Errors
///
/// Returns an error if the dataset cannot be read or the snapshot cannot be
/// written.
pub(crate) fn run_stats(
    dataset_dir: &Path,
    output: &Path,
    min_reviews: u64,
    limit: usize,
) -> anyhow::Result<()> {
    let (_, stats) = build_stats_snapshot(dataset_dir, output)?;
    println!(
        "{} products saved to {}",
        stats.len(),
        output.display()
    );

    let candidates = product_candidates(&stats, min_reviews);
    if candidates.is_empty() {
        println!("no products with at least {min_reviews} reviews");
        return Ok(());
    }

    println!("{:<34}{:<10}REVIEWS", "PRODUCT", "AVERAGE");
    for (product_id, product) in candidates.into_iter().take(limit) {
        let average = product
            .average_score
            .map_or_else(|| "-".to_string(), |a| format!("{a:.2}"));
        println!("{product_id:<34}{average:<10}{}", product.review_count);
    }
    Ok(())
}
