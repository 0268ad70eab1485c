//! Offline ingestion of the Olist review dataset.
//!
//! Loads the reviews, orders and order-items CSV files, joins them, writes
//! the per-product statistics snapshot, and embeds and stores every review
//! that has text.

pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod stats;
pub mod text;

pub use dataset::{join_reviews, load_dataset, Dataset, JoinedReview};
pub use error::IngestError;
pub use pipeline::{build_stats_snapshot, run_ingest, IngestSummary};
pub use stats::{compute_product_stats, product_candidates};
pub use text::{combine_review_text, prepare_documents};
