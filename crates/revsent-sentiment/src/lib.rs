//! Review sentiment analysis for revsent.
//!
//! Reads a product's reviews from Qdrant by exact `product_id` filter, keeps
//! the most recent ones, asks Gemini for an aggregate classification and
//! merges the answer with the precomputed product statistics. Also carries
//! the TEI and Qdrant write paths used by ingestion.

pub mod assembler;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod selector;
pub mod store;
pub mod types;
pub mod vector_store;

mod retry;

pub use assembler::{assemble, insufficient_data_result, INSUFFICIENT_DATA_SUMMARY};
pub use embeddings::TeiClient;
pub use error::SentimentError;
pub use llm::{GeminiClient, GeminiSettings, SentimentModel};
pub use pipeline::{AnalysisOutcome, ServiceContext};
pub use prompt::build_prompt;
pub use selector::{select_from, select_reviews};
pub use store::ReviewStore;
pub use types::{ReviewDocument, ScoredReview, Selection, StoredReview};
pub use vector_store::{review_point_id, QdrantClient};
