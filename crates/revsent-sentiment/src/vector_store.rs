//! Qdrant vector store client for review storage and filtered retrieval.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SentimentError;
use crate::store::ReviewStore;
use crate::types::{ReviewDocument, StoredReview};

/// Points fetched per scroll request.
const SCROLL_PAGE_SIZE: usize = 256;

/// Qdrant HTTP client.
pub struct QdrantClient {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

#[derive(Serialize)]
struct CreateCollectionRequest {
    vectors: VectorsConfig,
}

#[derive(Serialize)]
struct VectorsConfig {
    size: usize,
    distance: &'static str,
}

#[derive(Serialize)]
struct UpsertPointsRequest<'a> {
    points: Vec<Point<'a>>,
}

#[derive(Serialize)]
struct Point<'a> {
    id: u64,
    vector: &'a [f32],
    payload: &'a ReviewDocument,
}

#[derive(Serialize)]
struct ScrollRequest<'a> {
    filter: Filter<'a>,
    limit: usize,
    with_payload: bool,
    with_vector: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Filter<'a> {
    must: [FieldCondition<'a>; 1],
}

#[derive(Serialize)]
struct FieldCondition<'a> {
    key: &'static str,
    #[serde(rename = "match")]
    match_value: MatchValue<'a>,
}

#[derive(Serialize)]
struct MatchValue<'a> {
    value: &'a str,
}

#[derive(Deserialize)]
struct ScrollResponse {
    result: ScrollResult,
}

#[derive(Deserialize)]
struct ScrollResult {
    points: Vec<ScrolledPoint>,
    #[serde(default)]
    next_page_offset: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ScrolledPoint {
    #[serde(default)]
    payload: Option<StoredReview>,
}

impl QdrantClient {
    /// Create a new `QdrantClient`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(
        qdrant_url: &str,
        collection: &str,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: qdrant_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// Ensure the review collection exists, creating it if absent.
    ///
    /// Uses cosine distance and `vector_dim`-dimensional vectors.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Qdrant`] on network or API failure.
    pub async fn ensure_collection(&self, vector_dim: usize) -> Result<(), SentimentError> {
        let url = self.collection_url();
        let check = self.client.get(&url).send().await;

        if let Ok(resp) = check {
            if resp.status().is_success() {
                return Ok(());
            }
        }

        let body = CreateCollectionRequest {
            vectors: VectorsConfig {
                size: vector_dim,
                distance: "Cosine",
            },
        };

        let resp = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                SentimentError::Qdrant(format!("collection create request failed: {e}"))
            })?;

        if !resp.status().is_success() {
            return Err(SentimentError::Qdrant(format!(
                "collection create returned status {}",
                resp.status()
            )));
        }

        tracing::info!(collection = %self.collection, vector_dim, "created Qdrant collection");
        Ok(())
    }

    /// Upsert one batch of reviews with their embeddings.
    ///
    /// Point ids are derived from the synthetic review id, so re-running an
    /// ingest overwrites instead of duplicating.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Qdrant`] on network or API failure, or if
    /// `reviews` and `embeddings` differ in length.
    pub async fn upsert_reviews(
        &self,
        reviews: &[ReviewDocument],
        embeddings: &[Vec<f32>],
    ) -> Result<(), SentimentError> {
        if reviews.len() != embeddings.len() {
            return Err(SentimentError::Qdrant(format!(
                "{} reviews but {} embeddings",
                reviews.len(),
                embeddings.len()
            )));
        }

        let body = UpsertPointsRequest {
            points: reviews
                .iter()
                .zip(embeddings)
                .map(|(review, vector)| Point {
                    id: review_point_id(&review.id),
                    vector: vector.as_slice(),
                    payload: review,
                })
                .collect(),
        };

        let upsert_url = format!("{}/points?wait=true", self.collection_url());

        let resp = self
            .client
            .put(&upsert_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SentimentError::Qdrant(format!("upsert request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(SentimentError::Qdrant(format!(
                "upsert returned status {}",
                resp.status()
            )));
        }

        Ok(())
    }

    /// Fetch every point whose `product_id` payload equals `product_id`.
    ///
    /// Pages through the scroll API until `next_page_offset` is null and
    /// keeps the order Qdrant returns.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Qdrant`] on network or API failure.
    pub async fn scroll_product(&self, product_id: &str) -> Result<Vec<StoredReview>, SentimentError> {
        let url = format!("{}/points/scroll", self.collection_url());
        let mut reviews = Vec::new();
        let mut offset: Option<serde_json::Value> = None;

        loop {
            let body = ScrollRequest {
                filter: Filter {
                    must: [FieldCondition {
                        key: "product_id",
                        match_value: MatchValue { value: product_id },
                    }],
                },
                limit: SCROLL_PAGE_SIZE,
                with_payload: true,
                with_vector: false,
                offset: offset.take(),
            };

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| SentimentError::Qdrant(format!("scroll request failed: {e}")))?;

            if !resp.status().is_success() {
                return Err(SentimentError::Qdrant(format!(
                    "scroll returned status {}",
                    resp.status()
                )));
            }

            let page: ScrollResponse = resp
                .json()
                .await
                .map_err(|e| SentimentError::Qdrant(format!("scroll response parse error: {e}")))?;

            reviews.extend(
                page.result
                    .points
                    .into_iter()
                    .map(|p| p.payload.unwrap_or_default()),
            );

            match page.result.next_page_offset {
                Some(next) if !next.is_null() => offset = Some(next),
                _ => break,
            }
        }

        tracing::debug!(product = product_id, count = reviews.len(), "scrolled reviews");
        Ok(reviews)
    }
}

#[async_trait]
impl ReviewStore for QdrantClient {
    async fn reviews_for_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<StoredReview>, SentimentError> {
        self.scroll_product(product_id).await
    }
}

/// Derive a stable Qdrant point ID (u64) from a synthetic review id.
///
/// Takes the first 8 bytes of SHA-256(id) and interprets them as a
/// big-endian u64. The same id always produces the same point.
#[must_use]
pub fn review_point_id(review_id: &str) -> u64 {
    let hash = Sha256::digest(review_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(bytes)
}
