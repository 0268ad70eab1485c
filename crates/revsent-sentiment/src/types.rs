use serde::{Deserialize, Serialize};

/// One review as written to the vector store during ingestion.
///
/// `id` is the synthetic review identifier (`review_<row>`); it is kept in the
/// payload as `review_id` because Qdrant point ids are numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDocument {
    #[serde(rename = "review_id")]
    pub id: String,
    pub document: String,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_creation_date: Option<String>,
    pub review_comment_title: String,
    pub review_comment_message: String,
}

/// One review as read back from the vector store.
///
/// Every field is lenient: the store is an external collaborator and may
/// hold incomplete records. Validation happens in the selector.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoredReview {
    #[serde(default)]
    pub review_id: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub review_score: Option<serde_json::Value>,
    #[serde(default)]
    pub review_creation_date: Option<String>,
    #[serde(default)]
    pub review_comment_title: Option<String>,
    #[serde(default)]
    pub review_comment_message: Option<String>,
}

/// A validated review ready to be rendered into the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredReview {
    pub text: String,
    pub score: u8,
}

/// Outcome of review selection for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No stored review had both a usable date and a usable score.
    InsufficientData,
    /// Reviews sorted most recent first.
    Reviews {
        /// At most `max_recent` reviews.
        to_analyze: Vec<ScoredReview>,
        /// The first `max_top` texts of the same order.
        top_reviews: Vec<String>,
    },
}
