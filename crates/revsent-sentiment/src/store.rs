use async_trait::async_trait;

use crate::error::SentimentError;
use crate::types::StoredReview;

/// Read access to the stored reviews.
///
/// Implementations return every review whose `product_id` exactly equals the
/// argument, in the store's own iteration order. No similarity search.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn reviews_for_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<StoredReview>, SentimentError>;
}
