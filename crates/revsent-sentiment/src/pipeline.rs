//! Per-request analysis flow and the process-wide context it runs against.

use std::sync::Arc;

use revsent_core::{AppConfig, ProductStatsMap, SentimentResult};

use crate::assembler::{assemble, insufficient_data_result};
use crate::error::SentimentError;
use crate::llm::{GeminiClient, GeminiSettings, SentimentModel};
use crate::prompt::build_prompt;
use crate::selector::{select_reviews, DEFAULT_MAX_RECENT, DEFAULT_MAX_TOP};
use crate::store::ReviewStore;
use crate::types::Selection;
use crate::vector_store::QdrantClient;

/// Successful terminal states of one analysis request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The product has no entry in the statistics snapshot.
    NotFound,
    /// The product exists but none of its stored reviews is usable.
    InsufficientData(SentimentResult),
    /// The model answered and the answer was merged with the statistics.
    Assembled(SentimentResult),
}

/// Everything a request needs, built once at startup and shared read-only.
///
/// A dependency that could not be configured is `None`; requests that need
/// it fail with [`SentimentError::Unavailable`] instead of the process
/// refusing to start.
pub struct ServiceContext {
    stats: Arc<ProductStatsMap>,
    store: Option<Arc<dyn ReviewStore>>,
    model: Option<Arc<dyn SentimentModel>>,
    max_recent: usize,
    max_top: usize,
}

impl ServiceContext {
    #[must_use]
    pub fn new(
        stats: ProductStatsMap,
        store: Option<Arc<dyn ReviewStore>>,
        model: Option<Arc<dyn SentimentModel>>,
    ) -> Self {
        Self {
            stats: Arc::new(stats),
            store,
            model,
            max_recent: DEFAULT_MAX_RECENT,
            max_top: DEFAULT_MAX_TOP,
        }
    }

    /// Override how many reviews go to the model and how many are echoed back.
    #[must_use]
    pub fn with_limits(mut self, max_recent: usize, max_top: usize) -> Self {
        self.max_recent = max_recent;
        self.max_top = max_top;
        self
    }

    /// Build the context in order: statistics, then store, then model.
    ///
    /// Never fails. A missing statistics file yields an empty snapshot; a
    /// missing Qdrant URL or API key (or a client that cannot be built)
    /// leaves that dependency disabled and logs a warning.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let stats = revsent_core::load_product_stats(&config.product_stats_path);

        let store: Option<Arc<dyn ReviewStore>> = match config.qdrant_url.as_deref() {
            Some(url) => {
                match QdrantClient::new(url, &config.collection, config.request_timeout_secs) {
                    Ok(client) => {
                        tracing::info!(url, collection = %config.collection, "review store configured");
                        Some(Arc::new(client))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to build review store client; store disabled");
                        None
                    }
                }
            }
            None => {
                tracing::warn!("REVSENT_QDRANT_URL not set; review store disabled");
                None
            }
        };

        let model: Option<Arc<dyn SentimentModel>> = match config.google_api_key.as_deref() {
            Some(api_key) => {
                let settings = GeminiSettings {
                    api_key: api_key.to_string(),
                    model: config.gemini_model.clone(),
                    base_url: config.gemini_base_url.clone(),
                    timeout_secs: config.request_timeout_secs,
                    max_retries: config.model_max_retries,
                    retry_backoff_ms: config.model_retry_backoff_ms,
                };
                match GeminiClient::new(&settings) {
                    Ok(client) => {
                        tracing::info!(model = %config.gemini_model, "language model configured");
                        Some(Arc::new(client))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to build model client; model disabled");
                        None
                    }
                }
            }
            None => {
                tracing::warn!("GOOGLE_API_KEY not set; language model disabled");
                None
            }
        };

        Self::new(stats, store, model)
    }

    #[must_use]
    pub fn stats(&self) -> &ProductStatsMap {
        &self.stats
    }

    #[must_use]
    pub fn store_available(&self) -> bool {
        self.store.is_some()
    }

    #[must_use]
    pub fn model_available(&self) -> bool {
        self.model.is_some()
    }

    /// Run the full analysis for `product_id`.
    ///
    /// An unknown product returns [`AnalysisOutcome::NotFound`] without
    /// touching the store. Otherwise the store is read once and the model is
    /// called at most once.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::Unavailable`] if the store or the model is disabled.
    /// - [`SentimentError::Retrieval`] if the store cannot be read.
    /// - [`SentimentError::ModelInvocation`] if the model call fails.
    /// - [`SentimentError::ResponseParse`] if the model reply is not a JSON object.
    pub async fn analyze_product(
        &self,
        product_id: &str,
    ) -> Result<AnalysisOutcome, SentimentError> {
        let Some(stats) = self.stats.get(product_id) else {
            tracing::info!(product = product_id, "product not found in statistics");
            return Ok(AnalysisOutcome::NotFound);
        };

        let store = self
            .store
            .as_deref()
            .ok_or(SentimentError::Unavailable("review store"))?;
        let model = self
            .model
            .as_deref()
            .ok_or(SentimentError::Unavailable("language model"))?;

        let (to_analyze, top_reviews) =
            match select_reviews(product_id, store, self.max_recent, self.max_top).await? {
                Selection::InsufficientData => {
                    tracing::info!(product = product_id, "insufficient review data");
                    return Ok(AnalysisOutcome::InsufficientData(
                        insufficient_data_result(stats),
                    ));
                }
                Selection::Reviews {
                    to_analyze,
                    top_reviews,
                } => (to_analyze, top_reviews),
            };

        let prompt = build_prompt(product_id, stats, &to_analyze);
        let raw = model.generate(&prompt).await.map_err(into_model_error)?;

        let result = assemble(product_id, &raw, stats, top_reviews)?;
        tracing::info!(
            product = product_id,
            reviews = to_analyze.len(),
            sentiment = %result.sentiment,
            "sentiment analysis complete"
        );
        Ok(AnalysisOutcome::Assembled(result))
    }
}

/// Every failure of the model call surfaces as `ModelInvocation`.
fn into_model_error(err: SentimentError) -> SentimentError {
    match err {
        SentimentError::ModelInvocation { .. } => err,
        SentimentError::Http(e) => SentimentError::ModelInvocation {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        },
        other => SentimentError::ModelInvocation {
            status: None,
            message: other.to_string(),
        },
    }
}
