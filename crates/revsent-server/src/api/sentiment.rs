use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use revsent_core::SentimentResult;
use revsent_sentiment::{AnalysisOutcome, SentimentError};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeQuery {
    pub product_id: Option<String>,
}

pub(super) async fn analyze_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Result<Json<SentimentResult>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(request_id = %req_id.0, error = %rejection, "rejected query string");
        ApiError::new("bad_request", format!("invalid query string: {}", rejection.body_text()))
    })?;
    let product_id = query
        .product_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::new("bad_request", "product_id query parameter is required"))?;

    match state.context.analyze_product(product_id).await {
        Ok(AnalysisOutcome::NotFound) => Err(ApiError::new(
            "not_found",
            format!("Product with ID '{product_id}' not found in the statistics file."),
        )),
        Ok(AnalysisOutcome::InsufficientData(result) | AnalysisOutcome::Assembled(result)) => {
            Ok(Json(result))
        }
        Err(e) => Err(map_sentiment_error(&req_id.0, product_id, &e)),
    }
}

fn map_sentiment_error(request_id: &str, product_id: &str, error: &SentimentError) -> ApiError {
    tracing::error!(request_id, product = product_id, error = %error, "sentiment analysis failed");
    match error {
        SentimentError::Retrieval { source, .. } => ApiError::new(
            "retrieval_failed",
            format!("Failed to fetch data from the review store: {source}"),
        ),
        SentimentError::ModelInvocation { message, .. } => ApiError::new(
            "model_failed",
            format!("Failed to call the language model: {message}"),
        ),
        // The raw reply is logged above, not echoed to the caller.
        SentimentError::ResponseParse { source, .. } => ApiError::new(
            "parse_failed",
            format!("Failed to process the API response: {source}"),
        ),
        SentimentError::Unavailable(_) => ApiError::new(
            "service_unavailable",
            "AI service or review store not available. Check server logs.",
        ),
        SentimentError::Http(_) | SentimentError::Qdrant(_) | SentimentError::Tei(_) => {
            ApiError::new("internal_error", "sentiment analysis failed")
        }
    }
}
