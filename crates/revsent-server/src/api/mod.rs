mod sentiment;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use revsent_sentiment::ServiceContext;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<ServiceContext>,
}

/// Error payload: `{"error": <message>, "code": <code>}`. The HTTP status is
/// derived from `code`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
struct WelcomeMessage {
    message: &'static str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    products: usize,
    store: &'static str,
    model: &'static str,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "bad_request" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "retrieval_failed" | "model_failed" | "parse_failed" => StatusCode::BAD_GATEWAY,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let analysis_routes = Router::new()
        .route("/analyze_sentiment", get(sentiment::analyze_sentiment))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(analysis_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn root() -> Json<WelcomeMessage> {
    Json(WelcomeMessage {
        message: "Welcome to the Sentiment Analysis API. Call /analyze_sentiment?product_id=<id> to analyze a product.",
    })
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let context = &state.context;
    let store_ok = context.store_available();
    let model_ok = context.model_available();
    let availability = |ok: bool| if ok { "ok" } else { "unavailable" };

    let data = HealthData {
        status: if store_ok && model_ok { "ok" } else { "degraded" },
        products: context.stats().len(),
        store: availability(store_ok),
        model: availability(model_ok),
    };

    let status = if store_ok && model_ok {
        StatusCode::OK
    } else {
        tracing::warn!(store = data.store, model = data.model, "health check: degraded");
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(data))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
