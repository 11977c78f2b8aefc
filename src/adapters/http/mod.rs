//! HTTP adapters - REST + SSE API over the interview orchestrator.

pub mod interview;

pub use interview::{interview_routes, InterviewHandlers};

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;

/// Build the full application router.
///
/// The timeout bounds the time to the response head only, so streamed
/// questions may run longer than `request_timeout_secs`.
pub fn api_router(handlers: InterviewHandlers, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/interviews", interview_routes(handlers))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(server.allowed_origins()))
}

async fn health() -> &'static str {
    "ok"
}

fn cors_layer<'a>(origins: impl Iterator<Item = &'a str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
