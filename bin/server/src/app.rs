//! Router assembly and middleware.

use crate::routes::{self, SharedState};
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::json;
use std::any::Any;
use std::num::NonZeroUsize;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Builds the application router.
///
/// `max_concurrent_requests` caps in-flight requests across all routes;
/// excess requests wait for a slot.
pub fn router(state: SharedState, max_concurrent_requests: Option<NonZeroUsize>) -> Router {
    let router = Router::new()
        .route("/generate-assignment", post(routes::generate_assignment))
        .route("/generate-long-answer", post(routes::generate_long_answer))
        .route("/generate-short-answer", post(routes::generate_short_answer))
        .route("/download-pdf", post(routes::download_pdf))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    match max_concurrent_requests {
        Some(limit) => router.layer(GlobalConcurrencyLimitLayer::new(limit.get())),
        None => router,
    }
}

/// Turns a handler panic into a logged 500.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };
    error!(panic = message, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}
