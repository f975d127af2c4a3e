//! Router assembly and shared state.

use std::any::Any;
use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

use crate::config::ContactConfig;
use crate::contact;
use crate::error::ApiError;
use crate::mailer::DeliveryClient;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ContactConfig>,
    /// `None` when the provider credential is missing; the contact endpoint
    /// then answers 500 without attempting anything.
    pub delivery: Option<Arc<DeliveryClient>>,
}

/// Build the application router.
pub fn app(config: Arc<ContactConfig>, delivery: Option<Arc<DeliveryClient>>) -> Router {
    let cors = cors_layer(&config.allowed_origins);
    let state = AppState { config, delivery };

    Router::new()
        .route("/health", get(health))
        .route("/api/contact", post(contact::submit))
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "frontdesk",
    }))
}

/// Browser-facing CORS. Advisory only; the handler's own origin check stays
/// authoritative, since CORS does not stop non-browser clients.
fn cors_layer(allowed: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// A panicking handler still answers the generic 500 contract.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    };
    error!(detail, "Request handler panicked");
    ApiError::Internal.into_response()
}

// ── Tests ───────────────────────────────────────────────────────────────────
