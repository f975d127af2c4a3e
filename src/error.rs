//! Error types for frontdesk.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation failures on a submitted form.
///
/// Display strings double as the client-facing error messages, so keep
/// them short and name the field at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please provide a valid email address")]
    InvalidEmail,

    #[error("Message must be at least 10 characters")]
    MessageTooShort,
}

/// One classified failure from the mail transport.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The provider answered with an error object.
    #[error("Provider rejected the message ({status} {name}): {message}")]
    Provider {
        status: u16,
        name: String,
        message: String,
    },

    /// The request never completed (reset, timeout, DNS, refused connection).
    #[error("Network failure reaching the provider: {detail}")]
    Network { detail: String },

    /// The provider accepted the request but the body was not the documented shape.
    #[error("Unexpected provider response: {detail}")]
    Payload { detail: String },
}

impl TransportError {
    /// Whether retrying the same request has a realistic chance of succeeding.
    ///
    /// Rate limiting and provider-side failures are worth retrying, as is
    /// anything that never produced a response. Rejections of the request
    /// itself will keep being rejected.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Provider { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Network { .. } => true,
            Self::Payload { .. } => false,
        }
    }
}

/// Terminal failure from the delivery client after its retry budget ran out.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Delivery failed after {attempts} attempt(s): {last}")]
pub struct DeliveryError {
    /// Attempts actually made (1 = the first try failed permanently).
    pub attempts: u32,
    /// The error from the final attempt.
    #[source]
    pub last: TransportError,
}

/// Everything the contact endpoint can answer with besides success.
///
/// Display strings are the `error` field of the JSON response body. Server-side
/// failures deliberately collapse to a generic message; the detail lives in the
/// logs, not the response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Server is not configured to send email")]
    NotConfigured,

    #[error("Origin not allowed")]
    OriginRejected,

    #[error("Invalid request body")]
    PayloadInvalid,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Server error")]
    Delivery(#[source] DeliveryError),

    #[error("Server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotConfigured | Self::Delivery(_) | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::OriginRejected => StatusCode::FORBIDDEN,
            Self::PayloadInvalid | Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
