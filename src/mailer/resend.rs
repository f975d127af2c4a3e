//! HTTP transport for the Resend-style send API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransportError;

use super::{MailTransport, OutboundMessage};

/// JSON body of a send request.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    html: &'a str,
}

/// Success body: the provider-assigned message id.
#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// Error body the provider answers with on non-2xx.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

/// Transport talking to the provider over HTTPS with a bearer key.
pub struct ResendTransport {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
}

impl ResendTransport {
    pub fn new(api_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl MailTransport for ResendTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<String, TransportError> {
        let body = SendRequest {
            from: &message.from,
            to: &message.to,
            reply_to: message.reply_to.as_deref(),
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            let parsed: SendResponse =
                response.json().await.map_err(|e| TransportError::Payload {
                    detail: format!("success body was not the documented shape: {e}"),
                })?;
            debug!(id = %parsed.id, "Provider accepted message");
            return Ok(parsed.id);
        }

        // Non-2xx: prefer the provider's structured error body, fall back to
        // whatever text came back.
        let raw = response.text().await.unwrap_or_default();
        Err(provider_error(status.as_u16(), &raw))
    }
}

/// Build a classified error from a non-2xx response body.
fn provider_error(http_status: u16, raw_body: &str) -> TransportError {
    match serde_json::from_str::<ProviderErrorBody>(raw_body) {
        Ok(body) => TransportError::Provider {
            status: body.status_code.unwrap_or(http_status),
            name: if body.name.is_empty() {
                "unknown_error".to_string()
            } else {
                body.name
            },
            message: if body.message.is_empty() {
                format!("HTTP {http_status}")
            } else {
                body.message
            },
        },
        Err(_) => TransportError::Provider {
            status: http_status,
            name: "unknown_error".to_string(),
            message: format!(
                "HTTP {http_status}: {}",
                raw_body.chars().take(200).collect::<String>()
            ),
        },
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
