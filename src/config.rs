//! Runtime configuration, built once from environment variables.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Origins allowed to use the contact endpoint when none are configured.
const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["https://lowline.studio", "https://www.lowline.studio"];

/// Where operator notifications land when `CONTACT_INBOX` is not set.
const DEFAULT_INBOX: &str = "bookings@lowline.studio";

const DEFAULT_FROM_OPERATOR: &str = "Lowline Website <site@lowline.studio>";
const DEFAULT_FROM_CLIENT: &str = "Lowline Studio <hello@lowline.studio>";
const DEFAULT_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_ADDR: &str = "0.0.0.0:8700";

/// Contact service configuration.
///
/// Loaded once in `main` and shared read-only through the router state;
/// never re-read mid-request.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Provider API key. `None` means the endpoint answers 500 instead of
    /// sending; the process still boots and serves `/health`.
    pub api_key: Option<SecretString>,
    /// Provider endpoint. Overridable so tests can point at a stub server.
    pub api_url: String,
    /// Recipient of operator notifications.
    pub inbox: String,
    /// Sender identity on the operator notification.
    pub from_operator: String,
    /// Sender identity on the client acknowledgement.
    pub from_client: String,
    /// Normalized origin allow-list (no trailing slashes).
    pub allowed_origins: Vec<String>,
    /// Bind address for the HTTP server.
    pub addr: String,
}

impl ContactConfig {
    /// Build config from environment variables.
    ///
    /// Everything except the provider key has a production default. Sender
    /// and inbox identities are checked up front so a typo fails at boot
    /// rather than on the first submission.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("RESEND_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);

        let api_url =
            std::env::var("RESEND_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let inbox = std::env::var("CONTACT_INBOX").unwrap_or_else(|_| DEFAULT_INBOX.to_string());

        let from_operator = std::env::var("CONTACT_FROM_OPERATOR")
            .unwrap_or_else(|_| DEFAULT_FROM_OPERATOR.to_string());

        let from_client = std::env::var("CONTACT_FROM_CLIENT")
            .unwrap_or_else(|_| DEFAULT_FROM_CLIENT.to_string());

        let allowed_origins = match std::env::var("CONTACT_ALLOWED_ORIGINS") {
            Ok(raw) => parse_origins(&raw),
            Err(_) => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        let addr = std::env::var("FRONTDESK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

        for (key, value) in [
            ("CONTACT_INBOX", &inbox),
            ("CONTACT_FROM_OPERATOR", &from_operator),
            ("CONTACT_FROM_CLIENT", &from_client),
        ] {
            if !value.contains('@') {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{value}' is not a mail address or identity"),
                });
            }
        }

        Ok(Self {
            api_key,
            api_url,
            inbox,
            from_operator,
            from_client,
            allowed_origins,
            addr,
        })
    }
}

/// Parse a comma-separated origin list, trimming whitespace and trailing
/// slashes so `https://example.com/` and `https://example.com` compare equal.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────────────
