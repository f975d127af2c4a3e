//! Integration tests for the contact endpoint.
//!
//! Each test spins up the real router on a random port with a scripted
//! transport standing in for the email provider, then exercises the HTTP
//! contract with a plain reqwest client.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use frontdesk::config::ContactConfig;
use frontdesk::error::TransportError;
use frontdesk::mailer::{DeliveryClient, MailTransport, OutboundMessage, Sleeper};
use frontdesk::server;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Scripted provider stand-in: replays outcomes in order and records every
/// message it was asked to deliver.
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<String, TransportError>>>,
    delivered: Mutex<Vec<OutboundMessage>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<String, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            delivered: Mutex::new(Vec::new()),
        })
    }

    fn always_ok() -> Arc<Self> {
        Self::new(Vec::new())
    }

    fn calls(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    fn messages(&self) -> Vec<OutboundMessage> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for ScriptedTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<String, TransportError> {
        self.delivered.lock().unwrap().push(message.clone());
        let call = self.delivered.lock().unwrap().len();
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("msg-{call}")))
    }
}

/// No-wait sleeper so retry tests finish instantly.
struct InstantSleeper;

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

fn test_config() -> Arc<ContactConfig> {
    Arc::new(ContactConfig {
        api_key: None,
        api_url: "http://127.0.0.1:0/unused".into(),
        inbox: "bookings@lowline.studio".into(),
        from_operator: "Lowline Website <site@lowline.studio>".into(),
        from_client: "Lowline Studio <hello@lowline.studio>".into(),
        allowed_origins: vec![
            "https://lowline.studio".into(),
            "https://www.lowline.studio".into(),
        ],
        addr: "127.0.0.1:0".into(),
    })
}

/// Start the app on a random port. `transport: None` simulates a missing
/// provider credential.
async fn start_server(transport: Option<Arc<ScriptedTransport>>) -> String {
    let delivery = transport.map(|t| {
        Arc::new(DeliveryClient::new(t).with_sleeper(Arc::new(InstantSleeper)))
    });
    let app = server::app(test_config(), delivery);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

fn valid_body() -> Value {
    json!({
        "name": "Jo Marchetti",
        "email": "jo@example.com",
        "phone": "+1 (555) 123-4567",
        "service": "Wedding",
        "date": "2026-09-12",
        "location": "Red Hook, Brooklyn",
        "budget": "5k-10k",
        "message": "We're planning a waterfront ceremony for about 80 guests."
    })
}

async fn post_contact(base: &str, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/api/contact"))
        .json(body)
        .send()
        .await
        .expect("request failed")
}

fn rate_limited() -> TransportError {
    TransportError::Provider {
        status: 429,
        name: "rate_limit_exceeded".into(),
        message: "Too many requests".into(),
    }
}

fn server_error() -> TransportError {
    TransportError::Provider {
        status: 500,
        name: "internal_server_error".into(),
        message: "Something went wrong".into(),
    }
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn valid_submission_sends_operator_then_client() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::always_ok();
        let base = start_server(Some(transport.clone())).await;

        let resp = post_contact(&base, &valid_body()).await;
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);

        let messages = transport.messages();
        assert_eq!(messages.len(), 2);

        let operator = &messages[0];
        assert_eq!(operator.to, vec!["bookings@lowline.studio".to_string()]);
        assert_eq!(operator.reply_to.as_deref(), Some("jo@example.com"));
        assert_eq!(operator.subject, "New booking inquiry: Wedding");
        assert!(operator.html.contains("Red Hook, Brooklyn"));

        let ack = &messages[1];
        assert_eq!(ack.to, vec!["jo@example.com".to_string()]);
        assert!(ack.html.contains("two business days"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn health_is_served() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(Some(ScriptedTransport::always_ok())).await;
        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn markup_is_escaped_end_to_end() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::always_ok();
        let base = start_server(Some(transport.clone())).await;

        let mut body = valid_body();
        body["name"] = json!("<b>Jo & Co</b>");
        let resp = post_contact(&base, &body).await;
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let operator = &transport.messages()[0];
        assert!(!operator.html.contains("<b>Jo"));
        assert!(operator.html.contains("&lt;b&gt;Jo &amp; Co&lt;/b&gt;"));
    })
    .await
    .expect("test timed out");
}

// ── Abuse screening ──────────────────────────────────────────────────────────

#[tokio::test]
async fn honeypot_answers_success_without_sending() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::always_ok();
        let base = start_server(Some(transport.clone())).await;

        let mut body = valid_body();
        body["company"] = json!("Totally Real Corp");
        let resp = post_contact(&base, &body).await;

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(transport.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn disallowed_origin_is_rejected_without_sending() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::always_ok();
        let base = start_server(Some(transport.clone())).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/contact"))
            .header("origin", "https://evil.example")
            .json(&valid_body())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Origin not allowed");
        assert_eq!(transport.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn listed_origin_is_accepted() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::always_ok();
        let base = start_server(Some(transport.clone())).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/contact"))
            .header("origin", "https://lowline.studio")
            .json(&valid_body())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(transport.calls(), 2);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn referer_origin_is_the_fallback_check() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::always_ok();
        let base = start_server(Some(transport.clone())).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/contact"))
            .header("referer", "https://www.lowline.studio/contact")
            .json(&valid_body())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/contact"))
            .header("referer", "https://evil.example/contact")
            .json(&valid_body())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    })
    .await
    .expect("test timed out");
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_email_is_a_400_and_nothing_is_sent() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::always_ok();
        let base = start_server(Some(transport.clone())).await;

        let mut body = valid_body();
        body["email"] = json!("not-an-email");
        let resp = post_contact(&base, &body).await;

        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let json: Value = resp.json().await.unwrap();
        assert!(
            json["error"].as_str().unwrap_or_default().contains("email"),
            "unexpected body: {json}"
        );
        assert_eq!(transport.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn short_message_is_a_400() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::always_ok();
        let base = start_server(Some(transport.clone())).await;

        let mut body = valid_body();
        body["message"] = json!("hi");
        let resp = post_contact(&base, &body).await;

        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let json: Value = resp.json().await.unwrap();
        assert!(
            json["error"].as_str().unwrap_or_default().contains("10 characters"),
            "unexpected body: {json}"
        );
        assert_eq!(transport.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_json_is_a_400_with_json_error_body() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::always_ok();
        let base = start_server(Some(transport.clone())).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/contact"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["error"], "Invalid request body");
        assert_eq!(transport.calls(), 0);
    })
    .await
    .expect("test timed out");
}

// ── Configuration gate ───────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credential_answers_500() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(None).await;
        let resp = post_contact(&base, &valid_body()).await;

        assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = resp.json().await.unwrap();
        assert!(
            body["error"].as_str().unwrap_or_default().contains("not configured"),
            "unexpected body: {body}"
        );
    })
    .await
    .expect("test timed out");
}

// ── Delivery failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn rate_limited_sends_are_retried_to_success() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Ok("msg-operator".into()),
            Ok("msg-ack".into()),
        ]);
        let base = start_server(Some(transport.clone())).await;

        let resp = post_contact(&base, &valid_body()).await;
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        // Three attempts for the operator message, one for the ack.
        assert_eq!(transport.calls(), 4);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Provider {
            status: 401,
            name: "missing_api_key".into(),
            message: "Missing API key".into(),
        })]);
        let base = start_server(Some(transport.clone())).await;

        let resp = post_contact(&base, &valid_body()).await;
        assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Server error");
        assert_eq!(transport.calls(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn operator_failure_never_reaches_the_client_ack() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::new(vec![
            Err(server_error()),
            Err(server_error()),
            Err(server_error()),
        ]);
        let base = start_server(Some(transport.clone())).await;

        let resp = post_contact(&base, &valid_body()).await;
        assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

        let messages = transport.messages();
        assert_eq!(messages.len(), 3);
        // Every attempt was the operator notification; the ack never went out.
        for message in &messages {
            assert_eq!(message.to, vec!["bookings@lowline.studio".to_string()]);
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ack_failure_after_operator_success_is_reported() {
    timeout(TEST_TIMEOUT, async {
        let transport = ScriptedTransport::new(vec![
            Ok("msg-operator".into()),
            Err(TransportError::Provider {
                status: 422,
                name: "invalid_to_address".into(),
                message: "Invalid `to` address".into(),
            }),
        ]);
        let base = start_server(Some(transport.clone())).await;

        let resp = post_contact(&base, &valid_body()).await;
        assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transport.calls(), 2);
    })
    .await
    .expect("test timed out");
}
