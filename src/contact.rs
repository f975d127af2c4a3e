//! The contact endpoint: one submission through the whole pipeline.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::server::AppState;
use crate::submission::{self, AbuseVerdict, SubmissionInput, render};

/// `POST /api/contact`.
///
/// Stage order is load-bearing: configuration gate, body parse, abuse
/// screen, sanitize, render, operator send, client send. The client
/// acknowledgement is only attempted once the operator notification has
/// been accepted, so a failure can never acknowledge a lead nobody saw.
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubmissionInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    // Without a provider key there is nothing useful this endpoint can do.
    let Some(delivery) = state.delivery.as_ref() else {
        error!("Contact submission received but no provider API key is configured");
        return Err(ApiError::NotConfigured);
    };

    let Json(input) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Contact body failed to parse");
        ApiError::PayloadInvalid
    })?;

    match submission::screen(
        input.company.as_deref(),
        header_str(&headers, "origin"),
        header_str(&headers, "referer"),
        &state.config.allowed_origins,
    ) {
        AbuseVerdict::Reject { origin } => {
            warn!(origin = %origin, "Rejected submission from disallowed origin");
            return Err(ApiError::OriginRejected);
        }
        AbuseVerdict::SilentlyAccept => {
            info!("Honeypot tripped; acknowledging without sending");
            return Ok(Json(json!({ "success": true })));
        }
        AbuseVerdict::Proceed => {}
    }

    let sanitized = submission::sanitize(&input).map_err(|err| {
        info!(error = %err, "Submission failed validation");
        ApiError::Validation(err)
    })?;

    let operator = render::operator_message(
        &sanitized,
        &state.config.from_operator,
        &state.config.inbox,
    );
    let acknowledgement = render::client_message(
        &sanitized,
        &state.config.from_client,
        &state.config.inbox,
    );

    // Operator first. A lead the operator never saw is worse than a missing
    // acknowledgement.
    let operator_receipt = delivery.send(&operator).await.map_err(|err| {
        error!(
            error = %err,
            attempts = err.attempts,
            service = %sanitized.service,
            "Operator notification failed; giving up on this submission"
        );
        ApiError::Delivery(err)
    })?;

    let ack_receipt = match delivery.send(&acknowledgement).await {
        Ok(receipt) => receipt,
        Err(err) => {
            // The lead already reached the operator. Reporting failure anyway
            // lets the visitor retry; the operator can spot the duplicate.
            error!(
                error = %err,
                attempts = err.attempts,
                operator_id = %operator_receipt.id,
                "Client acknowledgement failed after the operator notification succeeded"
            );
            return Err(ApiError::Delivery(err));
        }
    };

    info!(
        operator_id = %operator_receipt.id,
        ack_id = %ack_receipt.id,
        service = %sanitized.service,
        email = %sanitized.email,
        "Contact submission delivered"
    );
    Ok(Json(json!({ "success": true })))
}

/// Read a header as UTF-8 text, `None` when absent or not text.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
