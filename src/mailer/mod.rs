//! Outbound mail: message types, the transport seam, and retrying delivery.

pub mod delivery;
pub mod resend;

pub use delivery::{DeliveryClient, RetryPolicy, Sleeper, TokioSleeper};
pub use resend::ResendTransport;

use async_trait::async_trait;

use crate::error::TransportError;

/// A fully rendered email, ready to hand to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Sender identity, either `Name <addr>` or a bare address.
    pub from: String,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Where replies should go when that differs from `from`.
    pub reply_to: Option<String>,
    pub subject: String,
    /// Complete HTML document. All interpolated user text is already escaped.
    pub html: String,
}

/// Provider confirmation that a message was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id.
    pub id: String,
    /// How many attempts the send took (1 = first try).
    pub attempts: u32,
}

/// One-shot handoff of a message to the email provider.
///
/// Implementations perform exactly one provider interaction per call.
/// Retry policy lives in [`DeliveryClient`], not in the transport.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Hand one message to the provider, returning its assigned id.
    async fn deliver(&self, message: &OutboundMessage) -> Result<String, TransportError>;
}
