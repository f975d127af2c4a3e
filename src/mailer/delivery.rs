//! Delivery with bounded retry and increasing backoff.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::DeliveryError;

use super::{DeliveryReceipt, MailTransport, OutboundMessage};

/// Retry budget and backoff bounds for one send.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts allowed, first try included.
    pub max_attempts: u32,
    /// Wait before the first retry.
    pub min_delay: Duration,
    /// Ceiling for the backoff curve.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry `n` (1-based): doubling from `min_delay`, clamped
    /// to `max_delay`. Deterministic, so the wait between attempts is
    /// strictly increasing until it hits the ceiling.
    fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.min_delay
            .saturating_mul(factor)
            .clamp(self.min_delay, self.max_delay)
    }
}

/// Sleep seam so tests can observe and skip the backoff waits.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sends messages through the transport, retrying transient failures.
///
/// Stateless between calls: two sends from the same client are fully
/// independent, so concurrent submissions never share retry state.
pub struct DeliveryClient {
    transport: Arc<dyn MailTransport>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl DeliveryClient {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the retry policy (tests tighten the budget).
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the sleeper (tests inject a recording one).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Send one message, retrying transient failures until the budget runs
    /// out. Permanent failures surface immediately; the error from the final
    /// attempt is what the caller sees.
    pub async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let budget = self.policy.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            match self.transport.deliver(message).await {
                Ok(id) => {
                    if attempt > 1 {
                        info!(
                            attempts = attempt,
                            subject = %message.subject,
                            "Delivery succeeded after retry"
                        );
                    }
                    return Ok(DeliveryReceipt { id, attempts: attempt });
                }
                Err(err) => {
                    let remaining = budget - attempt;
                    warn!(
                        attempt,
                        remaining,
                        transient = err.is_transient(),
                        error = %err,
                        subject = %message.subject,
                        "Delivery attempt failed"
                    );

                    if !err.is_transient() || remaining == 0 {
                        return Err(DeliveryError {
                            attempts: attempt,
                            last: err,
                        });
                    }

                    self.sleeper.sleep(self.policy.delay_for(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
