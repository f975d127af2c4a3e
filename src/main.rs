use std::sync::Arc;

use anyhow::Context;

use frontdesk::config::ContactConfig;
use frontdesk::mailer::{DeliveryClient, ResendTransport};
use frontdesk::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ContactConfig::from_env().context("invalid configuration")?;

    let delivery = config.api_key.clone().map(|key| {
        let transport = Arc::new(ResendTransport::new(config.api_url.clone(), key));
        Arc::new(DeliveryClient::new(transport))
    });
    if delivery.is_none() {
        tracing::warn!("RESEND_API_KEY is not set; contact submissions will answer 500");
    }

    eprintln!("frontdesk v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Listening: http://{}", config.addr);
    eprintln!("   Contact API: POST /api/contact");
    eprintln!("   Operator inbox: {}", config.inbox);
    eprintln!("   Allowed origins: {}", config.allowed_origins.join(", "));
    eprintln!(
        "   Sending: {}\n",
        if delivery.is_some() { "enabled" } else { "disabled (no API key)" }
    );

    let addr = config.addr.clone();
    let app = server::app(Arc::new(config), delivery);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "Contact service started");
    axum::serve(listener, app).await.context("server exited")?;

    Ok(())
}
