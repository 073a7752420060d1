//! Credit Bridge server.
//!
//! Loads configuration, wires the Stripe and Memberstack adapters into the
//! checkout webhook handler and serves `POST /webhooks/stripe` until a
//! shutdown signal arrives.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use credit_bridge::adapters::http::{webhook_router, WebhookAppState};
use credit_bridge::adapters::{
    InMemoryWebhookEventRepository, MemberstackConfig, MemberstackDirectory, StripeConfig,
    StripePaymentAdapter,
};
use credit_bridge::application::HandleCheckoutWebhookHandler;
use credit_bridge::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config)?;

    let price_table = Arc::new(config.pricing.to_table()?);
    info!(
        environment = ?config.server.environment,
        bind_address = %config.server.bind_address(),
        price_count = price_table.len(),
        credit_field = %config.directory.credit_field,
        stripe_test_mode = config.payment.is_test_mode(),
        "Configuration loaded"
    );
    if config.is_production() && config.payment.is_test_mode() {
        warn!("Production environment is using a Stripe test-mode key");
    }

    let stripe = StripePaymentAdapter::new(
        StripeConfig::new(
            config.payment.stripe_api_key.clone(),
            config.payment.stripe_webhook_secret.clone(),
        )
        .with_base_url(config.payment.stripe_api_base_url.clone())
        .with_tolerance_secs(config.payment.webhook_tolerance_secs)
        .with_require_livemode(config.payment.require_livemode),
    );
    let memberstack = MemberstackDirectory::new(
        MemberstackConfig::new(config.directory.memberstack_secret.clone())
            .with_base_url(config.directory.memberstack_api_base_url.clone())
            .with_credit_field(config.directory.credit_field.clone()),
    );
    let event_repository = InMemoryWebhookEventRepository::new(config.idempotency.retention_secs)
        .with_claim_lease_secs(config.idempotency.claim_lease_secs);

    let handler = HandleCheckoutWebhookHandler::new(
        Arc::new(stripe),
        Arc::new(memberstack),
        Arc::new(event_repository),
        price_table,
    );
    let app = webhook_router(
        WebhookAppState::new(handler),
        config.server.request_timeout(),
    );

    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    info!(addr = %listener.local_addr()?, "Credit bridge listening for Stripe webhooks");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Credit bridge stopped");
    Ok(())
}

/// Text logs in development, JSON in production. `RUST_LOG` overrides the
/// configured filter.
fn init_tracing(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(fmt::layer().json().with_target(true)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
