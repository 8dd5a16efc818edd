//! Storefront payment server
//!
//! Axum-based server that creates payment intents for the storefront
//! checkout. Stateless: every request is one processor call.

mod app;
mod config;
mod handlers;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_payments::{IntentProcessor, StripeClient};

use crate::app::build_router;
use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // Initialize payments
    let processor: Option<Arc<dyn IntentProcessor>> = match StripeClient::from_env() {
        Ok(client) => {
            tracing::info!("✓ Stripe configured");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("⚠ Stripe not configured - payments disabled ({})", e);
            tracing::warn!("  Set STRIPE_KEY in .env");
            None
        }
    };

    tracing::warn!("Payment totals are taken from the caller and not checked against a basket");
    if config.expose_processor_errors {
        tracing::warn!("Processor error messages are forwarded to callers");
    }

    // Build application state
    let state = AppState {
        processor,
        expose_processor_errors: config.expose_processor_errors,
    };

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("storefront server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                - Liveness");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  POST /payment/create  - Create payment intent (?total=<cents>)");

    axum::serve(listener, app).await?;

    Ok(())
}
