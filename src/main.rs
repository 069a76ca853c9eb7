/*
 * Swapgate - passkey-gated token swaps
 * Main entry point for the application
 */

use swapgate::{config::Config, api, service::WalletService};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()
        .map_err(|e| {
            eprintln!("Failed to load configuration: {e}");
            e
        })?;

    init_tracing(&config.server.log_level);

    info!("Starting Swapgate wallet service");
    info!("Configuration loaded successfully");

    let wallet_service = WalletService::new(config.clone()).await
        .map_err(|e| {
            error!("Failed to initialize wallet service: {}", e);
            e
        })?;

    let api_state = api::ApiState {
        config: config.clone(),
        wallet_service: Arc::new(wallet_service),
    };

    info!("Starting API server on {}:{}", config.server.host, config.server.port);

    let rocket = api::create_rocket(api_state);
    rocket.launch().await?;

    Ok(())
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("swapgate={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
