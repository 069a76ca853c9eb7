/*
 * Wallet service that wires configured providers into the swap orchestrator
 */

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use crate::{
    aggregator::{Aggregator, JupiterSwapClient},
    auth::create_auth_provider,
    config::Config,
    models::Result,
    notify::NoticeBoard,
    portfolio::Portfolio,
    price::{JupiterPriceClient, PriceProvider},
    rpc::RpcClient,
    swap::{SwapOrchestrator, SwapProviders},
    tokens::TokenRegistry,
};

pub struct WalletService {
    orchestrator: SwapOrchestrator,
    notices: Arc<NoticeBoard>,
}

impl WalletService {
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing Wallet Service");

        let rpc = Arc::new(RpcClient::new(&config.solana.rpc_url));
        match rpc.get_health().await {
            Ok(()) => info!("Connected to Solana RPC at {}", rpc.url()),
            Err(e) => warn!("Solana RPC not healthy yet: {}", e),
        }

        let prices: Arc<dyn PriceProvider> =
            Arc::new(JupiterPriceClient::new(&config.jupiter.price_api_url));
        info!("Jupiter price client initialized");

        let aggregator: Arc<dyn Aggregator> =
            Arc::new(JupiterSwapClient::new(&config.jupiter.quote_api_url, Arc::clone(&rpc)));
        info!("Jupiter swap client initialized");

        let auth = Arc::from(create_auth_provider(&config.auth)?);
        info!("Auth provider initialized: {:?}", config.auth.provider);

        let notices = Arc::new(NoticeBoard::default());
        let orchestrator = SwapOrchestrator::new(
            config.swap.clone(),
            TokenRegistry::mainnet(),
            Portfolio::mock(Utc::now()),
            SwapProviders {
                prices,
                aggregator,
                auth,
                notices: notices.clone(),
            },
        );
        orchestrator.probe_exchange().await;

        Ok(Self { orchestrator, notices })
    }

    #[must_use]
    pub fn orchestrator(&self) -> &SwapOrchestrator {
        &self.orchestrator
    }

    #[must_use]
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }
}
