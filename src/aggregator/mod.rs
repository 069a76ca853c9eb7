/*
 * Routed-quote and exchange providers (liquidity aggregators)
 */

mod jupiter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::config::PriorityFee;
use crate::models::{QuoteSnapshot, Result};

pub use jupiter::JupiterSwapClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: u64,
    pub slippage_bps: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangeParams {
    pub wrap_unwrap_sol: bool,
    pub quote: QuoteSnapshot,
    pub priority_fee: PriorityFee,
    pub user_public_key: Option<String>,
}

/// Either shape an aggregator may answer a successful exchange with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExchangeResponse {
    pub signature: Option<String>,
    pub txid: Option<String>,
}

impl ExchangeResponse {
    #[must_use]
    pub fn transaction_signature(&self) -> Option<&str> {
        self.signature
            .as_deref()
            .or(self.txid.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[async_trait]
pub trait Aggregator: Send + Sync {
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteSnapshot>;
    async fn exchange(&self, params: ExchangeParams) -> Result<ExchangeResponse>;
    async fn is_ready(&self) -> bool;
}
