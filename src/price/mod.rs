/*
 * Price-quote providers used by the price feed
 */

mod jupiter;

use async_trait::async_trait;
use rust_decimal::Decimal;
use crate::models::Result;

pub use jupiter::JupiterPriceClient;

/// Looks up the spot price of `base_mint` denominated in `quote_mint`.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn get_price(&self, base_mint: &str, quote_mint: &str) -> Result<Decimal>;
}
