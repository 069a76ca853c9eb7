/*
 * Jupiter price API client
 */

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use crate::price::PriceProvider;
use crate::models::{Result, WalletError};

pub struct JupiterPriceClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct JupiterPriceResponse {
    data: Option<HashMap<String, JupiterPriceEntry>>,
}

#[derive(Debug, Deserialize)]
struct JupiterPriceEntry {
    price: Option<f64>,
}

impl JupiterPriceClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PriceProvider for JupiterPriceClient {
    async fn get_price(&self, base_mint: &str, quote_mint: &str) -> Result<Decimal> {
        let url = format!("{}/price", self.base_url);

        let response = self.client
            .get(&url)
            .query(&[("ids", base_mint), ("vsToken", quote_mint)])
            .send()
            .await?
            .error_for_status()?
            .json::<JupiterPriceResponse>()
            .await
            .map_err(|e| WalletError::ProviderError(format!("Failed to parse Jupiter price response: {e}")))?;

        let price = response
            .data
            .as_ref()
            .and_then(|data| data.get(base_mint))
            .and_then(|entry| entry.price)
            .ok_or_else(|| WalletError::ProviderError(format!("No price returned for {base_mint}")))?;

        Decimal::from_f64(price)
            .ok_or_else(|| WalletError::ProviderError(format!("Price out of range: {price}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const SOL: &str = "So11111111111111111111111111111111111111112";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    #[tokio::test]
    async fn parses_price_for_base_mint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/price")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("ids".into(), SOL.into()),
                mockito::Matcher::UrlEncoded("vsToken".into(), USDC.into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"data":{{"{SOL}":{{"id":"{SOL}","price":20.5}}}}}}"#))
            .create_async()
            .await;

        let client = JupiterPriceClient::new(&server.url());
        let price = client.get_price(SOL, USDC).await.unwrap();

        assert_eq!(price, Decimal::from_str("20.5").unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_price_field_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/price")
            .match_query(mockito::Matcher::Any)
            .with_body(format!(r#"{{"data":{{"{SOL}":{{"id":"{SOL}"}}}}}}"#))
            .create_async()
            .await;

        let client = JupiterPriceClient::new(&server.url());
        assert!(matches!(
            client.get_price(SOL, USDC).await,
            Err(WalletError::ProviderError(_))
        ));
    }

    #[tokio::test]
    async fn http_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/price")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = JupiterPriceClient::new(&server.url());
        assert!(client.get_price(SOL, USDC).await.is_err());
    }
}
