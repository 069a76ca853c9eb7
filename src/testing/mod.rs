/*
 * Scripted provider doubles shared by the unit tests
 */

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use crate::aggregator::{Aggregator, ExchangeParams, ExchangeResponse, QuoteRequest};
use crate::auth::{derive_address, AuthCredential, AuthProvider};
use crate::models::{QuoteSnapshot, Result, RouteInfo, WalletError};
use crate::tokens::TokenRegistry;

pub fn mint(symbol: &str) -> String {
    TokenRegistry::mainnet()
        .find(symbol)
        .map(|t| t.mint_address.clone())
        .unwrap_or_default()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[derive(Default)]
pub struct MockPrices {
    prices: Mutex<HashMap<String, Decimal>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl MockPrices {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_price(&self, symbol: &str, price: &str) {
        self.prices.lock().unwrap().insert(mint(symbol), dec(price));
    }

    pub fn clear_price(&self, symbol: &str) {
        self.prices.lock().unwrap().remove(&mint(symbol));
    }

    pub fn set_delay(&self, symbol: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(mint(symbol), delay);
    }

    pub fn calls_for(&self, symbol: &str) -> usize {
        let mint = mint(symbol);
        self.calls.lock().unwrap().iter().filter(|m| **m == mint).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl crate::price::PriceProvider for MockPrices {
    async fn get_price(&self, base_mint: &str, _quote_mint: &str) -> Result<Decimal> {
        self.calls.lock().unwrap().push(base_mint.to_string());
        let delay = self.delays.lock().unwrap().get(base_mint).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.prices
            .lock()
            .unwrap()
            .get(base_mint)
            .copied()
            .ok_or_else(|| WalletError::ProviderError("no price".to_string()))
    }
}

pub enum ExchangeScript {
    Respond(ExchangeResponse),
    Fail(String),
}

pub struct MockAggregator {
    quote_error: Mutex<Option<String>>,
    quote_delay: Mutex<Option<Duration>>,
    quotes: Mutex<Vec<QuoteRequest>>,
    exchange: Mutex<ExchangeScript>,
    exchanges: Mutex<Vec<ExchangeParams>>,
    exchange_hold: Mutex<bool>,
    exchange_gate: Notify,
    ready: Mutex<bool>,
}

impl MockAggregator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            quote_error: Mutex::new(None),
            quote_delay: Mutex::new(None),
            quotes: Mutex::new(Vec::new()),
            exchange: Mutex::new(ExchangeScript::Respond(ExchangeResponse {
                signature: Some("abc".to_string()),
                txid: None,
            })),
            exchanges: Mutex::new(Vec::new()),
            exchange_hold: Mutex::new(false),
            exchange_gate: Notify::new(),
            ready: Mutex::new(true),
        })
    }

    pub fn fail_quotes(&self, message: &str) {
        *self.quote_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_quote_delay(&self, delay: Duration) {
        *self.quote_delay.lock().unwrap() = Some(delay);
    }

    pub fn script_exchange(&self, script: ExchangeScript) {
        *self.exchange.lock().unwrap() = script;
    }

    /// Makes each exchange wait for `release_exchange()` before answering.
    pub fn hold_exchange(&self) {
        *self.exchange_hold.lock().unwrap() = true;
    }

    pub fn release_exchange(&self) {
        self.exchange_gate.notify_one();
    }

    pub fn set_ready(&self, ready: bool) {
        *self.ready.lock().unwrap() = ready;
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        self.quotes.lock().unwrap().clone()
    }

    pub fn exchange_calls(&self) -> Vec<ExchangeParams> {
        self.exchanges.lock().unwrap().clone()
    }
}

#[async_trait]
impl Aggregator for MockAggregator {
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteSnapshot> {
        self.quotes.lock().unwrap().push(request.clone());
        let delay = *self.quote_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.quote_error.lock().unwrap().clone() {
            return Err(WalletError::ProviderError(message));
        }
        let out = request.amount / 2;
        Ok(QuoteSnapshot {
            payload: json!({
                "inAmount": request.amount.to_string(),
                "outAmount": out.to_string(),
            }),
            routes: vec![RouteInfo {
                label: Some("Mock".to_string()),
                fee_fraction: Some(dec("0.003")),
                input_amount: Some(request.amount),
                output_amount: Some(out),
            }],
        })
    }

    async fn exchange(&self, params: ExchangeParams) -> Result<ExchangeResponse> {
        self.exchanges.lock().unwrap().push(params);
        let hold = *self.exchange_hold.lock().unwrap();
        if hold {
            self.exchange_gate.notified().await;
        }
        match &*self.exchange.lock().unwrap() {
            ExchangeScript::Respond(response) => Ok(response.clone()),
            ExchangeScript::Fail(message) => Err(WalletError::SwapExecutionFailed(message.clone())),
        }
    }

    async fn is_ready(&self) -> bool {
        *self.ready.lock().unwrap()
    }
}

/// Authentication double. When `hold` is set, each call waits for
/// `release()` before answering.
pub struct MockAuth {
    failure: Mutex<Option<String>>,
    hold: Mutex<bool>,
    gate: Notify,
    calls: Mutex<usize>,
}

impl MockAuth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            failure: Mutex::new(None),
            hold: Mutex::new(false),
            gate: Notify::new(),
            calls: Mutex::new(0),
        })
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn hold(&self) {
        *self.hold.lock().unwrap() = true;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    async fn answer(&self) -> Result<AuthCredential> {
        *self.calls.lock().unwrap() += 1;
        let hold = *self.hold.lock().unwrap();
        if hold {
            self.gate.notified().await;
        }
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(WalletError::AuthFailed(message));
        }
        Ok(AuthCredential {
            credential_id: "cred-1".to_string(),
            derived_address: derive_address("cred-1"),
        })
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn register(&self) -> Result<AuthCredential> {
        self.answer().await
    }

    async fn authenticate(&self) -> Result<AuthCredential> {
        self.answer().await
    }
}
