/*
 * Data models and types for the swap gateway
 */

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub mint_address: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub from: TokenDescriptor,
    pub to: TokenDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub label: Option<String>,
    pub fee_fraction: Option<Decimal>,
    pub input_amount: Option<u64>,
    pub output_amount: Option<u64>,
}

/// Raw quote payload as returned by the aggregator, with its parsed routes.
/// The payload is handed back verbatim when executing a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub payload: serde_json::Value,
    pub routes: Vec<RouteInfo>,
}

impl QuoteSnapshot {
    #[must_use]
    pub fn best_route(&self) -> Option<&RouteInfo> {
        self.routes.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteState {
    pub pair: Option<TokenPair>,
    pub amount: Option<u64>,
    pub price: Option<Decimal>,
    pub quote: Option<QuoteSnapshot>,
    pub route: Option<RouteInfo>,
    pub last_error: Option<String>,
    pub is_loading: bool,
    pub refreshes: u64,
    pub last_refresh: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub is_authenticated: bool,
    pub public_key_address: Option<String>,
    pub passkey_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Work deferred until the user has authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    Swap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapReceipt {
    pub signature: String,
    pub from_symbol: String,
    pub to_symbol: String,
    pub from_amount: String,
    pub estimated_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapOutcome {
    AuthRequired,
    Executed(SwapReceipt),
    Rejected { reason: String },
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid input: {0}")]
    InputInvalid(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Authentication cancelled")]
    AuthCancelled,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Swap execution failed: {0}")]
    SwapExecutionFailed(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl WalletError {
    /// The bare message, without the category prefix, for user-facing notices.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            WalletError::InputInvalid(msg)
            | WalletError::ServiceUnavailable(msg)
            | WalletError::ProviderError(msg)
            | WalletError::AuthFailed(msg)
            | WalletError::SwapExecutionFailed(msg)
            | WalletError::RpcError(msg)
            | WalletError::ConfigError(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
