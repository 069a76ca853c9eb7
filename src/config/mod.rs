/*
 * Configuration management for the swap gateway
 */

use crate::models::{Result, WalletError};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub solana: ChainConfig,
    pub jupiter: JupiterConfig,
    pub swap: SwapConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    pub rpc_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JupiterConfig {
    pub price_api_url: String,
    pub quote_api_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwapConfig {
    pub price_poll_secs: u64,
    pub quote_debounce_ms: u64,
    pub slippage_bps: u16,
    pub priority_fee: PriorityFee,
    pub wrap_unwrap_sol: bool,
    pub default_from: String,
    pub default_to: String,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            price_poll_secs: 10,
            quote_debounce_ms: 250,
            slippage_bps: 50,
            priority_fee: PriorityFee::Auto,
            wrap_unwrap_sol: true,
            default_from: "SOL".to_string(),
            default_to: "USDC".to_string(),
        }
    }
}

impl SwapConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.price_poll_secs.max(1))
    }

    #[must_use]
    pub fn quote_debounce(&self) -> Duration {
        Duration::from_millis(self.quote_debounce_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFee {
    Auto,
    Lamports(u64),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub provider: AuthProviderKind,
    pub passkey_service_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderKind {
    Passkey,
    Test,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let auth_provider: AuthProviderKind = env::var("AUTH_PROVIDER")
            .unwrap_or_else(|_| "passkey".to_string())
            .parse()?;
        let passkey_service_url = env::var("PASSKEY_SERVICE_URL").ok();
        if auth_provider == AuthProviderKind::Passkey && passkey_service_url.is_none() {
            return Err(WalletError::ConfigError(
                "PASSKEY_SERVICE_URL not set (use AUTH_PROVIDER=test for the test provider)".to_string(),
            ));
        }

        let defaults = SwapConfig::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_parse("SERVER_PORT", 8080)?,
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            solana: ChainConfig {
                rpc_url: env::var("SOLANA_RPC_URL")
                    .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string()),
            },
            jupiter: JupiterConfig {
                price_api_url: env::var("JUPITER_PRICE_API")
                    .unwrap_or_else(|_| "https://price.jup.ag/v4".to_string()),
                quote_api_url: env::var("JUPITER_QUOTE_API")
                    .unwrap_or_else(|_| "https://quote-api.jup.ag/v6".to_string()),
            },
            swap: SwapConfig {
                price_poll_secs: env_parse("PRICE_POLL_SECS", defaults.price_poll_secs)?,
                quote_debounce_ms: env_parse("QUOTE_DEBOUNCE_MS", defaults.quote_debounce_ms)?,
                slippage_bps: env_parse("SLIPPAGE_BPS", defaults.slippage_bps)?,
                priority_fee: env::var("PRIORITY_FEE")
                    .map_or(Ok(PriorityFee::Auto), |v| v.parse())?,
                ..defaults
            },
            auth: AuthConfig {
                provider: auth_provider,
                passkey_service_url,
            },
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| WalletError::ConfigError(format!("Invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

impl std::str::FromStr for AuthProviderKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "passkey" => Ok(AuthProviderKind::Passkey),
            "test" => Ok(AuthProviderKind::Test),
            _ => Err(WalletError::ConfigError(format!(
                "Unknown auth provider: {s}"
            ))),
        }
    }
}

impl std::str::FromStr for PriorityFee {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(PriorityFee::Auto);
        }
        s.trim()
            .parse()
            .map(PriorityFee::Lamports)
            .map_err(|e| WalletError::ConfigError(format!("Invalid priority fee {s}: {e}")))
    }
}
