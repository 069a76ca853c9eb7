/*
 * Swapgate - passkey-gated token swaps
 * Core library exports and module declarations
 */

pub mod aggregator;
pub mod api;
pub mod auth;
pub mod config;
pub mod feed;
pub mod gate;
pub mod models;
pub mod notify;
pub mod portfolio;
pub mod price;
pub mod rpc;
pub mod service;
pub mod swap;
pub mod tokens;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use models::*;
pub use service::WalletService;
pub use swap::SwapOrchestrator;
