/*
 * Static token registry
 */

use serde::Serialize;
use crate::models::TokenDescriptor;

const MAINNET_TOKENS: [(&str, &str, u32); 4] = [
    ("SOL", "So11111111111111111111111111111111111111112", 9),
    ("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", 6),
    ("BONK", "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", 5),
    ("RAY", "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R", 6),
];

/// Ordered, immutable list of the tokens the swap form can trade.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRegistry {
    tokens: Vec<TokenDescriptor>,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl TokenRegistry {
    #[must_use]
    pub fn new(tokens: Vec<TokenDescriptor>) -> Self {
        Self { tokens }
    }

    #[must_use]
    pub fn mainnet() -> Self {
        Self::new(
            MAINNET_TOKENS
                .iter()
                .map(|(symbol, mint, decimals)| TokenDescriptor {
                    symbol: (*symbol).to_string(),
                    mint_address: (*mint).to_string(),
                    decimals: *decimals,
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn find(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }

    #[must_use]
    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }
}
