/*
 * Mock portfolio shown on the dashboard and next to the swap form
 */

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Swap,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub id: String,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub from_token: Option<String>,
    pub to_token: Option<String>,
    pub from_amount: Option<Decimal>,
    pub to_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub balance: Decimal,
}

/// Fixed balances and history; nothing here is read from the chain.
#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,
    pub transactions: Vec<TransactionRecord>,
}

impl Portfolio {
    #[must_use]
    pub fn mock(now: DateTime<Utc>) -> Self {
        let holdings = [
            ("SOL", Decimal::new(15, 1)),
            ("USDC", Decimal::new(1000, 1)),
            ("BONK", Decimal::new(100_000, 1)),
            ("RAY", Decimal::new(250, 1)),
        ]
        .into_iter()
        .map(|(symbol, balance)| Holding { symbol: symbol.to_string(), balance })
        .collect();

        let transactions = vec![
            swap_record("tx1", now - Duration::hours(1), ("SOL", Decimal::new(5, 1)), ("USDC", Decimal::new(1025, 2))),
            TransactionRecord {
                id: "tx2".to_string(),
                kind: TransactionKind::Transfer,
                timestamp: now - Duration::hours(2),
                amount: Decimal::from(10),
                status: TransactionStatus::Confirmed,
                from_token: None,
                to_token: None,
                from_amount: None,
                to_amount: None,
            },
            swap_record("tx3", now - Duration::days(1), ("USDC", Decimal::from(25)), ("SOL", Decimal::new(12, 1))),
        ];

        Self { holdings, transactions }
    }

    /// Balance formatted for display, `"--"` for tokens not held.
    #[must_use]
    pub fn balance_label(&self, symbol: &str) -> String {
        self.holdings
            .iter()
            .find(|h| h.symbol == symbol)
            .map_or_else(|| "--".to_string(), |h| h.balance.to_string())
    }
}

fn swap_record(
    id: &str,
    timestamp: DateTime<Utc>,
    (from_token, from_amount): (&str, Decimal),
    (to_token, to_amount): (&str, Decimal),
) -> TransactionRecord {
    TransactionRecord {
        id: id.to_string(),
        kind: TransactionKind::Swap,
        timestamp,
        amount: to_amount,
        status: TransactionStatus::Confirmed,
        from_token: Some(from_token.to_string()),
        to_token: Some(to_token.to_string()),
        from_amount: Some(from_amount),
        to_amount: Some(to_amount),
    }
}
