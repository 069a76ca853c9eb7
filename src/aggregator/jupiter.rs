/*
 * Jupiter quote and swap API client
 */

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};
use crate::aggregator::{Aggregator, ExchangeParams, ExchangeResponse, QuoteRequest};
use crate::config::PriorityFee;
use crate::models::{QuoteSnapshot, Result, RouteInfo, WalletError};
use crate::rpc::RpcClient;

pub struct JupiterSwapClient {
    client: Client,
    base_url: String,
    rpc: Arc<RpcClient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    swap_transaction: Option<String>,
}

impl JupiterSwapClient {
    #[must_use]
    pub fn new(base_url: &str, rpc: Arc<RpcClient>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            rpc,
        }
    }
}

fn amount_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn decimal_field(value: &Value, key: &str) -> Option<Decimal> {
    match value.get(key)? {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn fee_fraction(fee: Option<u64>, input: Option<u64>) -> Option<Decimal> {
    match (fee, input) {
        (Some(fee), Some(input)) if input > 0 => Some(Decimal::from(fee) / Decimal::from(input)),
        _ => None,
    }
}

/// Extracts routes from either the legacy `routes` array or the v6 `routePlan`.
pub(crate) fn parse_routes(payload: &Value) -> Vec<RouteInfo> {
    if let Some(routes) = payload.get("routes").and_then(Value::as_array) {
        return routes
            .iter()
            .map(|route| RouteInfo {
                label: route.get("label").and_then(Value::as_str).map(str::to_string),
                fee_fraction: route.get("lpFee").and_then(|fee| decimal_field(fee, "pct")),
                input_amount: amount_field(route, "inAmount"),
                output_amount: amount_field(route, "outAmount"),
            })
            .collect();
    }

    let Some(plan) = payload.get("routePlan").and_then(Value::as_array) else {
        return Vec::new();
    };
    if plan.is_empty() {
        return Vec::new();
    }

    let input_amount = amount_field(payload, "inAmount");
    let labels: Vec<&str> = plan
        .iter()
        .filter_map(|step| step.get("swapInfo")?.get("label")?.as_str())
        .collect();
    let fee_total = plan
        .iter()
        .filter_map(|step| step.get("swapInfo"))
        .filter_map(|info| {
            let fee = amount_field(info, "feeAmount")?;
            let step_in = amount_field(info, "inAmount")?;
            fee_fraction(Some(fee), Some(step_in))
        })
        .fold(None, |acc: Option<Decimal>, f| Some(acc.unwrap_or_default() + f));

    vec![RouteInfo {
        label: (!labels.is_empty()).then(|| labels.join(" > ")),
        fee_fraction: fee_total,
        input_amount,
        output_amount: amount_field(payload, "outAmount"),
    }]
}

#[async_trait]
impl Aggregator for JupiterSwapClient {
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteSnapshot> {
        let url = format!("{}/quote", self.base_url);
        debug!("Requesting quote for {} {} -> {}", request.amount, request.input_mint, request.output_mint);

        let response = self.client
            .get(&url)
            .query(&[
                ("inputMint", request.input_mint.as_str()),
                ("outputMint", request.output_mint.as_str()),
                ("amount", &request.amount.to_string()),
                ("slippageBps", &request.slippage_bps.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| WalletError::ProviderError(format!("Failed to parse Jupiter quote: {e}")))?;

        if !status.is_success() {
            let message = payload
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("quote request rejected");
            return Err(WalletError::ProviderError(format!("Jupiter quote {status}: {message}")));
        }

        let routes = parse_routes(&payload);
        Ok(QuoteSnapshot { payload, routes })
    }

    async fn exchange(&self, params: ExchangeParams) -> Result<ExchangeResponse> {
        let user = params.user_public_key.ok_or_else(|| {
            WalletError::InputInvalid("No wallet address to swap from".to_string())
        })?;
        let priority_fee = match params.priority_fee {
            PriorityFee::Auto => json!("auto"),
            PriorityFee::Lamports(lamports) => json!(lamports),
        };
        let body = json!({
            "quoteResponse": params.quote.payload,
            "userPublicKey": user,
            "wrapAndUnwrapSol": params.wrap_unwrap_sol,
            "prioritizationFeeLamports": priority_fee,
        });

        let response = self.client
            .post(format!("{}/swap", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<SwapResponse>()
            .await
            .map_err(|e| WalletError::ProviderError(format!("Failed to parse Jupiter swap response: {e}")))?;

        let transaction = response.swap_transaction.ok_or_else(|| {
            WalletError::ProviderError("Jupiter returned no swap transaction".to_string())
        })?;

        let signature = self.rpc.send_transaction(&transaction).await?;
        Ok(ExchangeResponse { signature: Some(signature), txid: None })
    }

    async fn is_ready(&self) -> bool {
        match self.rpc.get_health().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Exchange readiness probe failed: {}", e);
                false
            }
        }
    }
}
