/*
 * Swap orchestrator: form state, price feed and auth gate around one exchange call
 */

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use crate::aggregator::{Aggregator, ExchangeParams};
use crate::auth::AuthProvider;
use crate::config::SwapConfig;
use crate::feed::{FeedSettings, PriceFeed};
use crate::gate::{AuthGate, GateDecision};
use crate::models::{
    AuthSession, AuthState, PendingAction, QuoteState, Result, RouteInfo, SwapOutcome,
    SwapReceipt, WalletError,
};
use crate::notify::{Notice, NotificationSink};
use crate::portfolio::Portfolio;
use crate::price::PriceProvider;
use crate::tokens::TokenRegistry;
use crate::utils::{estimated_output, parse_amount};

#[derive(Debug, Clone, Default)]
struct SwapForm {
    from_token: String,
    to_token: String,
    from_amount: String,
    last_error: Option<String>,
}

/// Everything a client needs to render the swap form.
#[derive(Debug, Clone, Serialize)]
pub struct SwapSnapshot {
    pub from_token: String,
    pub to_token: String,
    pub from_amount: String,
    pub from_balance: String,
    pub to_balance: String,
    pub price: Option<Decimal>,
    pub estimated_output: String,
    pub route: Option<RouteInfo>,
    pub quote_loading: bool,
    pub error: Option<String>,
    pub is_swapping: bool,
    pub exchange_available: bool,
    pub auth_state: AuthState,
    pub session: AuthSession,
}

pub struct SwapProviders {
    pub prices: Arc<dyn PriceProvider>,
    pub aggregator: Arc<dyn Aggregator>,
    pub auth: Arc<dyn AuthProvider>,
    pub notices: Arc<dyn NotificationSink>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SwapOrchestrator {
    gate: AuthGate,
    feed: PriceFeed,
    aggregator: Arc<dyn Aggregator>,
    notices: Arc<dyn NotificationSink>,
    registry: TokenRegistry,
    portfolio: Portfolio,
    config: SwapConfig,
    form: Arc<Mutex<SwapForm>>,
    exchange_available: AtomicBool,
    swapping: AtomicBool,
    quote_watcher: JoinHandle<()>,
}

impl SwapOrchestrator {
    /// Builds the orchestrator and starts polling the configured default
    /// pair. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(
        config: SwapConfig,
        registry: TokenRegistry,
        portfolio: Portfolio,
        providers: SwapProviders,
    ) -> Self {
        let feed = PriceFeed::new(
            registry.clone(),
            providers.prices,
            Arc::clone(&providers.aggregator),
            FeedSettings {
                poll_interval: config.poll_interval(),
                quote_debounce: config.quote_debounce(),
                slippage_bps: config.slippage_bps,
            },
        );
        let gate = AuthGate::new(providers.auth, Arc::clone(&providers.notices));
        let form = Arc::new(Mutex::new(SwapForm {
            from_token: config.default_from.clone(),
            to_token: config.default_to.clone(),
            ..SwapForm::default()
        }));

        feed.set_pair(&config.default_from, &config.default_to);
        let quote_watcher = spawn_quote_watcher(
            feed.subscribe(),
            Arc::clone(&form),
            Arc::clone(&providers.notices),
        );

        Self {
            gate,
            feed,
            aggregator: providers.aggregator,
            notices: providers.notices,
            registry,
            portfolio,
            config,
            form,
            exchange_available: AtomicBool::new(true),
            swapping: AtomicBool::new(false),
            quote_watcher,
        }
    }

    fn form(&self) -> MutexGuard<'_, SwapForm> {
        lock(&self.form)
    }

    fn known_token(&self, symbol: &str) -> Result<()> {
        self.registry
            .find(symbol)
            .map(|_| ())
            .ok_or_else(|| WalletError::InputInvalid(format!("Unknown token: {symbol}")))
    }

    pub fn set_pair(&self, from: &str, to: &str) -> Result<()> {
        self.known_token(from)?;
        self.known_token(to)?;
        let amount = {
            let mut form = self.form();
            form.from_token = from.to_string();
            form.to_token = to.to_string();
            form.from_amount.clone()
        };
        self.feed.set_pair(from, to);
        self.feed.fetch_quote(&amount);
        Ok(())
    }

    pub fn set_from_token(&self, symbol: &str) -> Result<()> {
        let to = self.form().to_token.clone();
        self.set_pair(symbol, &to)
    }

    pub fn set_to_token(&self, symbol: &str) -> Result<()> {
        let from = self.form().from_token.clone();
        self.set_pair(&from, symbol)
    }

    /// Swaps source and destination and clears the amount.
    pub fn switch_tokens(&self) {
        let (from, to) = {
            let mut form = self.form();
            let SwapForm { from_token, to_token, .. } = &mut *form;
            std::mem::swap(from_token, to_token);
            form.from_amount.clear();
            (form.from_token.clone(), form.to_token.clone())
        };
        self.feed.set_pair(&from, &to);
        self.feed.fetch_quote("");
    }

    /// Accepts an empty string or a non-negative number; anything else is
    /// ignored and `false` is returned. Accepted input re-quotes and
    /// re-fetches the price.
    pub async fn set_from_amount(&self, value: &str) -> bool {
        if !value.trim().is_empty() && parse_amount(value).is_none() {
            return false;
        }
        self.form().from_amount = value.to_string();
        self.feed.fetch_quote(value);
        if !value.trim().is_empty() {
            self.feed.fetch_price().await;
        }
        true
    }

    pub async fn request_swap(&self) -> SwapOutcome {
        if let GateDecision::PromptRequired = self.gate.request_with_auth(PendingAction::Swap) {
            info!("Swap requested while signed out; waiting for authentication");
            return SwapOutcome::AuthRequired;
        }

        if self.gate.take_cancelled() {
            self.notices.notify(Notice::destructive(
                "Authentication cancelled",
                "Please authenticate to perform this action",
            ));
            return rejected(&WalletError::AuthCancelled);
        }

        let form = self.form().clone();
        let quote_state = self.feed.state();
        let quote = match validate(&self.registry, &form, &quote_state) {
            Ok(quote) => quote,
            Err(e) => {
                self.notices.notify(Notice::destructive(
                    "Invalid",
                    "Enter an amount and make sure a conversion route is found.",
                ));
                return rejected(&e);
            }
        };

        if !self.exchange_available.load(Ordering::SeqCst) {
            self.notices.notify(Notice::destructive(
                "Jupiter unavailable",
                "The swap service is currently unavailable. Please try again later.",
            ));
            return rejected(&WalletError::ServiceUnavailable("exchange provider not ready".to_string()));
        }

        let Some(_in_flight) = InFlight::acquire(&self.swapping) else {
            return rejected(&WalletError::InputInvalid("Swap already in progress".to_string()));
        };
        self.form().last_error = None;

        let params = ExchangeParams {
            wrap_unwrap_sol: self.config.wrap_unwrap_sol,
            quote,
            priority_fee: self.config.priority_fee,
            user_public_key: self.gate.session().public_key_address,
        };
        let result = self.aggregator.exchange(params).await.and_then(|response| {
            response.transaction_signature().map(str::to_string).ok_or_else(|| {
                WalletError::SwapExecutionFailed(
                    "Swap transaction failed: No transaction signature returned".to_string(),
                )
            })
        });

        match result {
            Ok(signature) => {
                let receipt = SwapReceipt {
                    signature,
                    estimated_output: estimated_output(&form.from_amount, quote_state.price),
                    from_symbol: form.from_token,
                    to_symbol: form.to_token,
                    from_amount: form.from_amount,
                };
                info!("Swap executed: {} {} -> {} ({})", receipt.from_amount, receipt.from_symbol, receipt.to_symbol, receipt.signature);
                self.notices.notify(Notice::success(
                    "Swap executed!",
                    format!(
                        "Swapped {} {} for ~{} {}",
                        receipt.from_amount, receipt.from_symbol, receipt.estimated_output, receipt.to_symbol
                    ),
                ));
                self.form().from_amount.clear();
                self.feed.fetch_quote("");
                self.feed.refresh();
                self.feed.fetch_price().await;
                SwapOutcome::Executed(receipt)
            }
            Err(e) => {
                let message = e.detail();
                error!("Swap failed: {}", message);
                self.form().last_error = Some(message.clone());
                self.notices.notify(Notice::destructive("Swap failed", message.clone()));
                SwapOutcome::Rejected { reason: message }
            }
        }
    }

    /// Completes the login prompt and runs the swap that was waiting on it.
    pub async fn confirm_authenticate(&self) -> Result<Option<SwapOutcome>> {
        let action = self.gate.confirm_authenticate().await?;
        Ok(self.dispatch(action).await)
    }

    pub async fn confirm_register(&self) -> Result<Option<SwapOutcome>> {
        let action = self.gate.confirm_register().await?;
        Ok(self.dispatch(action).await)
    }

    async fn dispatch(&self, action: Option<PendingAction>) -> Option<SwapOutcome> {
        match action? {
            PendingAction::Swap => Some(self.request_swap().await),
        }
    }

    pub fn cancel_authenticate(&self) {
        self.gate.cancel_authenticate();
    }

    pub fn logout(&self) {
        self.gate.logout();
    }

    /// Returns the wallet address and records an "Address copied" notice.
    pub fn copy_address(&self) -> Option<String> {
        let address = self.gate.session().public_key_address?;
        self.notices.notify(Notice::info("Address copied", address.clone()));
        Some(address)
    }

    /// Probes the exchange provider and records whether swaps can be sent.
    pub async fn probe_exchange(&self) -> bool {
        let ready = self.aggregator.is_ready().await;
        if !ready {
            warn!("Exchange provider is not available");
        }
        self.exchange_available.store(ready, Ordering::SeqCst);
        ready
    }

    pub fn refresh(&self) {
        self.feed.refresh();
    }

    pub async fn refresh_price(&self) -> Option<Decimal> {
        self.feed.fetch_price().await
    }

    #[must_use]
    pub fn estimated_output(&self) -> String {
        estimated_output(&self.form().from_amount, self.feed.state().price)
    }

    #[must_use]
    pub fn from_amount(&self) -> String {
        self.form().from_amount.clone()
    }

    #[must_use]
    pub fn quote_state(&self) -> QuoteState {
        self.feed.state()
    }

    #[must_use]
    pub fn session(&self) -> AuthSession {
        self.gate.session()
    }

    #[must_use]
    pub fn subscribe_quotes(&self) -> watch::Receiver<QuoteState> {
        self.feed.subscribe()
    }

    #[must_use]
    pub fn subscribe_session(&self) -> watch::Receiver<AuthSession> {
        self.gate.subscribe()
    }

    #[must_use]
    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    #[must_use]
    pub fn snapshot(&self) -> SwapSnapshot {
        let form = self.form().clone();
        let quote = self.feed.state();
        SwapSnapshot {
            from_balance: self.portfolio.balance_label(&form.from_token),
            to_balance: self.portfolio.balance_label(&form.to_token),
            estimated_output: estimated_output(&form.from_amount, quote.price),
            price: quote.price,
            route: quote.route,
            quote_loading: quote.is_loading,
            error: quote.last_error.or(form.last_error),
            from_token: form.from_token,
            to_token: form.to_token,
            from_amount: form.from_amount,
            is_swapping: self.swapping.load(Ordering::SeqCst),
            exchange_available: self.exchange_available.load(Ordering::SeqCst),
            auth_state: self.gate.state(),
            session: self.gate.session(),
        }
    }
}

impl Drop for SwapOrchestrator {
    fn drop(&mut self) {
        self.quote_watcher.abort();
    }
}

// Clears the swapping flag even if the request future is dropped mid-call.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn rejected(error: &WalletError) -> SwapOutcome {
    SwapOutcome::Rejected { reason: error.to_string() }
}

fn validate(
    registry: &TokenRegistry,
    form: &SwapForm,
    quote_state: &QuoteState,
) -> Result<crate::models::QuoteSnapshot> {
    let amount = parse_amount(&form.from_amount).unwrap_or_default();
    if amount <= Decimal::ZERO {
        return Err(WalletError::InputInvalid("Amount must be positive".to_string()));
    }
    if registry.find(&form.from_token).is_none() {
        return Err(WalletError::InputInvalid(format!("Unknown token: {}", form.from_token)));
    }
    match (&quote_state.route, &quote_state.quote) {
        (Some(_), Some(quote)) => Ok(quote.clone()),
        _ => Err(WalletError::InputInvalid("No conversion route found".to_string())),
    }
}

// Raises "Swap Service Issue" whenever a new quote error shows up while the
// user has an amount entered.
fn spawn_quote_watcher(
    mut updates: watch::Receiver<QuoteState>,
    form: Arc<Mutex<SwapForm>>,
    notices: Arc<dyn NotificationSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_seen: Option<String> = None;
        while updates.changed().await.is_ok() {
            let current = updates.borrow_and_update().last_error.clone();
            if current != last_seen {
                let has_amount = !lock(&form).from_amount.trim().is_empty();
                if current.is_some() && has_amount {
                    notices.notify(Notice::destructive(
                        "Swap Service Issue",
                        "There was an issue connecting to the swap service. Please try again later.",
                    ));
                }
                last_seen = current;
            }
        }
    })
}

#[cfg(test)]
#[path = "swap_test.rs"]
mod tests;
