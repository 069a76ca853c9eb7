/*
 * Price feed: polled spot price plus debounced routed quotes for one pair
 */

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use crate::aggregator::{Aggregator, QuoteRequest};
use crate::models::{QuoteSnapshot, QuoteState, Result, TokenPair};
use crate::price::PriceProvider;
use crate::tokens::TokenRegistry;
use crate::utils::to_base_units;

#[derive(Debug, Clone, Copy)]
pub struct FeedSettings {
    pub poll_interval: Duration,
    pub quote_debounce: Duration,
    pub slippage_bps: u16,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            quote_debounce: Duration::from_millis(250),
            slippage_bps: 50,
        }
    }
}

// Epochs are only bumped inside `state.send_modify`, so reading one while
// holding the watch lock gives a consistent view with the pair it tags.
struct FeedShared {
    prices: Arc<dyn PriceProvider>,
    aggregator: Arc<dyn Aggregator>,
    state: watch::Sender<QuoteState>,
    pair_epoch: AtomicU64,
    quote_epoch: AtomicU64,
}

impl FeedShared {
    async fn fetch_price(&self) -> Option<Decimal> {
        let (epoch, pair) = {
            let state = self.state.borrow();
            (self.pair_epoch.load(Ordering::SeqCst), state.pair.clone())
        };

        let price = match &pair {
            Some(pair) => match self
                .prices
                .get_price(&pair.from.mint_address, &pair.to.mint_address)
                .await
            {
                Ok(price) => Some(price),
                Err(e) => {
                    warn!("Error fetching price for {}/{}: {}", pair.from.symbol, pair.to.symbol, e);
                    None
                }
            },
            None => None,
        };

        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.pair_epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            applied = true;
            let changed = state.price != price;
            state.price = price;
            changed
        });

        if applied {
            price
        } else {
            debug!("Discarding price response for a replaced pair");
            None
        }
    }

    async fn run_quote(&self, epoch: u64, request: QuoteRequest) {
        if self.quote_epoch.load(Ordering::SeqCst) != epoch {
            return;
        }
        let result: Result<QuoteSnapshot> = self.aggregator.quote(&request).await;

        self.state.send_if_modified(|state| {
            if self.quote_epoch.load(Ordering::SeqCst) != epoch {
                debug!("Discarding quote response for {} base units", request.amount);
                return false;
            }
            match result {
                Ok(snapshot) => {
                    state.route = snapshot.best_route().cloned();
                    state.quote = Some(snapshot);
                    state.last_error = None;
                }
                Err(e) => {
                    warn!("Quote request failed: {}", e);
                    state.route = None;
                    state.quote = None;
                    state.last_error = Some(e.detail());
                }
            }
            state.is_loading = false;
            true
        });
    }
}

/// Owns the polling task and the quote task for the current pair. Both are
/// aborted when the pair changes and when the feed is dropped.
///
/// Must be used from within a Tokio runtime.
pub struct PriceFeed {
    shared: Arc<FeedShared>,
    registry: TokenRegistry,
    settings: FeedSettings,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    quote_task: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PriceFeed {
    #[must_use]
    pub fn new(
        registry: TokenRegistry,
        prices: Arc<dyn PriceProvider>,
        aggregator: Arc<dyn Aggregator>,
        settings: FeedSettings,
    ) -> Self {
        let (state, _) = watch::channel(QuoteState::default());
        Self {
            shared: Arc::new(FeedShared {
                prices,
                aggregator,
                state,
                pair_epoch: AtomicU64::new(0),
                quote_epoch: AtomicU64::new(0),
            }),
            registry,
            settings,
            poll_task: Mutex::new(None),
            quote_task: Mutex::new(None),
        }
    }

    /// Switches to a new pair: clears price and quote, stops the old poller
    /// and, when both symbols are known, starts polling the new pair.
    pub fn set_pair(&self, from: &str, to: &str) {
        let mut poll_task = lock(&self.poll_task);
        if let Some(handle) = poll_task.take() {
            handle.abort();
        }
        if let Some(handle) = lock(&self.quote_task).take() {
            handle.abort();
        }

        let pair = match (self.registry.find(from), self.registry.find(to)) {
            (Some(from), Some(to)) => Some(TokenPair { from: from.clone(), to: to.clone() }),
            _ => None,
        };

        let shared = &self.shared;
        shared.state.send_modify(|state| {
            shared.pair_epoch.fetch_add(1, Ordering::SeqCst);
            shared.quote_epoch.fetch_add(1, Ordering::SeqCst);
            state.pair = pair.clone();
            state.amount = None;
            state.price = None;
            state.quote = None;
            state.route = None;
            state.last_error = None;
            state.is_loading = false;
        });

        let Some(pair) = pair else {
            info!("Price polling stopped: {}/{} is not a known pair", from, to);
            return;
        };

        info!("Polling {}/{} every {:?}", pair.from.symbol, pair.to.symbol, self.settings.poll_interval);
        let shared = Arc::clone(&self.shared);
        let period = self.settings.poll_interval;
        *poll_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                shared.fetch_price().await;
            }
        }));
    }

    /// Fetches the price for the current pair once. Failures leave the price
    /// empty and are only logged.
    pub async fn fetch_price(&self) -> Option<Decimal> {
        self.shared.fetch_price().await
    }

    /// Requests a routed quote for `amount` of the source token after the
    /// debounce window; a newer call inside the window replaces this one.
    /// Anything that is not a positive amount clears the quote.
    pub fn fetch_quote(&self, amount: &str) {
        let mut quote_task = lock(&self.quote_task);
        if let Some(handle) = quote_task.take() {
            handle.abort();
        }

        let shared = &self.shared;
        let slippage_bps = self.settings.slippage_bps;
        let mut pending = None;
        shared.state.send_modify(|state| {
            let epoch = shared.quote_epoch.fetch_add(1, Ordering::SeqCst) + 1;
            let units = state
                .pair
                .as_ref()
                .and_then(|pair| to_base_units(amount, pair.from.decimals))
                .filter(|units| *units > 0);
            state.amount = units;
            match (&state.pair, units) {
                (Some(pair), Some(units)) => {
                    state.is_loading = true;
                    pending = Some((epoch, quote_request(pair, units, slippage_bps)));
                }
                _ => {
                    state.quote = None;
                    state.route = None;
                    state.last_error = None;
                    state.is_loading = false;
                }
            }
        });

        if let Some((epoch, request)) = pending {
            *quote_task = Some(self.spawn_quote(epoch, request, self.settings.quote_debounce));
        }
    }

    /// Re-requests the quote for the current amount immediately and records
    /// the refresh.
    pub fn refresh(&self) {
        let mut quote_task = lock(&self.quote_task);
        if let Some(handle) = quote_task.take() {
            handle.abort();
        }

        let shared = &self.shared;
        let slippage_bps = self.settings.slippage_bps;
        let mut pending = None;
        shared.state.send_modify(|state| {
            let epoch = shared.quote_epoch.fetch_add(1, Ordering::SeqCst) + 1;
            state.refreshes += 1;
            state.last_refresh = Some(Utc::now());
            if let (Some(pair), Some(units)) = (&state.pair, state.amount) {
                state.is_loading = true;
                pending = Some((epoch, quote_request(pair, units, slippage_bps)));
            } else {
                state.is_loading = false;
            }
        });

        if let Some((epoch, request)) = pending {
            *quote_task = Some(self.spawn_quote(epoch, request, Duration::ZERO));
        }
    }

    fn spawn_quote(&self, epoch: u64, request: QuoteRequest, delay: Duration) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            shared.run_quote(epoch, request).await;
        })
    }

    #[must_use]
    pub fn state(&self) -> QuoteState {
        self.shared.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuoteState> {
        self.shared.state.subscribe()
    }

    #[must_use]
    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Stops polling and drops any pending quote request.
    pub fn shutdown(&self) {
        if let Some(handle) = lock(&self.poll_task).take() {
            handle.abort();
        }
        if let Some(handle) = lock(&self.quote_task).take() {
            handle.abort();
        }
    }
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn quote_request(pair: &TokenPair, amount: u64, slippage_bps: u16) -> QuoteRequest {
    QuoteRequest {
        input_mint: pair.from.mint_address.clone(),
        output_mint: pair.to.mint_address.clone(),
        amount,
        slippage_bps,
    }
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
