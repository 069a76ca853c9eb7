/*
 * Authentication gate: defers an action until the user has authenticated
 */

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use crate::auth::{AuthCredential, AuthProvider};
use crate::models::{AuthSession, AuthState, PendingAction, Result, WalletError};
use crate::notify::{Notice, NotificationSink};
use crate::utils::short_address;

/// What the caller should do after asking for a gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Already authenticated: run the action now.
    Proceed(PendingAction),
    /// The action was parked; show the authentication prompt.
    PromptRequired,
}

#[derive(Debug, Clone, Copy)]
enum Ceremony {
    Login,
    Register,
}

impl Ceremony {
    fn success_title(self) -> &'static str {
        match self {
            Ceremony::Login => "Login successful",
            Ceremony::Register => "Registration successful",
        }
    }

    fn failure_title(self) -> &'static str {
        match self {
            Ceremony::Login => "Authentication failed",
            Ceremony::Register => "Registration failed",
        }
    }
}

#[derive(Debug)]
struct GateInner {
    state: AuthState,
    pending: Option<PendingAction>,
    cancelled: bool,
    // Bumped by every ceremony start, cancel and logout; a ceremony whose
    // attempt id is no longer current must not hand out the pending action.
    attempt: u64,
}

pub struct AuthGate {
    provider: Arc<dyn AuthProvider>,
    notices: Arc<dyn NotificationSink>,
    session: watch::Sender<AuthSession>,
    inner: Mutex<GateInner>,
}

impl AuthGate {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>, notices: Arc<dyn NotificationSink>) -> Self {
        let (session, _) = watch::channel(AuthSession::default());
        Self {
            provider,
            notices,
            session,
            inner: Mutex::new(GateInner {
                state: AuthState::Unauthenticated,
                pending: None,
                cancelled: false,
                attempt: 0,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, GateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request_with_auth(&self, action: PendingAction) -> GateDecision {
        let mut inner = self.inner();
        if self.session.borrow().is_authenticated {
            return GateDecision::Proceed(action);
        }
        if inner.pending.replace(action).is_some() {
            debug!("Replacing previously pending {:?}", action);
        }
        inner.cancelled = false;
        GateDecision::PromptRequired
    }

    /// Runs the login ceremony. On success returns the pending action, if any,
    /// which the caller must run; it is handed out at most once.
    pub async fn confirm_authenticate(&self) -> Result<Option<PendingAction>> {
        self.complete(Ceremony::Login).await
    }

    pub async fn confirm_register(&self) -> Result<Option<PendingAction>> {
        self.complete(Ceremony::Register).await
    }

    async fn complete(&self, ceremony: Ceremony) -> Result<Option<PendingAction>> {
        let attempt = {
            let mut inner = self.inner();
            inner.attempt += 1;
            inner.state = AuthState::Authenticating;
            inner.attempt
        };

        let result = match ceremony {
            Ceremony::Login => self.provider.authenticate().await,
            Ceremony::Register => self.provider.register().await,
        };

        let mut inner = self.inner();
        let superseded = inner.attempt != attempt;
        match result {
            Ok(AuthCredential { credential_id, derived_address }) => {
                self.session.send_replace(AuthSession {
                    is_authenticated: true,
                    public_key_address: Some(derived_address.clone()),
                    passkey_id: Some(credential_id),
                });
                inner.state = AuthState::Authenticated;
                self.notices.notify(Notice::success(
                    ceremony.success_title(),
                    format!("Your Solana address: {}...", short_address(&derived_address)),
                ));

                // Cancel and logout already cleared the slot; a newer ceremony
                // still owns whatever is parked there.
                if superseded || inner.cancelled {
                    info!("Authenticated by a superseded attempt; pending action left in place");
                    return Ok(None);
                }
                Ok(inner.pending.take())
            }
            Err(e) => {
                if superseded {
                    debug!("Ignoring failure of a cancelled authentication attempt: {}", e);
                    return Err(WalletError::AuthCancelled);
                }
                let message = e.detail();
                warn!("{}: {}", ceremony.failure_title(), message);
                inner.pending = None;
                inner.state = if self.session.borrow().is_authenticated {
                    AuthState::Authenticated
                } else {
                    AuthState::Unauthenticated
                };
                self.notices.notify(Notice::destructive(ceremony.failure_title(), message.clone()));
                Err(WalletError::AuthFailed(message))
            }
        }
    }

    pub fn cancel_authenticate(&self) {
        let mut inner = self.inner();
        inner.cancelled = true;
        inner.pending = None;
        inner.attempt += 1;
        if !self.session.borrow().is_authenticated {
            inner.state = AuthState::Unauthenticated;
        }
        self.notices.notify(Notice::destructive(
            "Authentication cancelled",
            "You cancelled the authentication process",
        ));
    }

    /// Returns whether the last prompt was cancelled, clearing the flag.
    pub fn take_cancelled(&self) -> bool {
        std::mem::take(&mut self.inner().cancelled)
    }

    pub fn logout(&self) {
        let mut inner = self.inner();
        inner.state = AuthState::Unauthenticated;
        inner.pending = None;
        inner.cancelled = false;
        inner.attempt += 1;
        self.session.send_replace(AuthSession::default());
        self.notices.notify(Notice::info("Logged out", "You have been logged out successfully"));
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.inner().state
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingAction> {
        self.inner().pending
    }

    #[must_use]
    pub fn session(&self) -> AuthSession {
        self.session.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.session.subscribe()
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
