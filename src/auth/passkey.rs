/*
 * Client for an external passkey (WebAuthn) ceremony service
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;
use crate::auth::{derive_address, AuthCredential, AuthProvider};
use crate::models::{Result, WalletError};
use crate::utils::short_address;

/// Delegates the WebAuthn ceremony to a companion service and derives the
/// wallet address from the returned credential id.
pub struct PasskeyServiceClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CeremonyResponse {
    credential_id: Option<String>,
    error: Option<String>,
}

impl PasskeyServiceClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn ceremony(&self, path: &str, action: &str) -> Result<AuthCredential> {
        let response = self.client
            .post(format!("{}/{path}", self.base_url))
            .send()
            .await
            .map_err(|e| WalletError::AuthFailed(format!("Passkey service unreachable: {e}")))?
            .json::<CeremonyResponse>()
            .await
            .map_err(|e| WalletError::AuthFailed(format!("Malformed passkey response: {e}")))?;

        if let Some(error) = response.error {
            return Err(WalletError::AuthFailed(error));
        }

        let credential_id = response
            .credential_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| WalletError::AuthFailed(format!("Passkey {action} was canceled or failed")))?;

        let derived_address = derive_address(&credential_id);
        info!("Passkey {} succeeded for {}...", action, short_address(&derived_address));

        Ok(AuthCredential { credential_id, derived_address })
    }
}

#[async_trait]
impl AuthProvider for PasskeyServiceClient {
    async fn register(&self) -> Result<AuthCredential> {
        self.ceremony("register", "registration").await
    }

    async fn authenticate(&self) -> Result<AuthCredential> {
        self.ceremony("authenticate", "authentication").await
    }
}
