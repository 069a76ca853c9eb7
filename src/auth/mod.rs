/*
 * Authentication providers (passkey credentials)
 */

mod passkey;
mod test_provider;

use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::config::{AuthConfig, AuthProviderKind};
use crate::models::{Result, WalletError};

pub use passkey::PasskeyServiceClient;
pub use test_provider::TestAuthProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCredential {
    pub credential_id: String,
    pub derived_address: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn register(&self) -> Result<AuthCredential>;
    async fn authenticate(&self) -> Result<AuthCredential>;
}

/// Derives the wallet address for a credential: the ed25519 public key seeded
/// with `sha256(credential_id)`, base58 encoded.
#[must_use]
pub fn derive_address(credential_id: &str) -> String {
    let seed: [u8; 32] = Sha256::digest(credential_id.as_bytes()).into();
    address_from_seed(&seed)
}

pub(crate) fn address_from_seed(seed: &[u8; 32]) -> String {
    let signing_key = SigningKey::from_bytes(seed);
    bs58::encode(signing_key.verifying_key().as_bytes()).into_string()
}

pub fn create_auth_provider(config: &AuthConfig) -> Result<Box<dyn AuthProvider>> {
    match config.provider {
        AuthProviderKind::Test => Ok(Box::new(TestAuthProvider::new())),
        AuthProviderKind::Passkey => {
            let url = config.passkey_service_url.as_deref().ok_or_else(|| {
                WalletError::ConfigError("PASSKEY_SERVICE_URL not set".to_string())
            })?;
            Ok(Box::new(PasskeyServiceClient::new(url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_address_is_deterministic_base58() {
        let a = derive_address("credential-1");
        let b = derive_address("credential-1");
        let c = derive_address("credential-2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        let decoded = bs58::decode(&a).into_vec().unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn passkey_provider_requires_service_url() {
        let config = AuthConfig { provider: AuthProviderKind::Passkey, passkey_service_url: None };
        assert!(matches!(create_auth_provider(&config), Err(WalletError::ConfigError(_))));
    }
}
