/*
 * Deterministic authentication provider, enabled with AUTH_PROVIDER=test
 */

use async_trait::async_trait;
use crate::auth::{address_from_seed, AuthCredential, AuthProvider};
use crate::models::Result;

pub const TEST_CREDENTIAL_ID: &str = "test-passkey-id";
const TEST_SEED: [u8; 32] = [42; 32];

/// Always succeeds with the same credential and address. Never selected
/// implicitly; it has to be configured.
#[derive(Debug, Default)]
pub struct TestAuthProvider;

impl TestAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn credential() -> AuthCredential {
        AuthCredential {
            credential_id: TEST_CREDENTIAL_ID.to_string(),
            derived_address: address_from_seed(&TEST_SEED),
        }
    }
}

#[async_trait]
impl AuthProvider for TestAuthProvider {
    async fn register(&self) -> Result<AuthCredential> {
        Ok(Self::credential())
    }

    async fn authenticate(&self) -> Result<AuthCredential> {
        Ok(Self::credential())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_and_login_agree() {
        let provider = TestAuthProvider::new();
        let registered = provider.register().await.unwrap();
        let logged_in = provider.authenticate().await.unwrap();
        assert_eq!(registered, logged_in);
        assert_eq!(registered.credential_id, TEST_CREDENTIAL_ID);
    }
}
