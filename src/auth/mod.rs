//! Credential exchange for the model endpoint.
//!
//! A service credential document is turned into a short-lived bearer token
//! through a signed-assertion exchange. Tokens are used for one call and
//! never cached.

pub mod credential;
pub mod exchange;

pub use credential::{BearerToken, ServiceCredential, DEFAULT_TOKEN_URI};
pub use exchange::{
    sign_assertion, AssertionClaims, ServiceAccountTokenProvider, CLOUD_PLATFORM_SCOPE,
    JWT_BEARER_GRANT,
};

use async_trait::async_trait;

use crate::error::Result;

/// Source of bearer tokens for the model call.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtains a fresh token. Failures are fatal to the run.
    async fn access_token(&self) -> Result<BearerToken>;
}

/// Hands out a fixed token; for tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<BearerToken> {
        Ok(BearerToken::new(
            self.token.clone(),
            std::time::Duration::from_secs(exchange::ASSERTION_LIFETIME_SECS),
        ))
    }
}
