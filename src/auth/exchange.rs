//! Signed-assertion (JWT bearer) token exchange.
//!
//! Builds a one-hour RS256 assertion from a service credential and trades
//! it for an access token at the credential's token endpoint. There is no
//! retry; any failure here is fatal to the run.

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::auth::credential::{BearerToken, ServiceCredential};
use crate::auth::TokenProvider;
use crate::error::{InsightError, Result};

/// Scope requested for the access token.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// OAuth 2.0 grant type for assertion exchange.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of the signed assertion, and of the token when the server
/// does not say otherwise.
pub const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Claim set of the signed assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
    pub scope: String,
}

impl AssertionClaims {
    /// Claims for `credential`, issued at `issued_at` (seconds since epoch).
    pub fn new(credential: &ServiceCredential, issued_at: u64) -> Self {
        Self {
            iss: credential.client_email.clone(),
            sub: credential.client_email.clone(),
            aud: credential.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
        }
    }
}

/// Signs the assertion with the credential's private key (RS256).
pub fn sign_assertion(credential: &ServiceCredential, issued_at: u64) -> Result<String> {
    let claims = AssertionClaims::new(credential, issued_at);

    let mut header = Header::new(Algorithm::RS256);
    header.kid = credential.private_key_id.clone();

    let key = EncodingKey::from_rsa_pem(credential.private_key.as_bytes())
        .map_err(|e| InsightError::credential(format!("Invalid private key: {e}")))?;

    encode(&header, &claims, &key)
        .map_err(|e| InsightError::credential(format!("Failed to sign assertion: {e}")))
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| InsightError::internal(format!("System clock is before 1970: {e}")))
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    assertion: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges a service credential for bearer tokens.
#[derive(Debug, Clone)]
pub struct ServiceAccountTokenProvider {
    credential: ServiceCredential,
    client: Client,
}

impl ServiceAccountTokenProvider {
    /// Creates a provider for the given credential.
    pub fn new(credential: ServiceCredential) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| InsightError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { credential, client })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<BearerToken> {
        let assertion = sign_assertion(&self.credential, unix_now()?)?;
        let token_uri = &self.credential.token_uri;

        debug!("Exchanging assertion at {token_uri}");
        let response = self
            .client
            .post(token_uri)
            .form(&TokenRequest {
                grant_type: JWT_BEARER_GRANT,
                assertion: &assertion,
            })
            .send()
            .await
            .map_err(|e| InsightError::credential(format!("Token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InsightError::credential(format!("Failed to read token response: {e}")))?;

        if !status.is_success() {
            return Err(InsightError::credential(format!(
                "Token exchange failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            InsightError::credential(format!("Unexpected token response: {e}"))
        })?;

        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        info!(
            "Obtained access token for {} (valid {}s)",
            self.credential.client_email, lifetime
        );

        Ok(BearerToken::new(
            token.access_token,
            Duration::from_secs(lifetime),
        ))
    }
}
