//! Service credential documents and bearer tokens.

use crate::error::{InsightError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Default OAuth 2.0 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// A service account credential document.
///
/// Only the fields the assertion exchange needs are read; anything else in
/// the document is ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceCredential {
    /// Identity used as issuer and subject of the assertion.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Key id, sent as the assertion's `kid` header.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// Token endpoint; also the assertion's audience.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Project the service account belongs to.
    #[serde(default)]
    pub project_id: Option<String>,
}

impl ServiceCredential {
    /// Reads and parses a credential document.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InsightError::credential(format!(
                "Failed to read credential file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content).map_err(|e| {
            InsightError::credential(format!("{} ({})", e, path.display()))
        })
    }

    /// Parses a credential document from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let credential: Self = serde_json::from_str(content)
            .map_err(|e| InsightError::credential(format!("Invalid credential document: {e}")))?;

        if credential.client_email.trim().is_empty() {
            return Err(InsightError::credential(
                "Invalid credential document: client_email is empty",
            ));
        }
        if credential.private_key.trim().is_empty() {
            return Err(InsightError::credential(
                "Invalid credential document: private_key is empty",
            ));
        }

        Ok(credential)
    }
}

impl fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredential")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// A short-lived access token.
#[derive(Clone)]
pub struct BearerToken {
    value: String,
    expires_at: SystemTime,
}

impl BearerToken {
    /// Creates a token that expires `lifetime` from now.
    pub fn new(value: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            value: value.into(),
            expires_at: SystemTime::now() + lifetime,
        }
    }

    /// The raw token, for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
