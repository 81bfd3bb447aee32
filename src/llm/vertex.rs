//! Vertex AI `generateContent` client.
//!
//! Sends one non-streaming request per call with a fixed timeout. Nothing is
//! retried, and no failure escapes as an error: each one becomes a
//! [`ModelResponse`] variant.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::BearerToken;
use crate::config::VertexConfig;
use crate::error::{InsightError, Result};
use crate::llm::response::{interpret_response, ModelResponse};
use crate::llm::ModelClient;

/// Endpoint coordinates for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexEndpoint {
    /// Scheme and host, without a trailing slash.
    pub api_base: String,
    pub project_id: String,
    pub region: String,
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl VertexEndpoint {
    /// Builds the endpoint from configuration and a resolved project id.
    pub fn from_config(config: &VertexConfig, project_id: impl Into<String>) -> Self {
        Self {
            api_base: config.api_base_url(),
            project_id: project_id.into(),
            region: config.region.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Returns the `generateContent` URL.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.api_base, self.project_id, self.region, self.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn user_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

/// Vertex AI model client.
#[derive(Debug, Clone)]
pub struct VertexClient {
    endpoint: VertexEndpoint,
    client: Client,
}

impl VertexClient {
    /// Creates a client for the given endpoint.
    pub fn new(endpoint: VertexEndpoint) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .map_err(|e| InsightError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &VertexEndpoint {
        &self.endpoint
    }

    /// Classifies a reqwest failure. Timeouts are checked first.
    fn transport_failure(&self, error: reqwest::Error) -> ModelResponse {
        if error.is_timeout() {
            return ModelResponse::Timeout {
                secs: self.endpoint.timeout_secs,
            };
        }
        ModelResponse::Transport(error_chain(&error))
    }
}

/// Joins an error with its sources, e.g. "error sending request: connection refused".
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[async_trait]
impl ModelClient for VertexClient {
    async fn generate(&self, token: &BearerToken, prompt: &str) -> ModelResponse {
        let url = self.endpoint.generate_url();
        debug!("POST {} ({} prompt bytes)", url, prompt.len());

        if token.is_expired() {
            warn!("Bearer token has expired; the request will likely be rejected");
        }

        let result = self
            .client
            .post(&url)
            .bearer_auth(token.secret())
            .json(&GenerateContentRequest::user_prompt(prompt))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => return self.transport_failure(e),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.transport_failure(e),
        };

        debug!("Model endpoint answered {} ({} bytes)", status, body.len());
        interpret_response(status.as_u16(), &body)
    }
}
