//! Mock model client for testing.
//!
//! Returns a canned [`ModelResponse`] and records every prompt it receives.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::auth::BearerToken;
use crate::llm::{ModelClient, ModelResponse};

/// Mock model client that returns a fixed response.
#[derive(Debug)]
pub struct MockModelClient {
    response: ModelResponse,
    prompts: Mutex<Vec<String>>,
    tokens: Mutex<Vec<String>>,
}

impl MockModelClient {
    /// Creates a mock that answers every prompt with `answer`.
    pub fn new(answer: impl Into<String>) -> Self {
        Self::with_response(ModelResponse::Success(answer.into()))
    }

    /// Creates a mock that returns the given outcome.
    pub fn with_response(response: ModelResponse) -> Self {
        Self {
            response,
            prompts: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Bearer tokens received so far.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate(&self, token: &BearerToken, prompt: &str) -> ModelResponse {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.push(token.secret().to_string());
        }
        self.response.clone()
    }
}
