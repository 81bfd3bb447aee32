//! Model invocation for table-insight.
//!
//! Provides the trait the pipeline calls, the Vertex AI implementation,
//! prompt construction and response validation.

pub mod mock;
pub mod prompt;
pub mod response;
pub mod vertex;

pub use mock::MockModelClient;
pub use prompt::build_prompt;
pub use response::{interpret_response, ModelResponse, ShapeStage};
pub use vertex::{VertexClient, VertexEndpoint};

use async_trait::async_trait;

use crate::auth::BearerToken;

/// Trait for clients that send a prompt to a hosted model.
///
/// Failures are part of the returned [`ModelResponse`], never an `Err`:
/// the pipeline writes them out as the run's result.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends `prompt` authorized by `token` and returns the outcome.
    async fn generate(&self, token: &BearerToken, prompt: &str) -> ModelResponse;
}
