use async_trait::async_trait;

use super::{error::GatewayError, types::CompletionRequest};

/// A wire-level strategy for reaching one family of providers.
///
/// Implementations return the assistant's reply text. An empty string is a valid
/// return value; the gateway treats it as an unusable response.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;
}
