//! # llm-gateway
//!
//! One entry point for many LLM and web-search providers.
//!
//! - [`CompletionGateway`] normalizes endpoints, dispatches to the OpenAI-compatible
//!   or Anthropic transport, and retries reasoning-model replies through a raw
//!   chat-completions call when the primary transport comes back empty.
//! - [`ModelDiscovery`] lists models across the listing formats in the wild.
//! - [`KagiSearch`] and [`BaiduAiSearch`] wrap two search APIs; [`WebSearch`]
//!   turns either into a [`SearchResult`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_gateway::{Binding, CompletionGateway, CompletionRequest, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = CompletionGateway::new(GatewayConfig::default())?;
//!     let reply = gateway
//!         .complete(
//!             &Binding::from("ollama"),
//!             CompletionRequest::new("llama3.2", "Why is the sky blue?")
//!                 .with_base_url("localhost:11434"),
//!         )
//!         .await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod gateway;
pub mod provider;
pub mod search;

pub use core::{
    ApiKey, CompletionRequest, CompletionTransport, GatewayConfig, GatewayError, HttpClientConfig,
    RetryPolicy, UnknownBindingPolicy,
};
pub use gateway::CompletionGateway;
pub use provider::{
    Binding, ModelDiscovery, TransportKind, models::list_models, normalize, resolve_transport,
};
pub use search::{
    BaiduAiSearch, BaiduSearchOptions, KagiSearch, SearchProvider, SearchProviderKind, SearchQuery,
    SearchResult, WebSearch,
};
