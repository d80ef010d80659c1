pub mod config;
pub mod error;
pub mod http;
pub mod retry;
pub mod traits;
pub mod types;

pub use config::{ApiKey, GatewayConfig, UnknownBindingPolicy};
pub use error::GatewayError;
pub use http::{HttpClient, HttpClientConfig};
pub use retry::RetryPolicy;
pub use traits::CompletionTransport;
pub use types::{ChatRole, CompletionRequest, GenerationConfig, Message};
