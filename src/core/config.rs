use crate::core::{error::GatewayError, http::HttpClientConfig};
use crate::provider::Binding;

/// What to do with a binding the dispatch table does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownBindingPolicy {
    /// Treat it as OpenAI-compatible and log a warning
    #[default]
    AssumeOpenAiCompatible,
    /// Fail with a configuration error before any network call
    Reject,
}

/// Gateway-wide settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub http_config: HttpClientConfig,
    pub unknown_bindings: UnknownBindingPolicy,
    /// Allow the direct `/chat/completions` retry after a failed primary attempt (default: true)
    pub fallback_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_config: HttpClientConfig::default(),
            unknown_bindings: UnknownBindingPolicy::default(),
            fallback_enabled: true,
        }
    }
}

impl GatewayConfig {
    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn with_unknown_bindings(mut self, policy: UnknownBindingPolicy) -> Self {
        self.unknown_bindings = policy;
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }
}

/// Where an API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKey {
    /// Read the binding's conventional environment variable
    Default,
    Custom(String),
}

impl ApiKey {
    pub fn resolve(&self, binding: &Binding) -> Result<String, GatewayError> {
        match self {
            ApiKey::Custom(key) => Ok(key.clone()),
            ApiKey::Default => {
                let env_var = binding.api_key_env_var().ok_or_else(|| {
                    GatewayError::Configuration(format!(
                        "No default API key variable for binding '{binding}'"
                    ))
                })?;
                std::env::var(env_var)
                    .ok()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| GatewayError::Configuration(format!("{env_var} not set.")))
            }
        }
    }
}
