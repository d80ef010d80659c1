mod constants;
pub mod anthropic;
pub mod endpoint;
pub mod models;
pub mod openai;

pub use anthropic::AnthropicTransport;
pub use endpoint::normalize;
pub use models::ModelDiscovery;
pub use openai::{ContentExtractor, DirectChatFallback, OpenAiTransport, extract_message_content};

/// Provider family selecting wire protocol and endpoint conventions.
///
/// Parsing is case-insensitive and never fails: unrecognized names are kept
/// verbatim (lower-cased) in [`Binding::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    OpenAI,
    AzureOpenAI,
    Ollama,
    OllamaCloud,
    /// Also spelled `claude`
    Anthropic,
    DeepSeek,
    OpenRouter,
    Gemini,
    Groq,
    Other(String),
}

impl Binding {
    pub fn as_str(&self) -> &str {
        match self {
            Binding::OpenAI => "openai",
            Binding::AzureOpenAI => "azure_openai",
            Binding::Ollama => "ollama",
            Binding::OllamaCloud => "ollama-cloud",
            Binding::Anthropic => "anthropic",
            Binding::DeepSeek => "deepseek",
            Binding::OpenRouter => "openrouter",
            Binding::Gemini => "gemini",
            Binding::Groq => "groq",
            Binding::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Binding::Other(_))
    }

    /// Bindings whose endpoints accept a raw `/chat/completions` call when the
    /// primary transport fails.
    pub fn supports_direct_fallback(&self) -> bool {
        matches!(
            self,
            Binding::OpenAI
                | Binding::Ollama
                | Binding::OllamaCloud
                | Binding::DeepSeek
                | Binding::OpenRouter
                | Binding::Gemini
        )
    }

    /// Hosted providers that always authenticate. Ollama and unrecognized
    /// bindings (self-hosted vLLM, LM Studio, ...) may run without a key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Binding::Ollama | Binding::Other(_))
    }

    /// Conventional environment variable holding this provider's key.
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Binding::OpenAI => Some(constants::openai::API_KEY_ENV_VAR),
            Binding::AzureOpenAI => Some(constants::azure_openai::API_KEY_ENV_VAR),
            Binding::Ollama | Binding::OllamaCloud => Some(constants::ollama::API_KEY_ENV_VAR),
            Binding::Anthropic => Some(constants::anthropic::API_KEY_ENV_VAR),
            Binding::DeepSeek => Some(constants::deepseek::API_KEY_ENV_VAR),
            Binding::OpenRouter => Some(constants::openrouter::API_KEY_ENV_VAR),
            Binding::Gemini => Some(constants::gemini::API_KEY_ENV_VAR),
            Binding::Groq => Some(constants::groq::API_KEY_ENV_VAR),
            Binding::Other(_) => None,
        }
    }

    /// Public API base used when the caller supplies no base URL.
    pub fn default_api_base(&self) -> Option<&'static str> {
        match self {
            Binding::OpenAI => Some(constants::openai::API_BASE),
            Binding::Ollama => Some(constants::ollama::LOCAL_API_BASE),
            Binding::OllamaCloud => Some(constants::ollama::CLOUD_API_BASE),
            Binding::Anthropic => Some(constants::anthropic::API_BASE),
            Binding::DeepSeek => Some(constants::deepseek::API_BASE),
            Binding::OpenRouter => Some(constants::openrouter::API_BASE),
            Binding::Gemini => Some(constants::gemini::API_BASE),
            Binding::Groq => Some(constants::groq::API_BASE),
            Binding::AzureOpenAI | Binding::Other(_) => None,
        }
    }
}

impl From<&str> for Binding {
    fn from(value: &str) -> Self {
        let name = value.trim().to_lowercase();
        match name.as_str() {
            "openai" => Binding::OpenAI,
            "azure_openai" | "azure-openai" | "azure" => Binding::AzureOpenAI,
            "ollama" => Binding::Ollama,
            "ollama-cloud" | "ollama_cloud" => Binding::OllamaCloud,
            "anthropic" | "claude" => Binding::Anthropic,
            "deepseek" => Binding::DeepSeek,
            "openrouter" => Binding::OpenRouter,
            "gemini" => Binding::Gemini,
            "groq" => Binding::Groq,
            _ => Binding::Other(name),
        }
    }
}

impl std::str::FromStr for Binding {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Binding::from(s))
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    OpenAiCompatible,
    Anthropic,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::OpenAiCompatible => write!(f, "OpenAI-compatible"),
            TransportKind::Anthropic => write!(f, "Anthropic"),
        }
    }
}

/// Dispatch table from binding to transport strategy.
///
/// Total over all bindings: anything that is not the Anthropic family is
/// assumed to speak the OpenAI chat-completions wire shape.
pub fn resolve_transport(binding: &Binding) -> TransportKind {
    match binding {
        Binding::Anthropic => TransportKind::Anthropic,
        _ => TransportKind::OpenAiCompatible,
    }
}
