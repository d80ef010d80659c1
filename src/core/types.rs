use serde::Serialize;
use serde_json::{Map, Value};

use super::error::GatewayError;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: ChatRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A single-turn completion call: one system prompt, one user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub system_prompt: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub generation_config: GenerationConfig,
}

/// Sampling parameters plus any provider-specific options.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Merged verbatim into the primary transport payload
    pub extra: Map<String, Value>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            extra: Map::new(),
        }
    }
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            api_key: None,
            base_url: None,
            generation_config: GenerationConfig::default(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.generation_config.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.generation_config.max_tokens = max_tokens;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.generation_config.extra.insert(key.into(), value);
        self
    }

    /// Non-empty API key, if one was supplied.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Non-empty base URL, if one was supplied.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|url| !url.is_empty())
    }

    /// The system + user pair sent to chat-style endpoints.
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(self.system_prompt.clone()),
            Message::user(self.prompt.clone()),
        ]
    }

    pub(crate) fn validate(&self) -> Result<(), GatewayError> {
        if self.model.trim().is_empty() {
            return Err(GatewayError::Validation(
                "Missing model. Make sure to specify a model.".to_string(),
            ));
        }
        if self.prompt.is_empty() {
            return Err(GatewayError::Validation(
                "Missing prompt. Make sure to add a prompt.".to_string(),
            ));
        }
        Ok(())
    }
}
