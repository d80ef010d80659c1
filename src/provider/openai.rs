//! OpenAI-compatible chat completions: the typed primary transport and the raw
//! fallback used when the typed decoding finds no content.
//!
//! # API Compatibility
//!
//! The primary transport only decodes `choices[0].message.content`. Reasoning
//! models (DeepSeek R1, Kimi, some Ollama builds) may leave that field empty and
//! put their answer under a provider-specific key instead; the fallback reads
//! the raw JSON and hands the message object to a [`ContentExtractor`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::{
    CompletionRequest, CompletionTransport, GatewayError, HttpClient, HttpClientConfig, Message,
    http::read_json,
};

use super::{constants::openai, endpoint::join_endpoint};

/// Pulls the reply text out of a `choices[i].message` object.
pub type ContentExtractor = fn(&Value) -> Option<String>;

/// Message fields that may carry the reply, in priority order.
const CONTENT_FIELDS: [&str; 4] = ["content", "reasoning_content", "reasoning", "thought"];

/// Default [`ContentExtractor`]: `content`, then the reasoning fields some
/// providers use instead. The first non-empty string wins.
pub fn extract_message_content(message: &Value) -> Option<String> {
    CONTENT_FIELDS.iter().find_map(|field| {
        message
            .get(field)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

fn bearer_headers(api_key: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    if let Some(key) = api_key {
        headers.push(("Authorization".to_string(), format!("Bearer {key}")));
    }
    headers
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Typed chat-completions client; the primary transport for every
/// OpenAI-compatible binding.
pub struct OpenAiTransport {
    http: HttpClient,
}

impl OpenAiTransport {
    pub fn new(http_config: HttpClientConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            http: HttpClient::new(http_config, None)?,
        })
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    #[tracing::instrument(
        name = "openai_complete",
        skip(self, request),
        fields(model = %request.model),
        err
    )]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let base_url = request.base_url().unwrap_or(openai::API_BASE);
        let url = join_endpoint(base_url, openai::CHAT_COMPLETIONS_ENDPOINT);

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: request.messages(),
            temperature: request.generation_config.temperature,
            max_tokens: request.generation_config.max_tokens,
            extra: &request.generation_config.extra,
        };

        let response: ChatCompletionResponse = self
            .http
            .post_json("OpenAI", &url, &bearer_headers(request.api_key()), &body)
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

/// Raw `POST <base_url>/chat/completions` that tolerates non-standard reply fields.
pub struct DirectChatFallback {
    http: HttpClient,
    extractor: ContentExtractor,
}

impl DirectChatFallback {
    pub fn new(http_config: HttpClientConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            http: HttpClient::new(http_config, None)?,
            extractor: extract_message_content,
        })
    }

    pub fn with_extractor(mut self, extractor: ContentExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Returns `Ok(None)` when the call succeeded but no content could be found.
    #[tracing::instrument(
        name = "direct_chat_fallback",
        skip(self, request),
        fields(base_url = %base_url, model = %request.model),
        err
    )]
    pub async fn complete(
        &self,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<Option<String>, GatewayError> {
        let url = join_endpoint(base_url, openai::CHAT_COMPLETIONS_ENDPOINT);
        debug!(url = %url, "issuing direct chat completion");

        let body = serde_json::json!({
            "model": request.model,
            "messages": request.messages(),
            "temperature": request.generation_config.temperature,
            "max_tokens": request.generation_config.max_tokens,
        });

        let headers = bearer_headers(request.api_key());
        let res = self
            .http
            .send(
                self.http
                    .request(reqwest::Method::POST, &url, &headers)
                    .json(&body),
            )
            .await?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, body = %error_text, "direct chat completion failed");
            return Err(GatewayError::api(
                status.as_u16(),
                format!("Fallback API error: {} - {error_text}", status.as_u16()),
            ));
        }

        let value: Value = read_json(res).await?;
        Ok(value
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(self.extractor))
    }
}
