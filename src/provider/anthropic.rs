//! Anthropic Messages API transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{
    CompletionRequest, CompletionTransport, GatewayError, HttpClient, HttpClientConfig, Message,
};

use super::{constants::anthropic, endpoint::join_endpoint};

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicTransport {
    http: HttpClient,
}

impl AnthropicTransport {
    pub fn new(http_config: HttpClientConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            http: HttpClient::new(http_config, None)?,
        })
    }

    /// The fixed public endpoint, or `<base_url>/messages` for a custom base.
    pub fn endpoint(base_url: Option<&str>) -> String {
        match base_url {
            Some(base_url) => join_endpoint(base_url, anthropic::MESSAGES_ENDPOINT),
            None => format!("{}{}", anthropic::API_BASE, anthropic::MESSAGES_ENDPOINT),
        }
    }
}

#[async_trait]
impl CompletionTransport for AnthropicTransport {
    #[tracing::instrument(
        name = "anthropic_complete",
        skip(self, request),
        fields(model = %request.model),
        err
    )]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let api_key = request.api_key().ok_or_else(|| {
            GatewayError::Configuration("Anthropic API key is missing.".to_string())
        })?;

        let url = Self::endpoint(request.base_url());
        let headers = vec![
            ("x-api-key".to_string(), api_key.to_string()),
            (
                "anthropic-version".to_string(),
                anthropic::API_VERSION.to_string(),
            ),
            ("content-type".to_string(), "application/json".to_string()),
        ];

        let body = MessagesRequest {
            model: &request.model,
            system: &request.system_prompt,
            messages: vec![Message::user(request.prompt.clone())],
            max_tokens: request.generation_config.max_tokens,
            temperature: request.generation_config.temperature,
            extra: &request.generation_config.extra,
        };

        let response: MessagesResponse = self
            .http
            .post_json("Anthropic", &url, &headers, &body)
            .await?;

        // Only the first content block is read; it is the text block for plain prompts.
        Ok(response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    fn transport() -> AnthropicTransport {
        AnthropicTransport::new(HttpClientConfig::default().with_timeout(Duration::from_secs(5)))
            .unwrap()
    }

    #[test]
    fn endpoint_defaults_and_custom_base() {
        assert_eq!(
            AnthropicTransport::endpoint(None),
            "https://api.anthropic.com/v1/messages"
        );
        assert_eq!(
            AnthropicTransport::endpoint(Some("https://proxy.local/v1/")),
            "https://proxy.local/v1/messages"
        );
        assert_eq!(
            AnthropicTransport::endpoint(Some("https://proxy.local/v1/messages")),
            "https://proxy.local/v1/messages"
        );
    }

    #[tokio::test]
    async fn sends_messages_payload_with_required_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "model": "claude-3-5-haiku-latest",
                "system": "be terse",
                "messages": [{"role": "user", "content": "hello"}],
                "max_tokens": 256
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "content": [{"type": "text", "text": "hi there"}]
            })))
            .mount(&server)
            .await;

        let request = CompletionRequest::new("claude-3-5-haiku-latest", "hello")
            .with_system_prompt("be terse")
            .with_api_key("sk-ant")
            .with_max_tokens(256)
            .with_base_url(format!("{}/v1", server.uri()));

        assert_eq!(transport().complete(&request).await.unwrap(), "hi there");
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":{"type":"invalid_request_error"}}"#),
            )
            .mount(&server)
            .await;

        let request = CompletionRequest::new("claude", "hello")
            .with_api_key("sk-ant")
            .with_base_url(server.uri());

        match transport().complete(&request).await {
            Err(GatewayError::Api {
                status_code: Some(400),
                message,
                ..
            }) => {
                assert!(message.starts_with("Anthropic API error: 400"));
                assert!(message.contains("invalid_request_error"));
            }
            other => panic!("Expected 400 Api Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_key_fails_before_sending() {
        let request = CompletionRequest::new("claude", "hello").with_base_url("http://127.0.0.1:9");
        assert!(matches!(
            transport().complete(&request).await,
            Err(GatewayError::Configuration(_))
        ));
    }
}
