//! Baidu AI Search (Qianfan): a chat-completion shaped search-and-answer API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::core::{GatewayError, HttpClient, HttpClientConfig, Message, http::read_json};

use super::{SearchProvider, SearchQuery, error_detail};

pub const BAIDU_SEARCH_URL: &str = "https://qianfan.baidubce.com/v2/ai_search/chat/completions";
pub const BAIDU_API_KEY_ENV_VAR: &str = "BAIDU_API_KEY";
pub const DEFAULT_MODEL: &str = "ernie-4.5-turbo-32k";

/// Request flags sent alongside every query.
#[derive(Debug, Clone, PartialEq)]
pub struct BaiduSearchOptions {
    pub model: String,
    /// `baidu_search_v1` or `baidu_search_v2`
    pub search_source: String,
    pub stream: bool,
    pub enable_deep_search: bool,
    pub enable_corner_markers: bool,
    pub enable_followup_queries: bool,
    pub temperature: f32,
    pub top_p: f32,
    /// `auto`, `required` or `disabled`
    pub search_mode: String,
    /// `week`, `month`, `semiyear` or `year`
    pub search_recency_filter: Option<String>,
    pub instruction: Option<String>,
}

impl Default for BaiduSearchOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            search_source: "baidu_search_v2".to_string(),
            stream: false,
            enable_deep_search: false,
            enable_corner_markers: true,
            enable_followup_queries: false,
            temperature: 0.11,
            top_p: 0.55,
            search_mode: "auto".to_string(),
            search_recency_filter: None,
            instruction: None,
        }
    }
}

impl BaiduSearchOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_deep_search(mut self, enabled: bool) -> Self {
        self.enable_deep_search = enabled;
        self
    }

    pub fn with_recency_filter(mut self, filter: impl Into<String>) -> Self {
        self.search_recency_filter = Some(filter.into());
        self
    }

    pub fn with_followup_queries(mut self, enabled: bool) -> Self {
        self.enable_followup_queries = enabled;
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    messages: Vec<Message>,
    model: &'a str,
    search_source: &'a str,
    stream: bool,
    enable_deep_search: bool,
    enable_corner_markers: bool,
    enable_followup_queries: bool,
    temperature: f32,
    top_p: f32,
    search_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_recency_filter: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instruction: Option<&'a str>,
}

pub struct BaiduAiSearch {
    api_key: String,
    base_url: String,
    options: BaiduSearchOptions,
    http: HttpClient,
}

impl BaiduAiSearch {
    /// Accepts either a bare key or a full `Bearer ...` value.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_http_config(
            api_key,
            HttpClientConfig::default().with_timeout(Duration::from_secs(120)),
        )
    }

    pub fn with_http_config(
        api_key: impl Into<String>,
        http_config: HttpClientConfig,
    ) -> Result<Self, GatewayError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GatewayError::Configuration(format!(
                "{BAIDU_API_KEY_ENV_VAR} is not set."
            )));
        }

        Ok(Self {
            api_key,
            base_url: BAIDU_SEARCH_URL.to_string(),
            options: BaiduSearchOptions::default(),
            http: HttpClient::new(http_config, None)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_options(mut self, options: BaiduSearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BaiduSearchOptions {
        &self.options
    }

    fn authorization(&self) -> String {
        if self.api_key.starts_with("Bearer ") {
            self.api_key.clone()
        } else {
            format!("Bearer {}", self.api_key)
        }
    }

    /// Run `query` with explicit options. The text is trimmed and validated
    /// like any [`SearchQuery`] before the request is sent.
    #[tracing::instrument(name = "baidu_search", skip(self, query, options), err)]
    pub async fn search_with(
        &self,
        query: &str,
        options: &BaiduSearchOptions,
    ) -> Result<Value, GatewayError> {
        let query = SearchQuery::new(query);
        let text = query.sanitized()?;

        let body = SearchRequest {
            messages: vec![Message::user(text)],
            model: &options.model,
            search_source: &options.search_source,
            stream: options.stream,
            enable_deep_search: options.enable_deep_search,
            enable_corner_markers: options.enable_corner_markers,
            enable_followup_queries: options.enable_followup_queries,
            temperature: options.temperature,
            top_p: options.top_p,
            search_mode: &options.search_mode,
            search_recency_filter: options.search_recency_filter.as_deref(),
            instruction: options
                .instruction
                .as_deref()
                .filter(|instruction| !instruction.is_empty()),
        };

        let headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), self.authorization()),
        ];
        let res = self
            .http
            .send(
                self.http
                    .request(Method::POST, &self.base_url, &headers)
                    .json(&body),
            )
            .await?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await.unwrap_or_default();
            warn!(status = %status, "Baidu AI Search returned error status");
            let detail = error_detail(&error_text, |body| {
                body.get("message").and_then(Value::as_str).map(str::to_string)
            });
            return Err(GatewayError::api(
                status.as_u16(),
                format!("Baidu AI Search API error: {} - {detail}", status.as_u16()),
            ));
        }

        read_json(res).await
    }
}

#[async_trait]
impl SearchProvider for BaiduAiSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Value, GatewayError> {
        self.search_with(query.sanitized()?, &self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method},
    };

    fn client(server: &MockServer, api_key: &str) -> BaiduAiSearch {
        BaiduAiSearch::with_http_config(
            api_key,
            HttpClientConfig::default().with_timeout(Duration::from_secs(5)),
        )
        .unwrap()
        .with_base_url(server.uri())
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        assert!(matches!(
            BaiduAiSearch::new("  "),
            Err(GatewayError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn posts_default_flags_with_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer bce-v3/abc"))
            .and(body_json(json!({
                "messages": [{"role": "user", "content": "rust 2024 edition"}],
                "model": "ernie-4.5-turbo-32k",
                "search_source": "baidu_search_v2",
                "stream": false,
                "enable_deep_search": false,
                "enable_corner_markers": true,
                "enable_followup_queries": false,
                "temperature": 0.11,
                "top_p": 0.55,
                "search_mode": "auto"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": "r1"})))
            .mount(&server)
            .await;

        let response = client(&server, "bce-v3/abc")
            .search(&SearchQuery::new("rust 2024 edition"))
            .await
            .unwrap();
        assert_eq!(response["request_id"], "r1");
    }

    #[tokio::test]
    async fn existing_bearer_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let options = BaiduSearchOptions::default()
            .with_recency_filter("week")
            .with_deep_search(true);
        let result = client(&server, "Bearer token")
            .search_with("q", &options)
            .await;
        assert!(result.is_ok());

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["search_recency_filter"], "week");
        assert_eq!(body["enable_deep_search"], true);
        assert!(body.get("instruction").is_none());
    }

    #[tokio::test]
    async fn error_message_is_taken_from_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"code": "AccessDenied", "message": "no quota"})),
            )
            .mount(&server)
            .await;

        let err = client(&server, "k")
            .search(&SearchQuery::new("q"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.to_string(), "API error: Baidu AI Search API error: 403 - no quota");
    }
}
