//! Kagi Search API client with rate-limit aware retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header::RETRY_AFTER};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::{GatewayError, HttpClient, HttpClientConfig, RetryPolicy, http::read_json};

use super::{SearchProvider, SearchQuery, error_detail};

pub const KAGI_SEARCH_URL: &str = "https://kagi.com/api/v0/search";
pub const KAGI_API_KEY_ENV_VAR: &str = "KAGI_API_KEY";

pub struct KagiSearch {
    api_key: String,
    base_url: String,
    retry_policy: RetryPolicy,
    http: HttpClient,
}

impl KagiSearch {
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_http_config(
            api_key,
            HttpClientConfig::default().with_timeout(Duration::from_secs(60)),
        )
    }

    pub fn with_http_config(
        api_key: impl Into<String>,
        http_config: HttpClientConfig,
    ) -> Result<Self, GatewayError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GatewayError::Configuration(format!(
                "{KAGI_API_KEY_ENV_VAR} is not set."
            )));
        }

        Ok(Self {
            api_key,
            base_url: KAGI_SEARCH_URL.to_string(),
            retry_policy: RetryPolicy::default(),
            http: HttpClient::new(http_config, None)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Shorthand for a default policy with `max_retries` total attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry_policy.max_attempts = max_retries;
        self
    }

    /// Run `query`, retrying only on HTTP 429.
    ///
    /// The query is validated before anything is sent. Non-429 failures are
    /// returned on the first occurrence.
    #[tracing::instrument(
        name = "kagi_search",
        skip(self, query),
        fields(limit = ?query.limit),
        err
    )]
    pub async fn search(&self, query: &SearchQuery) -> Result<Value, GatewayError> {
        let text = query.sanitized()?;

        let mut params = vec![("q", text.to_string())];
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        let headers = vec![("Authorization".to_string(), format!("Bot {}", self.api_key))];

        let attempts = self.retry_policy.attempts();
        for attempt in 0..attempts {
            let res = self
                .http
                .send(
                    self.http
                        .request(Method::GET, &self.base_url, &headers)
                        .query(&params),
                )
                .await?;
            let status = res.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = res
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let message = match &retry_after {
                    Some(value) => format!(
                        "Kagi Search API rate limit exceeded (HTTP 429) (Retry-After: {value}s)"
                    ),
                    None => "Kagi Search API rate limit exceeded (HTTP 429)".to_string(),
                };

                if !self.retry_policy.has_retry_left(attempt) {
                    return Err(GatewayError::RateLimited {
                        message: format!("{message}. Max retries ({attempts}) exceeded."),
                        attempts,
                        retry_after,
                    });
                }

                let wait = self.retry_policy.delay_for(attempt, retry_after.as_deref());
                warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    wait_ms = wait.as_millis() as u64,
                    "{message}, retrying"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if status != StatusCode::OK {
                let error_text = res.text().await.unwrap_or_default();
                let detail = error_detail(&error_text, kagi_error_message);
                return Err(GatewayError::api(
                    status.as_u16(),
                    format!("Kagi Search API error: {} - {detail}", status.as_u16()),
                ));
            }

            debug!(attempt = attempt + 1, "Kagi search succeeded");
            return read_json(res).await;
        }

        // Every loop iteration either returns or retries; the last one cannot retry.
        Err(GatewayError::RateLimited {
            message: "Kagi Search API rate limit exceeded (HTTP 429)".to_string(),
            attempts,
            retry_after: None,
        })
    }
}

/// `{"error": [{"msg": "..."}]}`
fn kagi_error_message(body: &Value) -> Option<String> {
    body.get("error")?
        .get(0)?
        .get("msg")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl SearchProvider for KagiSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Value, GatewayError> {
        KagiSearch::search(self, query).await
    }
}
