//! Shared HTTP client used by every transport and search client.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::error::GatewayError;

/// Configuration for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Total time allowed for a single request
    pub timeout: Duration,
    pub connect_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: None,
        }
    }
}

impl HttpClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

/// Thin wrapper over `reqwest::Client` that maps failures onto [`GatewayError`].
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig, user_agent: Option<&str>) -> Result<Self, GatewayError> {
        let default_ua = format!("llm-gateway/{}", env!("CARGO_PKG_VERSION"));
        let ua = user_agent.unwrap_or(&default_ua);

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(ua);
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let client = builder.build().map_err(|e| {
            GatewayError::Configuration(format!("Failed to build reqwest client: {e}"))
        })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub(crate) fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
    ) -> RequestBuilder {
        let mut req_builder = self.client.request(method, url);
        for (name, value) in headers {
            req_builder = req_builder.header(name, value);
        }
        req_builder
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        request
            .send()
            .await
            .map_err(|e| GatewayError::network("Request failed", e))
    }

    /// POST a JSON body and decode a JSON response.
    ///
    /// Any non-2xx status fails immediately with [`GatewayError::Api`], carrying the
    /// status and the response body. `label` names the upstream in error messages.
    #[tracing::instrument(
        name = "http_post_json",
        skip(self, headers, body),
        fields(url = %url),
        err
    )]
    pub async fn post_json<Req, Res>(
        &self,
        label: &str,
        url: &str,
        headers: &[(String, String)],
        body: &Req,
    ) -> Result<Res, GatewayError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let res = self
            .send(self.request(Method::POST, url, headers).json(body))
            .await?;
        let status = res.status();

        if !status.is_success() {
            let error_text = res
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, "API returned error status");
            return Err(GatewayError::api(
                status.as_u16(),
                format!("{label} API error: {} - {error_text}", status.as_u16()),
            ));
        }

        debug!(status = %status, "HTTP request successful");
        read_json(res).await
    }
}

/// Read a response body as text, then decode it as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, GatewayError> {
    let response_text = res
        .text()
        .await
        .map_err(|e| GatewayError::parse("Failed to read response body", e))?;

    serde_json::from_str(&response_text)
        .map_err(|e| GatewayError::parse("Failed to parse response as JSON", e))
}
