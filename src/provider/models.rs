//! Model discovery across providers with incompatible listing endpoints.
//!
//! Probes run in a fixed order and every failure is swallowed: callers get a
//! possibly empty list, never an error.

use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::{GatewayError, HttpClient, HttpClientConfig, http::read_json};

use super::{
    Binding,
    constants::{anthropic, ollama, openai},
    endpoint::{is_local_inference_server, is_ollama_cloud, join_endpoint, server_root},
};

pub struct ModelDiscovery {
    http: HttpClient,
}

impl ModelDiscovery {
    pub fn new(http_config: HttpClientConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            http: HttpClient::new(http_config, None)?,
        })
    }

    /// List the model identifiers `binding` exposes at `base_url`.
    ///
    /// 1. local inference servers are asked via `<root>/api/tags` first
    /// 2. `<base_url>/models` in any of the common envelopes
    /// 3. `ollama.com` falls back to `/api/tags` when step 2 found nothing
    #[tracing::instrument(name = "list_models", skip(self, api_key), fields(binding = %binding))]
    pub async fn list_models(
        &self,
        binding: &Binding,
        base_url: &str,
        api_key: Option<&str>,
    ) -> Vec<String> {
        let base_url = match base_url.trim_end_matches('/') {
            "" => match binding.default_api_base() {
                Some(default) => default,
                None => {
                    warn!("no base URL to list models from");
                    return Vec::new();
                }
            },
            url => url,
        };
        let headers = auth_headers(binding, api_key);

        let looks_local = (*binding == Binding::Ollama && !is_ollama_cloud(base_url))
            || is_local_inference_server(base_url);
        if looks_local && let Some(models) = self.probe_tags(base_url, &headers).await {
            return models;
        }

        let listed = self.probe_models(base_url, &headers).await;
        if is_ollama_cloud(base_url) && listed.as_ref().is_none_or(Vec::is_empty) {
            debug!("falling back to /api/tags on the cloud host");
            if let Some(models) = self.probe_tags(base_url, &headers).await {
                return models;
            }
        }

        listed.unwrap_or_default()
    }

    async fn probe_tags(&self, base_url: &str, headers: &[(String, String)]) -> Option<Vec<String>> {
        let url = format!("{}{}", server_root(base_url), ollama::TAGS_ENDPOINT);
        let body = self.get_json(&url, headers).await?;
        let models = body.get("models")?.as_array()?;
        Some(
            models
                .iter()
                .filter_map(|model| model.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect(),
        )
    }

    async fn probe_models(
        &self,
        base_url: &str,
        headers: &[(String, String)],
    ) -> Option<Vec<String>> {
        let url = join_endpoint(base_url, openai::MODELS_ENDPOINT);
        let body = self.get_json(&url, headers).await?;
        let models = parse_model_listing(&body);
        if models.is_none() {
            debug!(url = %url, "unrecognized model listing envelope");
        }
        models
    }

    /// GET `url` and decode its JSON body; `None` on any failure or non-200 status.
    async fn get_json(&self, url: &str, headers: &[(String, String)]) -> Option<Value> {
        let res = match self.http.send(self.http.request(Method::GET, url, headers)).await {
            Ok(res) => res,
            Err(e) => {
                warn!(url = %url, error = %e, "model listing probe failed");
                return None;
            }
        };

        if res.status() != StatusCode::OK {
            debug!(url = %url, status = %res.status(), "model listing probe rejected");
            return None;
        }

        match read_json::<Value>(res).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(url = %url, error = %e, "model listing probe returned invalid JSON");
                None
            }
        }
    }
}

/// Convenience wrapper building a [`ModelDiscovery`] with default HTTP settings.
pub async fn list_models(binding: &Binding, base_url: &str, api_key: Option<&str>) -> Vec<String> {
    match ModelDiscovery::new(HttpClientConfig::default()) {
        Ok(discovery) => discovery.list_models(binding, base_url, api_key).await,
        Err(e) => {
            warn!(error = %e, "could not build model discovery client");
            Vec::new()
        }
    }
}

fn auth_headers(binding: &Binding, api_key: Option<&str>) -> Vec<(String, String)> {
    let Some(api_key) = api_key.filter(|key| !key.is_empty()) else {
        return Vec::new();
    };

    if *binding == Binding::Anthropic {
        vec![
            ("x-api-key".to_string(), api_key.to_string()),
            (
                "anthropic-version".to_string(),
                anthropic::API_VERSION.to_string(),
            ),
        ]
    } else {
        vec![("Authorization".to_string(), format!("Bearer {api_key}"))]
    }
}

/// Extract identifiers from `{"data": [...]}`, `{"models": [...]}` or a bare list.
///
/// `None` means the envelope was not recognized.
fn parse_model_listing(body: &Value) -> Option<Vec<String>> {
    let entries = match body {
        Value::Array(entries) => entries,
        Value::Object(map) => match (map.get("data"), map.get("models")) {
            (Some(Value::Array(entries)), _) => entries,
            (_, Some(Value::Array(entries))) => entries,
            _ => return None,
        },
        _ => return None,
    };

    Some(entries.iter().filter_map(model_identifier).collect())
}

fn model_identifier(entry: &Value) -> Option<String> {
    match entry {
        Value::Object(map) => ["id", "name"].iter().find_map(|key| {
            map.get(*key)
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        }),
        Value::String(id) => Some(id.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
