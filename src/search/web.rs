//! Provider-selecting web search facade.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::GatewayError;

use super::{
    BaiduAiSearch, BaiduSearchOptions, KagiSearch, SearchQuery, SearchResult,
    baidu::BAIDU_API_KEY_ENV_VAR, kagi::KAGI_API_KEY_ENV_VAR,
};

pub const SEARCH_PROVIDER_ENV_VAR: &str = "SEARCH_PROVIDER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    Baidu,
    #[default]
    Kagi,
}

impl SearchProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchProviderKind::Baidu => "baidu",
            SearchProviderKind::Kagi => "kagi",
        }
    }

    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            SearchProviderKind::Baidu => BAIDU_API_KEY_ENV_VAR,
            SearchProviderKind::Kagi => KAGI_API_KEY_ENV_VAR,
        }
    }
}

impl std::fmt::Display for SearchProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SearchProviderKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baidu" => Ok(SearchProviderKind::Baidu),
            "kagi" => Ok(SearchProviderKind::Kagi),
            other => Err(GatewayError::Configuration(format!(
                "Unsupported search provider: {other}. Use 'baidu' or 'kagi'."
            ))),
        }
    }
}

enum Backend {
    Baidu(BaiduAiSearch),
    Kagi(KagiSearch),
}

/// Runs a query against the configured provider and returns a [`SearchResult`].
pub struct WebSearch {
    backend: Backend,
}

impl WebSearch {
    pub fn baidu(client: BaiduAiSearch) -> Self {
        Self {
            backend: Backend::Baidu(client),
        }
    }

    pub fn kagi(client: KagiSearch) -> Self {
        Self {
            backend: Backend::Kagi(client),
        }
    }

    /// Build a client with default settings for `provider`.
    pub fn new(provider: SearchProviderKind, api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Ok(match provider {
            SearchProviderKind::Baidu => Self::baidu(BaiduAiSearch::new(api_key)?),
            SearchProviderKind::Kagi => Self::kagi(KagiSearch::new(api_key)?),
        })
    }

    /// Provider from `SEARCH_PROVIDER` (default `kagi`) and its key from the
    /// provider's own variable.
    pub fn from_env() -> Result<Self, GatewayError> {
        let provider = match std::env::var(SEARCH_PROVIDER_ENV_VAR) {
            Ok(name) if !name.trim().is_empty() => name.parse()?,
            _ => SearchProviderKind::default(),
        };
        let env_var = provider.api_key_env_var();
        let api_key = std::env::var(env_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GatewayError::Configuration(format!("{env_var} environment variable is not set"))
            })?;
        Self::new(provider, api_key)
    }

    pub fn provider(&self) -> SearchProviderKind {
        match self.backend {
            Backend::Baidu(_) => SearchProviderKind::Baidu,
            Backend::Kagi(_) => SearchProviderKind::Kagi,
        }
    }

    #[tracing::instrument(name = "web_search", skip(self, query), fields(provider = %self.provider()), err)]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult, GatewayError> {
        let text = query.sanitized()?;

        let result = match &self.backend {
            Backend::Baidu(client) => {
                let options: &BaiduSearchOptions = client.options();
                let response = client.search_with(text, options).await?;
                SearchResult::from_baidu(text, &options.model, &response)
            }
            Backend::Kagi(client) => {
                let response = client.search(query).await?;
                SearchResult::from_kagi(text, &response)
            }
        };

        debug!(
            citations = result.citations.len(),
            results = result.search_results.len(),
            "search completed"
        );
        Ok(result)
    }

    /// Search, then write the result as pretty JSON into `output_dir`.
    pub async fn search_and_save(
        &self,
        query: &SearchQuery,
        output_dir: impl AsRef<Path>,
    ) -> Result<SearchResult, GatewayError> {
        let mut result = self.search(query).await?;
        save_result(&mut result, output_dir.as_ref()).await?;
        Ok(result)
    }
}

/// Write `result` to `<dir>/search_<provider>_<YYYYmmdd_HHMMSS>.json` and record
/// the path under the `result_file` extra.
pub async fn save_result(result: &mut SearchResult, output_dir: &Path) -> Result<PathBuf, GatewayError> {
    let io_error = |action: &str, e: std::io::Error| {
        GatewayError::io(format!("Failed to {action} {}", output_dir.display()), e)
    };

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| io_error("create", e))?;

    let file_name = format!(
        "search_{}_{}.json",
        result.provider,
        result.timestamp.format("%Y%m%d_%H%M%S")
    );
    let path = output_dir.join(file_name);

    let json = serde_json::to_string_pretty(result)
        .map_err(|e| GatewayError::parse("Failed to serialize search result", e))?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| io_error("write into", e))?;

    info!(path = %path.display(), "search result saved");
    result.extras.insert(
        "result_file".to_string(),
        Value::String(path.display().to_string()),
    );
    Ok(path)
}
