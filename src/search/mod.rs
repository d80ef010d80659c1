//! Web search clients and the provider-neutral result they normalize into.

pub mod baidu;
pub mod kagi;
pub mod result;
pub mod web;

pub use baidu::{BaiduAiSearch, BaiduSearchOptions};
pub use kagi::KagiSearch;
pub use result::{Citation, SearchHit, SearchResponse, SearchResult, SearchUsage};
pub use web::{SearchProviderKind, WebSearch};

use async_trait::async_trait;
use serde_json::Value;

use crate::core::GatewayError;

/// Longest accepted query, in characters, after trimming.
pub const MAX_QUERY_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// Maximum number of results, for providers that support it
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Trimmed query text, checked for emptiness and length.
    pub fn sanitized(&self) -> Result<&str, GatewayError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(GatewayError::Validation(
                "Search query cannot be empty or whitespace only".to_string(),
            ));
        }

        let length = text.chars().count();
        if length > MAX_QUERY_LENGTH {
            return Err(GatewayError::Validation(format!(
                "Search query is too long ({length} characters). Maximum allowed length is {MAX_QUERY_LENGTH} characters"
            )));
        }

        if self.limit == Some(0) {
            return Err(GatewayError::Validation(
                "Search limit must be a positive integer".to_string(),
            ));
        }

        Ok(text)
    }
}

impl From<&str> for SearchQuery {
    fn from(text: &str) -> Self {
        SearchQuery::new(text)
    }
}

/// A search backend returning its native JSON envelope.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Value, GatewayError>;
}

/// Provider message extracted from a JSON error body, or the raw body.
pub(crate) fn error_detail(body: &str, extract: impl Fn(&Value) -> Option<String>) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(extract)
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_trims_whitespace() {
        let query = SearchQuery::new("  rust async  ");
        assert_eq!(query.sanitized().unwrap(), "rust async");
    }

    #[test]
    fn empty_or_blank_queries_are_rejected() {
        for text in ["", "   ", "\n\t"] {
            assert!(matches!(
                SearchQuery::new(text).sanitized(),
                Err(GatewayError::Validation(_))
            ));
        }
    }

    #[test]
    fn length_limit_counts_characters_after_trimming() {
        let exact = "a".repeat(MAX_QUERY_LENGTH);
        assert!(SearchQuery::new(format!("  {exact}  ")).sanitized().is_ok());

        let too_long = "a".repeat(MAX_QUERY_LENGTH + 1);
        assert!(matches!(
            SearchQuery::new(too_long).sanitized(),
            Err(GatewayError::Validation(message)) if message.contains("2001 characters")
        ));

        let multibyte = "é".repeat(MAX_QUERY_LENGTH);
        assert!(SearchQuery::new(multibyte).sanitized().is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(SearchQuery::new("q").with_limit(0).sanitized().is_err());
        assert!(SearchQuery::new("q").with_limit(5).sanitized().is_ok());
    }

    #[test]
    fn error_detail_prefers_extracted_message() {
        let detail = error_detail(r#"{"message":"quota"}"#, |v| {
            v["message"].as_str().map(str::to_string)
        });
        assert_eq!(detail, "quota");
        assert_eq!(error_detail("plain text", |_| None), "plain text");
    }
}
