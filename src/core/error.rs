use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing credential, rejected binding or an HTTP client that could not be built.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed request or search query. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxedSource>,
    },

    /// HTTP 429 persisted through the whole retry budget.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        attempts: u32,
        retry_after: Option<String>,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxedSource,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: BoxedSource,
    },

    /// Local filesystem failure, e.g. while saving a search result.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The primary transport answered but carried no usable content.
    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl GatewayError {
    pub(crate) fn api(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Api {
            message: message.into(),
            status_code: Some(status),
            source: None,
        }
    }

    pub(crate) fn network(message: impl Into<String>, source: reqwest::Error) -> Self {
        GatewayError::Network {
            message: message.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn parse(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GatewayError::Parse {
            message: message.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        GatewayError::Io {
            message: message.into(),
            source,
        }
    }

    /// Upstream HTTP status, when the error came from a provider response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status_code, .. } => *status_code,
            GatewayError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::RateLimited { .. })
    }
}
