//! Routing client error types.

use crate::planner::OracleError;

/// Errors from the routing HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// HTTP request failed (network error, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the client timeout
    #[error("request timed out")]
    Timeout,

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by routing API")]
    RateLimited,

    /// The provider found no route (`NOT_FOUND`, `ZERO_RESULTS`, ...)
    #[error("no route: {0}")]
    NoRoute(String),

    /// Any other non-OK provider status
    #[error("routing API status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: String,
        message: Option<String>,
    },

    /// Client configuration is unusable
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl From<RoutingError> for OracleError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::Timeout => OracleError::Timeout,
            RoutingError::Http(e) if e.is_timeout() => OracleError::Timeout,
            RoutingError::RateLimited => OracleError::RateLimited,
            RoutingError::NoRoute(_) => OracleError::NotFound,
            other => OracleError::Unavailable(other.to_string()),
        }
    }
}
