//! Error taxonomy for the feed query flow.

use thiserror::Error;

/// Rejections raised before any I/O. Always the caller's fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid date format. Use YYYY-MM-DD format.")]
    InvalidFormat,

    #[error("Invalid date values.")]
    InvalidDate,

    #[error("Start date must be before or equal to end date.")]
    InvertedRange,
}

/// Failures of the single outbound feed call, set where they happen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// HTTP 429.
    #[error("NASA API rate limit exceeded. Please try again later.")]
    RateLimited,

    /// HTTP 403.
    #[error("Invalid NASA API key or access denied.")]
    Unauthorized,

    #[error("NASA API request timed out.")]
    Timeout,

    /// No response at all (DNS, connect, TLS, reset).
    #[error("Failed to fetch data from NASA API")]
    Unreachable(String),

    /// Any other non-success status.
    #[error("NASA API error: {status} - {status_text}")]
    Status {
        status: u16,
        status_text: String,
    },

    /// Success status, but the body is not a feed payload.
    #[error("NASA API returned malformed data.")]
    Decode(String),
}

/// Cache backend failures. Never surfaced to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Everything a feed query can end with besides a result list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NeoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(UpstreamError),

    /// The provider broke its payload contract. Carries detail for logs.
    #[error("NASA API returned malformed data.")]
    MalformedUpstreamData(String),

    #[error("An unexpected error occurred while fetching data.")]
    Internal(String),
}

impl From<UpstreamError> for NeoError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Decode(detail) => Self::MalformedUpstreamData(detail),
            other => Self::Upstream(other),
        }
    }
}

impl NeoError {
    /// Client errors map to 400, everything else to 500.
    pub fn is_client_error(&self) -> bool {
        matches!(self, NeoError::Validation(_))
    }

    pub fn status_code(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }
}
