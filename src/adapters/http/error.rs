//! Request Error Types
//!
//! Failure classes for calls to the chain RPC and the market-data providers.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Network/connection error
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Non-success HTTP status other than 429
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON-RPC `error` field in an otherwise successful response
    #[error("RPC error: {message} (code: {code})")]
    Rpc { code: i64, message: String },

    /// Body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    /// Retries exhausted
    #[error("Source unavailable after {attempts} attempts: {last_error}")]
    SourceUnavailable { attempts: u32, last_error: String },
}

impl RequestError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            RequestError::Timeout
            | RequestError::Network(_)
            | RequestError::RateLimited
            | RequestError::Rpc { .. } => true,
            RequestError::Http { status } => *status >= 500 || *status == 408,
            RequestError::InvalidResponse(_)
            | RequestError::ClientSetup(_)
            | RequestError::SourceUnavailable { .. } => false,
        }
    }

    pub fn from_status(status: u16) -> Self {
        if status == 429 {
            RequestError::RateLimited
        } else {
            RequestError::Http { status }
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Timeout
        } else if err.is_decode() {
            RequestError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            RequestError::from_status(status.as_u16())
        } else {
            RequestError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::InvalidResponse(err.to_string())
    }
}
