//! Transport error types

use thiserror::Error;

/// Failure of a single backend call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The wall-clock bound elapsed; the in-flight call was dropped
    #[error("request timed out")]
    Timeout,
    /// Connection refused, reset, DNS failure, body read failure
    #[error("network failure: {0}")]
    NetworkFailure(String),
    /// Backend answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    /// Body did not match the expected schema
    #[error("failed to decode response: {0}")]
    DecodeFailure(String),
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeFailure(message.into())
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::NetworkFailure(_) => "network",
            Self::HttpStatus { .. } => "http_status",
            Self::DecodeFailure(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::network(format!("Connection failed: {e}"))
        } else if e.is_decode() {
            Self::decode(e.to_string())
        } else {
            Self::network(format!("Request failed: {e}"))
        }
    }
}
