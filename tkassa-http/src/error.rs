//! Error types for the HTTP client.

use http::StatusCode;
use tkassa::{FailureResponse, SignError, ValidationError};

/// Errors that can occur while calling the gateway.
///
/// Transport variants carry the gateway method they happened in as
/// `context` (e.g. `"Init"`).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// The request failed local validation and was not sent.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    /// The request could not be signed.
    #[error(transparent)]
    Sign(#[from] SignError),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Builder(#[source] reqwest::Error),
    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Unexpected HTTP status code.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// Failed to read response body.
    #[error("Failed to read response body: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// JSON deserialization error.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// The gateway answered with `Success: false`.
    #[error("gateway rejected request: {0}")]
    Rejected(FailureResponse),
}

impl ClientError {
    /// Returns the gateway failure if the request was rejected.
    #[must_use]
    pub const fn as_rejection(&self) -> Option<&FailureResponse> {
        match self {
            Self::Rejected(failure) => Some(failure),
            _ => None,
        }
    }
}
