//! Response envelope and failure type.
//!
//! Every gateway response carries the same envelope:
//!
//! ```json
//! {
//!   "Success": false,
//!   "ErrorCode": "9999",
//!   "Message": "Неверные параметры.",
//!   "Details": "Поле OrderId не должно быть пустым."
//! }
//! ```
//!
//! When `Success` is `true` the same object also carries the operation's
//! own fields and is decoded as the operation's response type.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::string_or_number;

/// A response with `Success: false`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FailureResponse {
    /// Gateway error code.
    #[serde(default, deserialize_with = "string_or_number")]
    pub error_code: String,

    /// Short human-readable description.
    pub message: Option<String>,

    /// Detailed description.
    pub details: Option<String>,
}

impl FailureResponse {
    /// Creates a failure with the given code.
    #[must_use]
    pub fn new(error_code: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: None,
            details: None,
        }
    }

    /// Sets the short description.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the detailed description.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for FailureResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gateway error {}", self.error_code)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureResponse {}

/// Common part of every response, decoded first to pick the variant.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    success: bool,
    #[serde(default, deserialize_with = "string_or_number")]
    error_code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl From<Envelope> for FailureResponse {
    fn from(envelope: Envelope) -> Self {
        Self {
            error_code: envelope.error_code,
            message: envelope.message,
            details: envelope.details,
        }
    }
}

/// A decoded gateway response: the operation's body or a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayResponse<T> {
    /// `Success: true`; the operation's response body.
    Success(T),
    /// `Success: false`.
    Failure(FailureResponse),
}

impl<T: DeserializeOwned> GatewayResponse<T> {
    /// Decodes a response body.
    ///
    /// The envelope is read first; `T` is only decoded when `Success` is
    /// `true`, so a failure never trips over missing operation fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid envelope, or if a
    /// successful response does not match `T`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_slice(bytes)?;
        if !envelope.success {
            return Ok(Self::Failure(envelope.into()));
        }
        serde_json::from_slice(bytes).map(Self::Success)
    }
}

impl<T> GatewayResponse<T> {
    /// Returns `true` for [`GatewayResponse::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`FailureResponse`] for a failed call.
    pub fn into_result(self) -> Result<T, FailureResponse> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Failure(failure) => Err(failure),
        }
    }
}
