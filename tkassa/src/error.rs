//! Error types for building and signing gateway requests.

use std::fmt;

/// A request field failed local validation before being sent.
///
/// Validation covers only what the gateway's schema declares: length limits,
/// required fields and value formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Wire name of the offending field (e.g. `"OrderId"`).
    pub field: &'static str,
    /// Human-readable reason.
    pub reason: String,
    /// Position of the offending element when the field is a list.
    pub index: Option<usize>,
}

impl ValidationError {
    /// Creates a new validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
            index: None,
        }
    }

    /// Creates an error for a value longer than `max` characters.
    #[must_use]
    pub fn too_long(field: &'static str, max: usize, actual: usize) -> Self {
        Self::new(
            field,
            format!("must be at most {max} characters, got {actual}"),
        )
    }

    /// Creates an error for a missing required value.
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::new(field, "is required")
    }

    /// Sets the list position of the offending element.
    #[must_use]
    pub const fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}] {}", self.field, index, self.reason),
            None => write!(f, "{} {}", self.field, self.reason),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks that `value` is at most `max` characters long.
///
/// Lengths are counted in Unicode scalar values, matching how the gateway
/// counts Cyrillic text.
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is longer than `max`.
pub fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::too_long(field, max, len));
    }
    Ok(())
}

/// Same as [`check_len`] for optional values; `None` always passes.
///
/// # Errors
///
/// Returns [`ValidationError`] if the value is present and too long.
pub fn check_len_opt(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| check_len(field, v, max))
}

/// Errors converting a ruble value into an [`Amount`](crate::Amount).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The value is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// The value is below zero.
    #[error("amount must not be negative: {0}")]
    Negative(String),
    /// The value has more than two fractional digits.
    #[error("amount has sub-kopeck precision: {0}")]
    SubKopeck(String),
    /// The value does not fit into a `u64` number of kopecks.
    #[error("amount is too large: {0}")]
    Overflow(String),
}

/// Errors producing a signed request body.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// The request could not be serialized.
    #[error("failed to serialize request: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The request serialized to something other than a JSON object.
    #[error("request must serialize to a JSON object, got {0}")]
    NotAnObject(&'static str),
}
