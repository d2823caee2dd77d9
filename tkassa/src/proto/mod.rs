//! Wire types for gateway operations.
//!
//! Each operation is a request type implementing [`TokenRequest`], which ties
//! it to the gateway method name and to its success response type:
//!
//! | request            | method     | response              |
//! |--------------------|------------|-----------------------|
//! | [`Init`]           | `Init`     | [`Payment`]           |
//! | [`GetState`]       | `GetState` | [`PaymentState`]      |
//! | [`Confirm`]        | `Confirm`  | [`Confirmation`]      |
//! | [`Cancel`]         | `Cancel`   | [`Cancellation`]      |
//!
//! Request types hold only the operation's own fields. `TerminalKey` and
//! `Token` are added by [`sign_request`](crate::token::sign_request).
//!
//! # Wire Format
//!
//! All field names are `PascalCase` (`OrderId`, `PaymentId`), with a few
//! vendor exceptions such as `NotificationURL` and `DATA`. Absent optional
//! fields are omitted rather than sent as `null`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

mod cancel;
mod confirm;
mod init;
pub mod responses;
mod state;

pub use cancel::{Cancel, Cancellation};
pub use confirm::{Confirm, Confirmation};
pub use init::{Init, MAX_DATA_ENTRIES, Payment};
pub use responses::{FailureResponse, GatewayResponse};
pub use state::{GetState, PaymentParam, PaymentState};

/// A signed gateway request.
pub trait TokenRequest: Serialize {
    /// Gateway method name, appended to the base URL (e.g. `"Init"`).
    const METHOD: &'static str;

    /// Body returned by the gateway when `Success` is `true`.
    type Response: DeserializeOwned;

    /// Checks the request against the gateway's schema before sending.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Gateway-assigned payment identifier.
///
/// The gateway sends it as a string in some responses and as a number in
/// others; both decode to the same value. Always serialized as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaymentId(String);

impl PaymentId {
    /// Creates a payment identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaymentId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PaymentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for PaymentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for PaymentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PaymentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(Self)
    }
}

/// Decodes a JSON string or integer into a `String`.
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
    })
}

/// Same as [`string_or_number`] for optional fields.
pub(crate) fn option_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(s)| s))
}

/// Payment flow: one or two stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    /// Funds are debited immediately.
    #[serde(rename = "O")]
    OneStage,
    /// Funds are held and debited on `Confirm`.
    #[serde(rename = "T")]
    TwoStage,
}

/// Language of the payment form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Russian (the gateway default).
    #[default]
    Ru,
    /// English.
    En,
}

/// Lifecycle status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum PaymentStatus {
    New,
    FormShowed,
    Authorizing,
    #[serde(rename = "3DS_CHECKING")]
    ThreeDsChecking,
    #[serde(rename = "3DS_CHECKED")]
    ThreeDsChecked,
    Authorized,
    Confirming,
    Confirmed,
    Reversing,
    PartialReversed,
    Reversed,
    Refunding,
    PartialRefunded,
    Refunded,
    Canceled,
    DeadlineExpired,
    Rejected,
    AuthFail,
    /// A status this library does not know about.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Returns `true` once the payment can no longer change state on its own.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Confirmed
                | Self::Reversed
                | Self::Refunded
                | Self::PartialRefunded
                | Self::PartialReversed
                | Self::Canceled
                | Self::DeadlineExpired
                | Self::Rejected
                | Self::AuthFail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_id_accepts_string_and_number() {
        let a: PaymentId = serde_json::from_value(json!("13660")).unwrap();
        let b: PaymentId = serde_json::from_value(json!(13660)).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_value(&b).unwrap(), json!("13660"));
    }

    #[test]
    fn test_payment_status_wire_values() {
        let status: PaymentStatus = serde_json::from_value(json!("3DS_CHECKING")).unwrap();
        assert_eq!(status, PaymentStatus::ThreeDsChecking);
        let status: PaymentStatus = serde_json::from_value(json!("PARTIAL_REFUNDED")).unwrap();
        assert_eq!(status, PaymentStatus::PartialRefunded);
        assert!(status.is_final());
        assert_eq!(
            serde_json::to_value(PaymentStatus::FormShowed).unwrap(),
            json!("FORM_SHOWED")
        );
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let status: PaymentStatus = serde_json::from_value(json!("ATTEMPTS_EXPIRED")).unwrap();
        assert_eq!(status, PaymentStatus::Unknown);
        assert!(!status.is_final());
    }

    #[test]
    fn test_payment_type_and_language() {
        assert_eq!(serde_json::to_value(PaymentType::OneStage).unwrap(), json!("O"));
        assert_eq!(serde_json::to_value(PaymentType::TwoStage).unwrap(), json!("T"));
        assert_eq!(serde_json::to_value(Language::En).unwrap(), json!("en"));
    }
}
