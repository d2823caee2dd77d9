//! Incoming status notifications.
//!
//! The gateway posts a JSON notification to the payment's `NotificationURL`
//! on every status change. The body is signed with the same token algorithm
//! as outgoing requests, so the merchant recomputes the token from the raw
//! body and compares. The merchant must answer with the plain text
//! [`NOTIFICATION_ACK`], otherwise the gateway retries.
//!
//! ```no_run
//! use tkassa::Credentials;
//! use tkassa::notification::{NOTIFICATION_ACK, Notification};
//!
//! # fn handle(body: &[u8]) -> Result<&'static str, Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("TinkoffBankTest", "secret");
//! let notification = Notification::from_slice(body, &credentials)?;
//! println!("{} is now {:?}", notification.order_id, notification.status);
//! Ok(NOTIFICATION_ACK)
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::amount::Amount;
use crate::config::Credentials;
use crate::proto::{PaymentId, PaymentStatus, option_string_or_number, string_or_number};
use crate::token::{self, TOKEN_FIELD};

/// Body the merchant must answer a notification with.
pub const NOTIFICATION_ACK: &str = "OK";

/// Errors verifying a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The body is not JSON or does not match [`Notification`].
    #[error("malformed notification: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The body is valid JSON but not an object.
    #[error("notification must be a JSON object")]
    NotAnObject,

    /// The body has no `Token`.
    #[error("notification has no Token")]
    MissingToken,

    /// The token does not match the body.
    #[error("notification token mismatch")]
    TokenMismatch,

    /// The notification is for another terminal.
    #[error("notification is for terminal {0}")]
    TerminalKeyMismatch(String),
}

/// A payment status notification.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Notification {
    /// Terminal the payment belongs to.
    pub terminal_key: String,

    /// Merchant-side order identifier.
    pub order_id: String,

    /// Whether the operation that triggered the notification succeeded.
    pub success: bool,

    /// New status.
    pub status: PaymentStatus,

    /// Gateway payment identifier.
    pub payment_id: PaymentId,

    /// Gateway error code, `"0"` on success.
    #[serde(deserialize_with = "string_or_number")]
    pub error_code: String,

    /// Amount in kopecks.
    pub amount: Amount,

    /// Identifier of the card used.
    #[serde(default, deserialize_with = "option_string_or_number")]
    pub card_id: Option<String>,

    /// Masked card number.
    pub pan: Option<String>,

    /// Card expiry, `MMYY`.
    pub exp_date: Option<String>,

    /// Identifier for recurring charges, present for recurrent payments.
    #[serde(default, deserialize_with = "option_string_or_number")]
    pub rebill_id: Option<String>,

    /// `DATA` passed to `Init`.
    pub data: Option<Map<String, Value>>,

    /// Token the notification was signed with.
    pub token: String,
}

impl Notification {
    /// Verifies a raw notification body and decodes it.
    ///
    /// The token is recomputed over the body as received, so fields this
    /// type does not model still take part in the check.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] if the body is not an object, the token
    /// is missing or wrong, the terminal key is not ours, or the body does
    /// not decode.
    pub fn verify(raw: &Value, credentials: &Credentials) -> Result<Self, NotificationError> {
        let fields = raw.as_object().ok_or(NotificationError::NotAnObject)?;
        let received = fields
            .get(TOKEN_FIELD)
            .and_then(Value::as_str)
            .ok_or(NotificationError::MissingToken)?;
        if !token::verify(fields, credentials.password(), received) {
            return Err(NotificationError::TokenMismatch);
        }

        let notification: Self = serde_json::from_value(raw.clone())?;
        if notification.terminal_key != credentials.terminal_key() {
            return Err(NotificationError::TerminalKeyMismatch(notification.terminal_key));
        }

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            order_id = %notification.order_id,
            status = ?notification.status,
            "verified notification"
        );

        Ok(notification)
    }

    /// Parses and verifies a notification body.
    ///
    /// # Errors
    ///
    /// See [`Notification::verify`].
    pub fn from_slice(body: &[u8], credentials: &Credentials) -> Result<Self, NotificationError> {
        let raw: Value = serde_json::from_slice(body)?;
        Self::verify(&raw, credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID_TOKEN: &str = "add068be2dec0da9c8d1d678533cb14d3abc28e2e8c7f51e4ceb9631eb3da453";

    fn body(token: &str) -> Value {
        json!({
            "TerminalKey": "TestKey",
            "OrderId": "order-1",
            "Success": true,
            "Status": "CONFIRMED",
            "PaymentId": 8742591,
            "ErrorCode": "0",
            "Amount": 19200,
            "CardId": 322264,
            "Pan": "430000******0777",
            "ExpDate": "1122",
            "Token": token
        })
    }

    fn credentials() -> Credentials {
        Credentials::new("TestKey", "secret")
    }

    #[test]
    fn test_verify_accepts_signed_body() {
        let notification = Notification::verify(&body(VALID_TOKEN), &credentials()).unwrap();
        assert_eq!(notification.status, PaymentStatus::Confirmed);
        assert_eq!(notification.payment_id.as_str(), "8742591");
        assert_eq!(notification.card_id.as_deref(), Some("322264"));
        assert_eq!(notification.amount.kopecks(), 19_200);
        assert!(notification.success);
    }

    #[test]
    fn test_verify_accepts_uppercase_token() {
        let upper = VALID_TOKEN.to_ascii_uppercase();
        assert!(Notification::verify(&body(&upper), &credentials()).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_body() {
        let mut raw = body(VALID_TOKEN);
        raw["Amount"] = json!(1);
        assert!(matches!(
            Notification::verify(&raw, &credentials()),
            Err(NotificationError::TokenMismatch)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let other = Credentials::new("TestKey", "other");
        assert!(matches!(
            Notification::verify(&body(VALID_TOKEN), &other),
            Err(NotificationError::TokenMismatch)
        ));
    }

    #[test]
    fn test_verify_rejects_other_terminal() {
        let other = Credentials::new("OtherKey", "secret");
        assert!(matches!(
            Notification::verify(&body(VALID_TOKEN), &other),
            Err(NotificationError::TerminalKeyMismatch(key)) if key == "TestKey"
        ));
    }

    #[test]
    fn test_verify_rejects_missing_token_and_non_objects() {
        let mut raw = body(VALID_TOKEN);
        raw.as_object_mut().unwrap().remove("Token");
        assert!(matches!(
            Notification::verify(&raw, &credentials()),
            Err(NotificationError::MissingToken)
        ));
        assert!(matches!(
            Notification::verify(&json!([]), &credentials()),
            Err(NotificationError::NotAnObject)
        ));
        assert!(matches!(
            Notification::from_slice(b"not json", &credentials()),
            Err(NotificationError::Malformed(_))
        ));
    }

    #[test]
    fn test_verify_keeps_data_of_any_shape() {
        let mut raw = body(VALID_TOKEN);
        raw["Data"] = json!({ "Phone": "+79001234567", "Attempt": 2, "Gift": true });
        let notification = Notification::verify(&raw, &credentials()).unwrap();
        let data = notification.data.unwrap();
        assert_eq!(data["Phone"], "+79001234567");
        assert_eq!(data["Attempt"], 2);
        assert_eq!(data["Gift"], true);
    }

    #[test]
    fn test_from_slice() {
        let bytes = serde_json::to_vec(&body(VALID_TOKEN)).unwrap();
        let notification = Notification::from_slice(&bytes, &credentials()).unwrap();
        assert_eq!(notification.order_id, "order-1");
    }
}
