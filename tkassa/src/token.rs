//! Request signing.
//!
//! Every request body and every notification sent by the gateway carries a
//! `Token` field computed as follows:
//!
//! 1. Take the top-level fields of the JSON body. Nested objects and arrays
//!    (`Receipt`, `DATA`, `Shops`, ...), `null` values and `Token` itself are
//!    left out.
//! 2. Add the terminal password under the key `Password`.
//! 3. Sort the pairs by key.
//! 4. Concatenate the values in that order. Strings are taken verbatim,
//!    numbers in their JSON form, booleans as `true` / `false`.
//! 5. Hash the concatenation with SHA-256 and hex-encode it in lowercase.
//!
//! Because the input is the serialized body, the token always matches the
//! bytes that go over the wire, whatever order the fields were set in.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::config::Credentials;
use crate::error::SignError;

/// Wire name of the signature field.
pub const TOKEN_FIELD: &str = "Token";

/// Key under which the terminal password joins the signed pairs.
pub const PASSWORD_FIELD: &str = "Password";

/// Wire name of the terminal key field.
pub const TERMINAL_KEY_FIELD: &str = "TerminalKey";

/// A hex-encoded SHA-256 request signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Returns the lowercase hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the hex digest.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Compares against a token received from the wire.
    ///
    /// Case-insensitive, and takes time independent of where the first
    /// mismatch occurs.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        let ours = self.0.as_bytes();
        let theirs = other.as_bytes();
        if ours.len() != theirs.len() {
            return false;
        }
        ours.iter()
            .zip(theirs)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b.to_ascii_lowercase()))
            == 0
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders a top-level value the way it takes part in the signature.
///
/// Returns `None` for values that are not signed.
fn signed_value(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("true")),
        Value::Bool(false) => Some(Cow::Borrowed("false")),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Computes the token for a set of top-level fields.
///
/// An existing `Token` entry in `fields` is ignored.
#[must_use]
pub fn sign(fields: &Map<String, Value>, password: &str) -> Token {
    let mut pairs: BTreeMap<&str, Cow<'_, str>> = fields
        .iter()
        .filter(|(key, _)| key.as_str() != TOKEN_FIELD)
        .filter_map(|(key, value)| signed_value(value).map(|v| (key.as_str(), v)))
        .collect();
    pairs.insert(PASSWORD_FIELD, Cow::Borrowed(password));

    let mut hasher = Sha256::new();
    for value in pairs.values() {
        hasher.update(value.as_bytes());
    }

    #[cfg(feature = "telemetry")]
    tracing::trace!(fields = pairs.len(), "computed request token");

    Token(hex::encode(hasher.finalize()))
}

/// Checks a received `token` against the one computed for `fields`.
#[must_use]
pub fn verify(fields: &Map<String, Value>, password: &str, token: &str) -> bool {
    sign(fields, password).matches(token)
}

/// Serializes `request`, injects the terminal key and appends the token.
///
/// The returned map is the complete JSON body for the gateway.
///
/// # Errors
///
/// Returns [`SignError`] if the request fails to serialize or does not
/// serialize to a JSON object.
pub fn sign_request<R>(request: &R, credentials: &Credentials) -> Result<Map<String, Value>, SignError>
where
    R: Serialize + ?Sized,
{
    let mut fields = match serde_json::to_value(request)? {
        Value::Object(fields) => fields,
        Value::Null => return Err(SignError::NotAnObject("null")),
        Value::Bool(_) => return Err(SignError::NotAnObject("a boolean")),
        Value::Number(_) => return Err(SignError::NotAnObject("a number")),
        Value::String(_) => return Err(SignError::NotAnObject("a string")),
        Value::Array(_) => return Err(SignError::NotAnObject("an array")),
    };
    fields.insert(
        TERMINAL_KEY_FIELD.to_owned(),
        Value::String(credentials.terminal_key().to_owned()),
    );
    fields.remove(TOKEN_FIELD);

    let token = sign(&fields, credentials.password());
    fields.insert(TOKEN_FIELD.to_owned(), Value::String(token.into_string()));
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_sign_reference_vector() {
        let fields = object(json!({
            "TerminalKey": "TinkoffBankTest",
            "Amount": 19200,
            "OrderId": "21090",
            "Description": "Подарочная карта на 1000 рублей",
        }));
        let token = sign(&fields, "usaf8fw8fsw21g");
        assert_eq!(
            token.as_str(),
            "44a2c8230d1154e7e67c36eceb381690a6c5ee4e969353d79e319fceca64285f"
        );
    }

    #[test]
    fn test_sign_is_independent_of_insertion_order() {
        let forward = object(json!({
            "TerminalKey": "1733316170548DEMO",
            "Amount": 12000,
            "OrderId": "test-order-1",
        }));
        let mut backward = Map::new();
        backward.insert("OrderId".into(), json!("test-order-1"));
        backward.insert("Amount".into(), json!(12000));
        backward.insert("TerminalKey".into(), json!("1733316170548DEMO"));

        let a = sign(&forward, "12$##&HSG6mrxV4H");
        let b = sign(&backward, "12$##&HSG6mrxV4H");
        assert_eq!(a, b);
        assert_eq!(
            a.as_str(),
            "dc74866f1f450af94bec14347b307fb09f5d6547037097c6443bb6173a7416f2"
        );
    }

    #[test]
    fn test_sign_ignores_nested_null_and_token() {
        let plain = object(json!({
            "TerminalKey": "TestKey",
            "PaymentId": "700001",
        }));
        let decorated = object(json!({
            "TerminalKey": "TestKey",
            "PaymentId": "700001",
            "Receipt": { "Email": "a@b.c", "Items": [] },
            "DATA": { "Phone": "+79001234567" },
            "Shops": [{ "ShopCode": "1", "Amount": 100 }],
            "Description": null,
            "Token": "deadbeef",
        }));
        assert_eq!(sign(&plain, "secret"), sign(&decorated, "secret"));
        assert_eq!(
            sign(&plain, "secret").as_str(),
            "8e919385ccf796af996a9eb7e93f7c7beb4c418f014e24ef32d26c1f9575649b"
        );
    }

    #[test]
    fn test_sign_depends_on_password() {
        let fields = object(json!({ "TerminalKey": "TestKey", "PaymentId": "700001" }));
        assert_ne!(sign(&fields, "secret"), sign(&fields, "other"));
    }

    #[test]
    fn test_booleans_sign_as_words() {
        let fields = object(json!({
            "TerminalKey": "TestKey",
            "OrderId": "order-1",
            "Success": true,
            "Status": "CONFIRMED",
            "PaymentId": 8_742_591,
            "ErrorCode": "0",
            "Amount": 19200,
            "CardId": 322_264,
            "Pan": "430000******0777",
            "ExpDate": "1122",
        }));
        assert_eq!(
            sign(&fields, "secret").as_str(),
            "add068be2dec0da9c8d1d678533cb14d3abc28e2e8c7f51e4ceb9631eb3da453"
        );
    }

    #[test]
    fn test_verify_accepts_uppercase_and_rejects_tampering() {
        let fields = object(json!({ "TerminalKey": "TestKey", "PaymentId": "700001" }));
        let token = "8E919385CCF796AF996A9EB7E93F7C7BEB4C418F014E24EF32D26C1F9575649B";
        assert!(verify(&fields, "secret", token));

        let tampered = object(json!({ "TerminalKey": "TestKey", "PaymentId": "700002" }));
        assert!(!verify(&tampered, "secret", token));
        assert!(!verify(&fields, "secret", "8e91"));
    }

    #[test]
    fn test_sign_request_injects_terminal_key_and_token() {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct GetState {
            payment_id: String,
        }

        let creds = Credentials::new("TestKey", "secret");
        let body = sign_request(
            &GetState {
                payment_id: "700001".into(),
            },
            &creds,
        )
        .unwrap();

        assert_eq!(body["TerminalKey"], "TestKey");
        assert_eq!(body["PaymentId"], "700001");
        assert_eq!(
            body["Token"],
            "8e919385ccf796af996a9eb7e93f7c7beb4c418f014e24ef32d26c1f9575649b"
        );
    }

    #[test]
    fn test_sign_request_rejects_non_objects() {
        let creds = Credentials::new("TestKey", "secret");
        let err = sign_request(&vec![1, 2, 3], &creds).unwrap_err();
        assert!(matches!(err, SignError::NotAnObject("an array")));
    }
}
