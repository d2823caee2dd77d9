//! `Cancel`: reverses a hold or refunds a debited payment.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{PaymentId, PaymentStatus, TokenRequest};
use crate::amount::Amount;
use crate::error::{ValidationError, check_len_opt};
use crate::receipt::Receipt;
use crate::shop::{Shop, validate_shops};

/// Cancels a payment, fully or partially.
///
/// Depending on the payment's status the gateway either releases the held
/// funds (`REVERSED`) or refunds them (`REFUNDED`).
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cancel {
    /// Gateway payment identifier.
    pub payment_id: PaymentId,

    /// Buyer's IP address.
    #[serde(rename = "IP")]
    pub ip: Option<IpAddr>,

    /// Amount to cancel; the full amount when absent.
    pub amount: Option<Amount>,

    /// Refund receipt.
    pub receipt: Option<Receipt>,

    /// Marketplace split of the cancelled amount.
    pub shops: Option<Vec<Shop>>,

    /// Merchant idempotency key, at most 256 characters.
    pub external_request_id: Option<String>,
}

impl Cancel {
    /// Cancels the full amount.
    #[must_use]
    pub fn new(payment_id: impl Into<PaymentId>) -> Self {
        Self {
            payment_id: payment_id.into(),
            ip: None,
            amount: None,
            receipt: None,
            shops: None,
            external_request_id: None,
        }
    }

    /// Sets the buyer's IP address.
    #[must_use]
    pub const fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = Some(ip);
        self
    }

    /// Cancels only part of the amount.
    #[must_use]
    pub const fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Attaches a refund receipt.
    #[must_use]
    pub fn with_receipt(mut self, receipt: impl Into<Receipt>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }

    /// Sets the marketplace split.
    #[must_use]
    pub fn with_shops(mut self, shops: Vec<Shop>) -> Self {
        self.shops = Some(shops);
        self
    }

    /// Sets the idempotency key.
    #[must_use]
    pub fn with_external_request_id(mut self, id: impl Into<String>) -> Self {
        self.external_request_id = Some(id.into());
        self
    }
}

impl TokenRequest for Cancel {
    const METHOD: &'static str = "Cancel";
    type Response = Cancellation;

    fn validate(&self) -> Result<(), ValidationError> {
        check_len_opt("ExternalRequestId", self.external_request_id.as_deref(), 256)?;
        if let Some(receipt) = &self.receipt {
            receipt.validate()?;
        }
        if let Some(shops) = &self.shops {
            validate_shops(shops)?;
        }
        Ok(())
    }
}

/// Result of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cancellation {
    /// Terminal the payment belongs to.
    pub terminal_key: String,
    /// Merchant-side order identifier.
    pub order_id: String,
    /// New status.
    pub status: PaymentStatus,
    /// Amount before the cancellation, in kopecks.
    pub original_amount: Amount,
    /// Amount remaining after the cancellation, in kopecks.
    pub new_amount: Amount,
    /// Gateway payment identifier.
    pub payment_id: PaymentId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let request = Cancel::new("13660")
            .with_amount(Amount::from_kopecks(1_000))
            .with_external_request_id("refund-1");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "PaymentId": "13660", "Amount": 1000, "ExternalRequestId": "refund-1" })
        );
    }

    #[test]
    fn test_validate_external_request_id() {
        let err = Cancel::new("1")
            .with_external_request_id("x".repeat(257))
            .validate()
            .unwrap_err();
        assert_eq!(err.field, "ExternalRequestId");
    }

    #[test]
    fn test_response() {
        let cancellation: Cancellation = serde_json::from_value(json!({
            "Success": true,
            "ErrorCode": "0",
            "TerminalKey": "TinkoffBankTest",
            "Status": "PARTIAL_REFUNDED",
            "PaymentId": 13660,
            "OrderId": "21057",
            "OriginalAmount": 70000,
            "NewAmount": 69000
        }))
        .unwrap();
        assert_eq!(cancellation.status, PaymentStatus::PartialRefunded);
        assert_eq!(cancellation.new_amount.kopecks(), 69_000);
    }
}
