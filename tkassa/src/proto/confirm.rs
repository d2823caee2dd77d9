//! `Confirm`: debits the funds held by a two-stage payment.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{PaymentId, PaymentStatus, TokenRequest};
use crate::amount::Amount;
use crate::error::ValidationError;
use crate::receipt::Receipt;
use crate::shop::{Shop, validate_shops};

/// Confirms a two-stage payment in `AUTHORIZED` status.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Confirm {
    /// Gateway payment identifier.
    pub payment_id: PaymentId,

    /// Buyer's IP address.
    #[serde(rename = "IP")]
    pub ip: Option<IpAddr>,

    /// Amount to debit; the full held amount when absent.
    pub amount: Option<Amount>,

    /// Fiscal receipt for the confirmed amount.
    pub receipt: Option<Receipt>,

    /// Marketplace split for the confirmed amount.
    pub shops: Option<Vec<Shop>>,
}

impl Confirm {
    /// Confirms the full held amount.
    #[must_use]
    pub fn new(payment_id: impl Into<PaymentId>) -> Self {
        Self {
            payment_id: payment_id.into(),
            ip: None,
            amount: None,
            receipt: None,
            shops: None,
        }
    }

    /// Sets the buyer's IP address.
    #[must_use]
    pub const fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = Some(ip);
        self
    }

    /// Confirms only part of the held amount.
    #[must_use]
    pub const fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Attaches a fiscal receipt.
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
}

impl TokenRequest for Confirm {
    const METHOD: &'static str = "Confirm";
    type Response = Confirmation;

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(receipt) = &self.receipt {
            receipt.validate()?;
        }
        if let Some(shops) = &self.shops {
            validate_shops(shops)?;
        }
        Ok(())
    }
}

/// Result of a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Confirmation {
    /// Terminal the payment belongs to.
    pub terminal_key: String,
    /// Merchant-side order identifier.
    pub order_id: String,
    /// New status, normally `CONFIRMED`.
    pub status: PaymentStatus,
    /// Gateway payment identifier.
    pub payment_id: PaymentId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_confirm_wire_format() {
        let request = Confirm::new("13660").with_amount(Amount::from_kopecks(5_000));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "PaymentId": "13660", "Amount": 5000 })
        );
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_response() {
        let confirmation: Confirmation = serde_json::from_value(json!({
            "Success": true,
            "ErrorCode": "0",
            "TerminalKey": "TinkoffBankTest",
            "Status": "CONFIRMED",
            "PaymentId": "2164657",
            "OrderId": "PaymentTest2"
        }))
        .unwrap();
        assert_eq!(confirmation.status, PaymentStatus::Confirmed);
        assert_eq!(confirmation.order_id, "PaymentTest2");
    }
}
