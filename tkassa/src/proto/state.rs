//! `GetState`: current status of a payment.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{PaymentId, PaymentStatus, TokenRequest};
use crate::amount::Amount;

/// Requests the current status of a payment.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetState {
    /// Gateway payment identifier.
    pub payment_id: PaymentId,

    /// Buyer's IP address.
    #[serde(rename = "IP")]
    pub ip: Option<IpAddr>,
}

impl GetState {
    /// Creates a request for `payment_id`.
    #[must_use]
    pub fn new(payment_id: impl Into<PaymentId>) -> Self {
        Self {
            payment_id: payment_id.into(),
            ip: None,
        }
    }

    /// Sets the buyer's IP address.
    #[must_use]
    pub const fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = Some(ip);
        self
    }
}

impl TokenRequest for GetState {
    const METHOD: &'static str = "GetState";
    type Response = PaymentState;
}

/// Additional payment parameter returned by `GetState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentParam {
    /// Parameter name, e.g. `Route` or `Source`.
    pub key: String,
    /// Parameter value.
    pub value: String,
}

/// Status of a payment.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentState {
    /// Terminal the payment belongs to.
    pub terminal_key: String,

    /// Current status.
    pub status: PaymentStatus,

    /// Gateway payment identifier.
    pub payment_id: PaymentId,

    /// Merchant-side order identifier.
    pub order_id: String,

    /// Amount in kopecks.
    pub amount: Option<Amount>,

    /// Additional parameters.
    pub params: Option<Vec<PaymentParam>>,
}
