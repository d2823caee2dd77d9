//! `Init`: creates a payment and returns the payment form URL.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::skip_serializing_none;
use time::OffsetDateTime;
use url::Url;

use super::{Language, PaymentId, PaymentStatus, PaymentType, TokenRequest};
use crate::amount::Amount;
use crate::error::{ValidationError, check_len, check_len_opt};
use crate::receipt::Receipt;
use crate::shop::{Shop, validate_shops};

/// Maximum number of `DATA` entries the gateway accepts.
pub const MAX_DATA_ENTRIES: usize = 20;

const MAX_DATA_KEY_LEN: usize = 20;
const MAX_DATA_VALUE_LEN: usize = 100;

/// Creates a new payment.
///
/// # JSON Format
///
/// ```json
/// {
///   "Amount": 19200,
///   "OrderId": "21090",
///   "Description": "Подарочная карта на 1000 рублей",
///   "NotificationURL": "https://example.com/tbank/webhook",
///   "DATA": { "Phone": "+71234567890" },
///   "Receipt": { "Email": "a@test.ru", "Taxation": "osn", "Items": [] }
/// }
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Init {
    /// Amount in kopecks.
    pub amount: Amount,

    /// Merchant-side order identifier, at most 36 characters.
    pub order_id: String,

    /// Order description shown on the payment form, at most 140 characters.
    pub description: Option<String>,

    /// Buyer identifier for saved cards and recurring payments.
    pub customer_key: Option<String>,

    /// Registers the payment as the parent of future recurring charges.
    #[serde(default, skip_serializing_if = "std::ops::Not::not", with = "recurrent_flag")]
    pub recurrent: bool,

    /// One- or two-stage flow; the terminal default applies when absent.
    pub pay_type: Option<PaymentType>,

    /// Payment form language.
    pub language: Option<Language>,

    /// Where the gateway posts status notifications.
    #[serde(rename = "NotificationURL")]
    pub notification_url: Option<Url>,

    /// Redirect after a successful payment.
    #[serde(rename = "SuccessURL")]
    pub success_url: Option<Url>,

    /// Redirect after a failed payment.
    #[serde(rename = "FailURL")]
    pub fail_url: Option<Url>,

    /// Lifetime of the payment link.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub redirect_due_date: Option<OffsetDateTime>,

    /// Extra key-value pairs passed through to the gateway.
    #[serde(rename = "DATA")]
    pub data: Option<BTreeMap<String, String>>,

    /// Fiscal receipt.
    pub receipt: Option<Receipt>,

    /// Marketplace split.
    pub shops: Option<Vec<Shop>>,

    /// Dynamic descriptor shown on the buyer's bank statement.
    pub descriptor: Option<String>,
}

impl Init {
    /// Creates a request with only the required fields.
    #[must_use]
    pub fn new(amount: Amount, order_id: impl Into<String>) -> Self {
        Self {
            amount,
            order_id: order_id.into(),
            description: None,
            customer_key: None,
            recurrent: false,
            pay_type: None,
            language: None,
            notification_url: None,
            success_url: None,
            fail_url: None,
            redirect_due_date: None,
            data: None,
            receipt: None,
            shops: None,
            descriptor: None,
        }
    }

    /// Sets the order description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the buyer identifier.
    #[must_use]
    pub fn with_customer_key(mut self, customer_key: impl Into<String>) -> Self {
        self.customer_key = Some(customer_key.into());
        self
    }

    /// Marks the payment as the parent of recurring charges.
    ///
    /// Requires a customer key.
    #[must_use]
    pub const fn recurrent(mut self) -> Self {
        self.recurrent = true;
        self
    }

    /// Sets the payment flow.
    #[must_use]
    pub const fn with_pay_type(mut self, pay_type: PaymentType) -> Self {
        self.pay_type = Some(pay_type);
        self
    }

    /// Sets the payment form language.
    #[must_use]
    pub const fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Sets the notification URL.
    #[must_use]
    pub fn with_notification_url(mut self, url: Url) -> Self {
        self.notification_url = Some(url);
        self
    }

    /// Sets the success redirect.
    #[must_use]
    pub fn with_success_url(mut self, url: Url) -> Self {
        self.success_url = Some(url);
        self
    }

    /// Sets the failure redirect.
    #[must_use]
    pub fn with_fail_url(mut self, url: Url) -> Self {
        self.fail_url = Some(url);
        self
    }

    /// Sets the payment link lifetime.
    #[must_use]
    pub const fn with_redirect_due_date(mut self, due: OffsetDateTime) -> Self {
        self.redirect_due_date = Some(due);
        self
    }

    /// Adds a `DATA` entry.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
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

    /// Sets the statement descriptor.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }
}

impl TokenRequest for Init {
    const METHOD: &'static str = "Init";
    type Response = Payment;

    fn validate(&self) -> Result<(), ValidationError> {
        if self.order_id.is_empty() {
            return Err(ValidationError::missing("OrderId"));
        }
        check_len("OrderId", &self.order_id, 36)?;
        check_len_opt("Description", self.description.as_deref(), 140)?;
        check_len_opt("CustomerKey", self.customer_key.as_deref(), 36)?;
        if self.recurrent && self.customer_key.is_none() {
            return Err(ValidationError::new(
                "CustomerKey",
                "is required for a recurrent payment",
            ));
        }
        if let Some(data) = &self.data {
            if data.len() > MAX_DATA_ENTRIES {
                return Err(ValidationError::new(
                    "DATA",
                    format!("must have at most {MAX_DATA_ENTRIES} entries, got {}", data.len()),
                ));
            }
            for (key, value) in data {
                check_len("DATA", key, MAX_DATA_KEY_LEN)?;
                check_len("DATA", value, MAX_DATA_VALUE_LEN)?;
            }
        }
        if let Some(receipt) = &self.receipt {
            receipt.validate()?;
        }
        if let Some(shops) = &self.shops {
            validate_shops(shops)?;
        }
        Ok(())
    }
}

/// A created payment.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payment {
    /// Terminal the payment belongs to.
    pub terminal_key: String,

    /// Amount in kopecks.
    pub amount: Amount,

    /// Merchant-side order identifier.
    pub order_id: String,

    /// Current status, normally `NEW`.
    pub status: PaymentStatus,

    /// Gateway payment identifier.
    pub payment_id: PaymentId,

    /// Payment form to redirect the buyer to.
    #[serde(rename = "PaymentURL")]
    pub payment_url: Option<Url>,
}

/// `Recurrent` is sent as `"Y"` and omitted when unset.
mod recurrent_flag {
    use super::{Deserialize, Deserializer, Serializer};

    const SET: &str = "Y";

    pub(super) fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        if *value {
            serializer.serialize_str(SET)
        } else {
            serializer.serialize_none()
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.is_some_and(|v| v.eq_ignore_ascii_case(SET)))
    }
}
