//! FFD 1.05 receipt layout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{
    Ffd105Tag, PaymentMethod, PaymentObject, Payments, Tax, Taxation, validate_common,
    validate_item_base,
};
use crate::amount::Amount;
use crate::error::ValidationError;

/// A receipt line item in the FFD 1.05 layout.
///
/// # JSON Format
///
/// ```json
/// {
///   "Name": "Полная оплата",
///   "Price": 12000,
///   "Quantity": 1.0,
///   "Amount": 12000,
///   "Tax": "none"
/// }
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemFfd105 {
    /// Item name, at most 128 characters.
    pub name: String,

    /// Price of one unit in kopecks.
    pub price: Amount,

    /// Quantity, up to three decimal places.
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,

    /// Line total in kopecks.
    pub amount: Amount,

    /// VAT rate.
    pub tax: Tax,

    /// Settlement method; the register's default applies when absent.
    pub payment_method: Option<PaymentMethod>,

    /// Subject of settlement; the register's default applies when absent.
    pub payment_object: Option<PaymentObject>,

    /// Hex-encoded product code (tag 1162), at most 300 characters.
    pub ean13: Option<String>,

    /// Marketplace shop this item belongs to.
    pub shop_code: Option<String>,
}

impl ItemFfd105 {
    /// Creates an item with an explicit quantity and line total.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        price: Amount,
        quantity: Decimal,
        amount: Amount,
        tax: Tax,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
            amount,
            tax,
            payment_method: None,
            payment_object: None,
            ean13: None,
            shop_code: None,
        }
    }

    /// Creates an item of quantity one whose line total equals its price.
    #[must_use]
    pub fn single(name: impl Into<String>, price: Amount, tax: Tax) -> Self {
        Self::new(name, price, Decimal::ONE, price, tax)
    }

    /// Sets the settlement method.
    #[must_use]
    pub const fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    /// Sets the subject of settlement.
    #[must_use]
    pub const fn with_payment_object(mut self, object: PaymentObject) -> Self {
        self.payment_object = Some(object);
        self
    }

    /// Assigns the item to a marketplace shop.
    #[must_use]
    pub fn with_shop_code(mut self, shop_code: impl Into<String>) -> Self {
        self.shop_code = Some(shop_code.into());
        self
    }

    pub(super) fn validate(&self, index: usize) -> Result<(), ValidationError> {
        validate_item_base(index, &self.name, self.quantity, self.ean13.as_deref())
    }
}

/// A receipt in the FFD 1.05 layout.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiptFfd105 {
    /// Line items, at least one.
    pub items: Vec<ItemFfd105>,

    /// Optional explicit `"1.05"` version tag.
    pub ffd_version: Option<Ffd105Tag>,

    /// Buyer's e-mail; required if `phone` is absent.
    pub email: Option<String>,

    /// Buyer's phone; required if `email` is absent.
    pub phone: Option<String>,

    /// Merchant taxation system.
    pub taxation: Taxation,

    /// Payment breakdown; everything is treated as electronic when absent.
    pub payments: Option<Payments>,
}

impl ReceiptFfd105 {
    /// Creates a receipt without buyer contacts.
    ///
    /// Set [`Self::with_email`] or [`Self::with_phone`] before sending.
    #[must_use]
    pub const fn new(items: Vec<ItemFfd105>, taxation: Taxation) -> Self {
        Self {
            items,
            ffd_version: None,
            email: None,
            phone: None,
            taxation,
            payments: None,
        }
    }

    /// Sets the buyer's e-mail.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the buyer's phone.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the payment breakdown.
    #[must_use]
    pub const fn with_payments(mut self, payments: Payments) -> Self {
        self.payments = Some(payments);
        self
    }

    /// Writes the `"1.05"` tag explicitly.
    #[must_use]
    pub const fn with_version_tag(mut self) -> Self {
        self.ffd_version = Some(Ffd105Tag);
        self
    }

    /// Checks field lengths, formats and required fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_common(self.email.as_deref(), self.phone.as_deref(), self.items.len())?;
        for (index, item) in self.items.iter().enumerate() {
            item.validate(index)?;
        }
        Ok(())
    }
}
