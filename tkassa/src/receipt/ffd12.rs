//! FFD 1.2 receipt layout.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{
    Ffd12Tag, PaymentMethod, PaymentObject, Payments, Tax, Taxation, validate_common,
    validate_item_base,
};
use crate::amount::Amount;
use crate::error::{ValidationError, check_len, check_len_opt};

static COUNTRY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}$").expect("valid country code regex"));

/// Unit of measure of a line item (tag 2108).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementUnit {
    /// Piece or unit.
    #[serde(rename = "pc")]
    Piece,
    /// Gram.
    #[serde(rename = "gr")]
    Gram,
    /// Kilogram.
    #[serde(rename = "kg")]
    Kilogram,
    /// Tonne.
    #[serde(rename = "t")]
    Tonne,
    /// Centimetre.
    #[serde(rename = "cm")]
    Centimetre,
    /// Decimetre.
    #[serde(rename = "dm")]
    Decimetre,
    /// Metre.
    #[serde(rename = "m")]
    Metre,
    /// Square centimetre.
    #[serde(rename = "sq_cm")]
    SquareCentimetre,
    /// Square decimetre.
    #[serde(rename = "sq_dm")]
    SquareDecimetre,
    /// Square metre.
    #[serde(rename = "sq_m")]
    SquareMetre,
    /// Millilitre.
    #[serde(rename = "ml")]
    Millilitre,
    /// Litre.
    #[serde(rename = "l")]
    Litre,
    /// Cubic metre.
    #[serde(rename = "cu_m")]
    CubicMetre,
    /// Kilowatt hour.
    #[serde(rename = "kWh")]
    KilowattHour,
    /// Gigacalorie.
    #[serde(rename = "GCal")]
    Gigacalorie,
    /// Day.
    #[serde(rename = "day")]
    Day,
    /// Hour.
    #[serde(rename = "hour")]
    Hour,
    /// Minute.
    #[serde(rename = "minute")]
    Minute,
    /// Second.
    #[serde(rename = "second")]
    Second,
    /// Kilobyte.
    #[serde(rename = "KB")]
    Kilobyte,
    /// Megabyte.
    #[serde(rename = "MB")]
    Megabyte,
    /// Gigabyte.
    #[serde(rename = "GB")]
    Gigabyte,
    /// Terabyte.
    #[serde(rename = "TB")]
    Terabyte,
    /// Any other unit.
    #[serde(rename = "other")]
    Other,
}

/// Kind of product marking code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(missing_docs)]
pub enum MarkCodeType {
    Unknown,
    Ean8,
    Ean13,
    Itf14,
    Gs10,
    Gs1m,
    Short,
    Fur,
    Egais20,
    Egais30,
    Rawcode,
}

/// Marking code processing mode (tag 2102).
///
/// Only mode `"0"` is defined; any other value fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkProcessingMode {
    /// Standard processing.
    #[default]
    #[serde(rename = "0")]
    Standard,
}

/// Product marking code (tag 1163).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MarkCode {
    /// Kind of code.
    pub mark_code_type: MarkCodeType,
    /// Code as read from the product.
    pub value: String,
}

/// Fraction of a marked item being sold (tag 1291).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MarkQuantity {
    /// Units sold.
    pub numerator: u32,
    /// Units in the package.
    pub denominator: u32,
}

/// A receipt line item in the FFD 1.2 layout.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemFfd12 {
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

    /// Settlement method.
    pub payment_method: PaymentMethod,

    /// Subject of settlement.
    pub payment_object: PaymentObject,

    /// Unit of measure.
    pub measurement_unit: MeasurementUnit,

    /// Extra item requisite (tag 1191).
    pub user_data: Option<String>,

    /// Excise duty in rubles.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub excise: Option<Decimal>,

    /// Numeric country of origin code, three digits.
    pub country_code: Option<String>,

    /// Customs declaration number, at most 32 characters.
    pub declaration_number: Option<String>,

    /// Marking code processing mode; required when a mark code is present.
    pub mark_processing_mode: Option<MarkProcessingMode>,

    /// Product marking code.
    pub mark_code: Option<MarkCode>,

    /// Fraction of the marked item being sold.
    pub mark_quantity: Option<MarkQuantity>,

    /// Marketplace shop this item belongs to.
    pub shop_code: Option<String>,
}

impl ItemFfd12 {
    /// Creates an item with the fields FFD 1.2 requires.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        price: Amount,
        quantity: Decimal,
        amount: Amount,
        tax: Tax,
        payment_method: PaymentMethod,
        payment_object: PaymentObject,
        measurement_unit: MeasurementUnit,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
            amount,
            tax,
            payment_method,
            payment_object,
            measurement_unit,
            user_data: None,
            excise: None,
            country_code: None,
            declaration_number: None,
            mark_processing_mode: None,
            mark_code: None,
            mark_quantity: None,
            shop_code: None,
        }
    }

    /// Attaches a marking code with the standard processing mode.
    #[must_use]
    pub fn with_mark_code(mut self, mark_code: MarkCode) -> Self {
        self.mark_code = Some(mark_code);
        self.mark_processing_mode = Some(MarkProcessingMode::Standard);
        self
    }

    /// Sets the country of origin and customs declaration.
    #[must_use]
    pub fn with_origin(
        mut self,
        country_code: impl Into<String>,
        declaration_number: impl Into<String>,
    ) -> Self {
        self.country_code = Some(country_code.into());
        self.declaration_number = Some(declaration_number.into());
        self
    }

    /// Assigns the item to a marketplace shop.
    #[must_use]
    pub fn with_shop_code(mut self, shop_code: impl Into<String>) -> Self {
        self.shop_code = Some(shop_code.into());
        self
    }

    pub(super) fn validate(&self, index: usize) -> Result<(), ValidationError> {
        validate_item_base(index, &self.name, self.quantity, None)?;
        if let Some(code) = &self.country_code
            && !COUNTRY_CODE_RE.is_match(code)
        {
            return Err(ValidationError::new("CountryCode", "must be three digits").at(index));
        }
        check_len_opt("DeclarationNumber", self.declaration_number.as_deref(), 32)
            .map_err(|e| e.at(index))?;
        if let Some(mark) = &self.mark_code {
            if self.mark_processing_mode.is_none() {
                return Err(ValidationError::missing("MarkProcessingMode").at(index));
            }
            check_len("MarkCode", &mark.value, 256).map_err(|e| e.at(index))?;
        }
        if let Some(q) = self.mark_quantity
            && (q.denominator == 0 || q.numerator > q.denominator)
        {
            return Err(ValidationError::new(
                "MarkQuantity",
                "numerator must not exceed a non-zero denominator",
            )
            .at(index));
        }
        Ok(())
    }
}

/// A receipt in the FFD 1.2 layout.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiptFfd12 {
    /// Always `"1.2"`.
    pub ffd_version: Ffd12Tag,

    /// Line items, at least one.
    pub items: Vec<ItemFfd12>,

    /// Buyer's e-mail; required if `phone` is absent.
    pub email: Option<String>,

    /// Buyer's phone; required if `email` is absent.
    pub phone: Option<String>,

    /// Merchant taxation system.
    pub taxation: Taxation,

    /// Payment breakdown.
    pub payments: Option<Payments>,
}

impl ReceiptFfd12 {
    /// Creates a receipt without buyer contacts.
    #[must_use]
    pub const fn new(items: Vec<ItemFfd12>, taxation: Taxation) -> Self {
        Self {
            ffd_version: Ffd12Tag,
            items,
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
