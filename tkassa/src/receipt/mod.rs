//! Fiscal receipts (54-FZ).
//!
//! A terminal connected to an online cash register must send a `Receipt`
//! with `Init` (and with partial `Confirm` / `Cancel`). Two layouts exist,
//! selected by the fiscal data format (FFD) version the terminal is set up
//! for:
//!
//! - [`ReceiptFfd105`] with [`ItemFfd105`] line items. The `FfdVersion` tag
//!   is optional and defaults to `"1.05"`.
//! - [`ReceiptFfd12`] with [`ItemFfd12`] line items. The `FfdVersion` tag is
//!   always `"1.2"`, and items must state a measurement unit, payment method
//!   and payment object.
//!
//! [`Receipt`] wraps either layout. Decoding a receipt reads `FfdVersion`
//! first and then parses the body with the matching schema.
//!
//! # Example
//!
//! ```rust
//! use tkassa::Amount;
//! use tkassa::receipt::{ItemFfd105, Receipt, ReceiptFfd105, Tax, Taxation};
//!
//! let receipt: Receipt = ReceiptFfd105::new(
//!     vec![ItemFfd105::single("Полная оплата", Amount::from_kopecks(12_000), Tax::None)],
//!     Taxation::UsnIncomeOutcome,
//! )
//! .with_email("buyer@example.com")
//! .into();
//!
//! assert!(receipt.validate().is_ok());
//! ```

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use crate::amount::Amount;
use crate::error::{ValidationError, check_len, check_len_opt};

mod ffd105;
mod ffd12;
pub mod version;

pub use ffd105::{ItemFfd105, ReceiptFfd105};
pub use ffd12::{
    ItemFfd12, MarkCode, MarkCodeType, MarkProcessingMode, MarkQuantity, MeasurementUnit,
    ReceiptFfd12,
};
pub use version::{Ffd12Tag, Ffd105Tag, FfdVersion};

/// Maximum length of an item name.
pub const MAX_ITEM_NAME_LEN: usize = 128;

/// Maximum length of the buyer's e-mail or phone.
pub const MAX_CONTACT_LEN: usize = 64;

/// Largest quantity the register accepts for a line item (99999.999).
fn max_quantity() -> Decimal {
    Decimal::new(99_999_999, 3)
}

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,20}$").expect("valid phone regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// VAT rate applied to a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tax {
    /// Not subject to VAT.
    None,
    /// 0%.
    Vat0,
    /// 5%.
    Vat5,
    /// 7%.
    Vat7,
    /// 10%.
    Vat10,
    /// 20%.
    Vat20,
    /// 22%.
    Vat22,
    /// Calculated rate 5/105.
    Vat105,
    /// Calculated rate 7/107.
    Vat107,
    /// Calculated rate 10/110.
    Vat110,
    /// Calculated rate 20/120.
    Vat120,
    /// Calculated rate 22/122.
    Vat122,
}

/// Taxation system of the merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Taxation {
    /// General taxation system.
    Osn,
    /// Simplified, income.
    UsnIncome,
    /// Simplified, income minus expenses.
    UsnIncomeOutcome,
    /// Unified agricultural tax.
    Esn,
    /// Patent taxation system.
    Patent,
}

/// Settlement method of a line item (tag 1214).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// 100% prepayment before handing over the goods.
    FullPrepayment,
    /// Partial prepayment before handing over the goods.
    Prepayment,
    /// Advance payment.
    Advance,
    /// Full payment at handover.
    FullPayment,
    /// Partial payment at handover with subsequent credit.
    PartialPayment,
    /// Handover on credit.
    Credit,
    /// Payment of a credit.
    CreditPayment,
}

/// Subject of settlement of a line item (tag 1212).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum PaymentObject {
    Commodity,
    Excise,
    Job,
    Service,
    GamblingBet,
    GamblingPrize,
    Lottery,
    LotteryPrize,
    IntellectualActivity,
    Payment,
    AgentCommission,
    Contribution,
    PropertyRights,
    Unrealization,
    TaxReduction,
    TradeFee,
    ResortTax,
    Pledge,
    IncomeDecrease,
    IePensionInsuranceWithoutPayments,
    IePensionInsuranceWithPayments,
    IeMedicalInsuranceWithoutPayments,
    IeMedicalInsuranceWithPayments,
    SocialInsurance,
    CasinoChips,
    AgentPayment,
    ExcisableGoodsWithoutMarkingCode,
    ExcisableGoodsWithMarkingCode,
    GoodsWithoutMarkingCode,
    GoodsWithMarkingCode,
    Another,
}

/// Breakdown of how the receipt total was paid.
///
/// The sum of all parts must equal the payment amount.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payments {
    /// Paid electronically.
    pub electronic: Amount,
    /// Paid in cash.
    pub cash: Option<Amount>,
    /// Offset against an earlier advance.
    pub advance_payment: Option<Amount>,
    /// Paid on credit.
    pub credit: Option<Amount>,
    /// Paid by counter-provision.
    pub provision: Option<Amount>,
}

impl Payments {
    /// All of `amount` paid electronically.
    #[must_use]
    pub const fn electronic(amount: Amount) -> Self {
        Self {
            electronic: amount,
            cash: None,
            advance_payment: None,
            credit: None,
            provision: None,
        }
    }

    /// Returns the sum of all parts, or `None` on overflow.
    #[must_use]
    pub fn total(&self) -> Option<Amount> {
        [self.cash, self.advance_payment, self.credit, self.provision]
            .into_iter()
            .flatten()
            .try_fold(self.electronic, Amount::checked_add)
    }
}

/// A receipt in either fiscal data format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Receipt {
    /// FFD 1.05 layout.
    Ffd105(ReceiptFfd105),
    /// FFD 1.2 layout.
    Ffd12(ReceiptFfd12),
}

impl Receipt {
    /// Returns the fiscal data format version of this receipt.
    #[must_use]
    pub const fn version(&self) -> FfdVersion {
        match self {
            Self::Ffd105(_) => FfdVersion::V105,
            Self::Ffd12(_) => FfdVersion::V12,
        }
    }

    /// Returns the sum of all line item amounts, or `None` on overflow.
    #[must_use]
    pub fn items_total(&self) -> Option<Amount> {
        match self {
            Self::Ffd105(r) => sum_amounts(r.items.iter().map(|i| i.amount)),
            Self::Ffd12(r) => sum_amounts(r.items.iter().map(|i| i.amount)),
        }
    }

    /// Checks field lengths, formats and required fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Ffd105(r) => r.validate(),
            Self::Ffd12(r) => r.validate(),
        }
    }

    /// Decodes a receipt, choosing the schema from its `FfdVersion` tag.
    ///
    /// A missing tag selects FFD 1.05.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is unknown or the body does not match the
    /// selected schema.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let version = match value.get("FfdVersion") {
            None | Some(Value::Null) => FfdVersion::V105,
            Some(Value::String(tag)) => FfdVersion::from_tag(tag).ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "unsupported FfdVersion \"{tag}\""
                ))
            })?,
            Some(other) => {
                return Err(serde::de::Error::custom(format!(
                    "FfdVersion must be a string, got {other}"
                )));
            }
        };
        match version {
            FfdVersion::V105 => serde_json::from_value(value).map(Self::Ffd105),
            FfdVersion::V12 => serde_json::from_value(value).map(Self::Ffd12),
        }
    }
}

impl<'de> Deserialize<'de> for Receipt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl From<ReceiptFfd105> for Receipt {
    fn from(receipt: ReceiptFfd105) -> Self {
        Self::Ffd105(receipt)
    }
}

impl From<ReceiptFfd12> for Receipt {
    fn from(receipt: ReceiptFfd12) -> Self {
        Self::Ffd12(receipt)
    }
}

fn sum_amounts(amounts: impl IntoIterator<Item = Amount>) -> Option<Amount> {
    amounts
        .into_iter()
        .try_fold(Amount::ZERO, Amount::checked_add)
}

/// Validation shared by both layouts: contacts and payments.
fn validate_common(
    email: Option<&str>,
    phone: Option<&str>,
    item_count: usize,
) -> Result<(), ValidationError> {
    if item_count == 0 {
        return Err(ValidationError::new("Items", "must contain at least one item"));
    }
    if email.is_none() && phone.is_none() {
        return Err(ValidationError::new(
            "Email",
            "either Email or Phone must be set",
        ));
    }
    if let Some(email) = email {
        check_len("Email", email, MAX_CONTACT_LEN)?;
        if !EMAIL_RE.is_match(email) {
            return Err(ValidationError::new("Email", "is not a valid e-mail address"));
        }
    }
    if let Some(phone) = phone {
        check_len("Phone", phone, MAX_CONTACT_LEN)?;
        if !PHONE_RE.is_match(phone) {
            return Err(ValidationError::new(
                "Phone",
                "must be 7 to 20 digits, optionally prefixed with '+'",
            ));
        }
    }
    Ok(())
}

/// Validation shared by both item layouts.
fn validate_item_base(
    index: usize,
    name: &str,
    quantity: Decimal,
    ean13: Option<&str>,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::missing("Name").at(index));
    }
    check_len("Name", name, MAX_ITEM_NAME_LEN).map_err(|e| e.at(index))?;
    if quantity <= Decimal::ZERO || quantity > max_quantity() {
        return Err(
            ValidationError::new("Quantity", "must be greater than 0 and at most 99999.999")
                .at(index),
        );
    }
    if quantity.normalize().scale() > 3 {
        return Err(ValidationError::new("Quantity", "allows at most 3 decimal places").at(index));
    }
    check_len_opt("Ean13", ean13, 300).map_err(|e| e.at(index))?;
    Ok(())
}
