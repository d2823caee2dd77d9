//! Marketplace split payments.
//!
//! Marketplaces pass `Shops` with `Init` to split the payment between
//! sellers. Each entry names a shop registered with the bank and the share
//! of the payment it receives.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::amount::Amount;
use crate::error::{ValidationError, check_len_opt};

/// One seller's share of a marketplace payment.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shop {
    /// Shop code issued by the bank.
    pub shop_code: String,
    /// Share of the payment in kopecks.
    pub amount: Amount,
    /// Item name shown to the buyer.
    pub name: Option<String>,
    /// Marketplace fee withheld from this share, in kopecks.
    pub fee: Option<Amount>,
}

impl Shop {
    /// Creates a share without a name or fee.
    #[must_use]
    pub fn new(shop_code: impl Into<String>, amount: Amount) -> Self {
        Self {
            shop_code: shop_code.into(),
            amount,
            name: None,
            fee: None,
        }
    }

    /// Sets the displayed name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the marketplace fee.
    #[must_use]
    pub const fn with_fee(mut self, fee: Amount) -> Self {
        self.fee = Some(fee);
        self
    }
}

/// Validates a list of shop shares.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_shops(shops: &[Shop]) -> Result<(), ValidationError> {
    for (index, shop) in shops.iter().enumerate() {
        if shop.shop_code.is_empty() {
            return Err(ValidationError::missing("ShopCode").at(index));
        }
        check_len_opt("Name", shop.name.as_deref(), 128).map_err(|e| e.at(index))?;
    }
    Ok(())
}
