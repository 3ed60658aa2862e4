use super::wire::amount_or_zero;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// An entry of the discount catalogue.
///
/// Only the field matching `discount_type` is meaningful: `percentage` for
/// percentage rules, `amount` for fixed rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRule {
    pub code: String,
    pub discount_type: DiscountType,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub percentage: Decimal,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub amount: Decimal,
    #[serde(default)]
    pub name: String,
}
