//! Derived, in-memory view of a fee record.

use super::fee_record::Payment;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment status of a fee group. Overdue is not a status; see
/// `services::due_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    Pending,
    Partial,
    Paid,
}

impl FeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Pending => "pending",
            FeeStatus::Partial => "partial",
            FeeStatus::Paid => "paid",
        }
    }

    /// Classify by paid versus total.
    pub fn classify(paid: Decimal, total: Decimal) -> Self {
        if paid >= total {
            FeeStatus::Paid
        } else if paid > Decimal::ZERO {
            FeeStatus::Partial
        } else {
            FeeStatus::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeGroup {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub paid: Decimal,
    /// Server-reported pending amount, taken verbatim.
    pub balance: Decimal,
    pub discount: Decimal,
    pub fine: Decimal,
    pub status: FeeStatus,
    pub next_payment_due_date: Option<NaiveDate>,
    pub payments: Vec<Payment>,
}
