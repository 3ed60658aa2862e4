//! Server-owned fee records, as returned by the fee API.

use super::wire::{amount_or_zero, api_date_opt};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One course/batch fee obligation of a student.
///
/// `pending_amount` is the ledger's own figure and is never recomputed from
/// `total_fee - paid_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub student_id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub batch_name: Option<String>,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub total_fee: Decimal,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub paid_amount: Decimal,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub pending_amount: Decimal,
    #[serde(default, deserialize_with = "api_date_opt")]
    pub next_payment_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_history: Vec<Payment>,
}

/// A recorded payment. Append-only; reverting one is a server-side undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(alias = "_id")]
    pub id: String,
    pub receipt_no: String,
    #[serde(default)]
    pub payment_mode: String,
    #[serde(default, deserialize_with = "api_date_opt")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub discount_amount: Decimal,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub fine: Decimal,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}
