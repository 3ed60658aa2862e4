//! Turning a validated draft into fee API collect requests.

use crate::models::{FeeGroup, PaymentDraft};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a payment over several selected fee groups is submitted.
///
/// Validation always bounds the amount by the pending sum of every selected
/// group; the policy decides where the money goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPolicy {
    /// The whole amount goes to the first selected group.
    #[default]
    FirstSelected,
    /// Exactly one group must be selected.
    ExactlyOne,
    /// Fill the selected groups' balances in selection order.
    Distribute,
}

/// Body of `POST /fees/collect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectFeeRequest {
    pub fee_id: String,
    pub amount: Decimal,
    pub payment_mode: String,
    pub discount_code: Option<String>,
    pub discount_amount: Decimal,
    pub fine: Decimal,
    pub payment_date: NaiveDate,
    pub incharge_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected_by: Option<String>,
    pub next_payment_due_date: Option<NaiveDate>,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
}

impl CollectFeeRequest {
    fn from_draft(fee_id: &str, amount: Decimal, draft: &PaymentDraft, today: NaiveDate) -> Self {
        Self {
            fee_id: fee_id.to_string(),
            amount,
            payment_mode: draft.payment_mode.clone(),
            discount_code: draft.discount_code().map(str::to_string),
            discount_amount: draft.discount_amount,
            fine: draft.fine,
            payment_date: draft.payment_date.unwrap_or(today),
            incharge_code: draft.incharge_code.trim().to_string(),
            collected_by: draft.collected_by.clone(),
            next_payment_due_date: draft.next_payment_due_date,
            transaction_id: draft.transaction_id.clone(),
            remarks: draft.remarks.clone(),
        }
    }

    /// A follow-up allocation: no discount or fine of its own.
    fn without_adjustments(mut self) -> Self {
        self.discount_code = None;
        self.discount_amount = Decimal::ZERO;
        self.fine = Decimal::ZERO;
        self
    }
}

/// Plan the collect requests for a draft that already passed validation.
///
/// An unparseable amount or an empty selection plans nothing.
pub fn plan_submission(
    draft: &PaymentDraft,
    selected: &[&FeeGroup],
    policy: SubmissionPolicy,
    today: NaiveDate,
) -> Vec<CollectFeeRequest> {
    let Some(amount) = draft.parsed_amount() else {
        return vec![];
    };
    let Some(first) = selected.first() else {
        return vec![];
    };

    match policy {
        SubmissionPolicy::FirstSelected | SubmissionPolicy::ExactlyOne => {
            vec![CollectFeeRequest::from_draft(&first.id, amount, draft, today)]
        }
        SubmissionPolicy::Distribute => distribute(amount, draft, selected, today),
    }
}

fn distribute(
    amount: Decimal,
    draft: &PaymentDraft,
    selected: &[&FeeGroup],
    today: NaiveDate,
) -> Vec<CollectFeeRequest> {
    let mut remaining = amount;
    let mut requests = Vec::new();

    for group in selected {
        if remaining <= Decimal::ZERO {
            break;
        }
        if group.balance <= Decimal::ZERO {
            continue;
        }

        let share = remaining.min(group.balance);
        let request = CollectFeeRequest::from_draft(&group.id, share, draft, today);
        requests.push(if requests.is_empty() {
            request
        } else {
            request.without_adjustments()
        });
        remaining -= share;
    }

    requests
}
