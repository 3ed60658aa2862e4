//! The in-progress state of one fee collection form.

use super::wire::{api_date_opt, input_amount, parse_amount, raw_input};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment draft as typed by the operator.
///
/// A draft is a plain value: each edit produces a new draft, and the draft is
/// dropped on cancel or consumed on submit. `amount` keeps the raw input so
/// that blank and malformed entries can be reported rather than coerced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    #[serde(default, deserialize_with = "raw_input")]
    pub amount: String,
    #[serde(default)]
    pub payment_mode: String,
    #[serde(default)]
    pub discount_code: Option<String>,
    /// Derived from the discount rule on every change; client values are
    /// overwritten before validation.
    #[serde(default, deserialize_with = "input_amount")]
    pub discount_amount: Decimal,
    #[serde(default, deserialize_with = "input_amount")]
    pub fine: Decimal,
    #[serde(default, deserialize_with = "api_date_opt")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "api_date_opt")]
    pub next_payment_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub incharge_code: String,
    #[serde(default)]
    pub collected_by: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl PaymentDraft {
    /// The state of a freshly opened collection dialog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The entered amount, if it parses as a number.
    pub fn parsed_amount(&self) -> Option<Decimal> {
        parse_amount(&self.amount)
    }

    /// Discount code with blank input treated as "no discount".
    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn with_amount(self, amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            ..self
        }
    }

    pub fn with_discount_code(self, code: Option<String>) -> Self {
        Self {
            discount_code: code,
            ..self
        }
    }

    pub fn with_discount_amount(self, discount_amount: Decimal) -> Self {
        Self {
            discount_amount,
            ..self
        }
    }

    pub fn with_incharge_code(self, incharge_code: impl Into<String>) -> Self {
        Self {
            incharge_code: incharge_code.into(),
            ..self
        }
    }

    pub fn with_fine(self, fine: Decimal) -> Self {
        Self { fine, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_accepts_string_or_number() {
        let from_text: PaymentDraft = serde_json::from_value(json!({ "amount": "1500" })).unwrap();
        let from_number: PaymentDraft = serde_json::from_value(json!({ "amount": 1500 })).unwrap();

        assert_eq!(from_text.parsed_amount(), Some(Decimal::from(1500)));
        assert_eq!(from_number.parsed_amount(), Some(Decimal::from(1500)));
    }

    #[test]
    fn test_blank_fields_deserialize_to_defaults() {
        let draft: PaymentDraft = serde_json::from_value(json!({
            "amount": "",
            "fine": "",
            "discountCode": "  ",
            "paymentDate": ""
        }))
        .unwrap();

        assert_eq!(draft.parsed_amount(), None);
        assert_eq!(draft.fine, Decimal::ZERO);
        assert_eq!(draft.discount_code(), None);
        assert_eq!(draft.payment_date, None);
    }

    #[test]
    fn test_edits_produce_new_values() {
        let opened = PaymentDraft::empty();
        let edited = opened.clone().with_amount("250").with_incharge_code("INC-7");

        assert_eq!(opened, PaymentDraft::empty());
        assert_eq!(edited.amount, "250");
        assert_eq!(edited.incharge_code, "INC-7");
    }
}
