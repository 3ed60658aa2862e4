//! Payment draft validation.
//!
//! Validation is a pure function of the draft, the selected fee groups and
//! the operator role. Callers re-run it after every edit and refuse to submit
//! while it reports anything.

use crate::models::{FeeGroup, PaymentDraft, Role};
use crate::services::submission::SubmissionPolicy;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

/// Form field an error is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Amount,
    InchargeCode,
    Selection,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::Amount => "amount",
            DraftField::InchargeCode => "inchargeCode",
            DraftField::Selection => "selection",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("Please enter a valid amount")]
    AmountRequired,

    #[error("Amount cannot exceed the pending amount of {pending:.2}")]
    AmountExceedsPending { pending: Decimal },

    #[error("Incharge is required")]
    InchargeRequired,

    #[error("Select exactly one fee group (selected {selected})")]
    SingleSelectionRequired { selected: usize },
}

impl DraftError {
    pub fn code(&self) -> &'static str {
        match self {
            DraftError::AmountRequired => "amount_required",
            DraftError::AmountExceedsPending { .. } => "amount_exceeds_pending",
            DraftError::InchargeRequired => "incharge_required",
            DraftError::SingleSelectionRequired { .. } => "single_selection_required",
        }
    }

    pub fn field(&self) -> DraftField {
        match self {
            DraftError::AmountRequired | DraftError::AmountExceedsPending { .. } => {
                DraftField::Amount
            }
            DraftError::InchargeRequired => DraftField::InchargeCode,
            DraftError::SingleSelectionRequired { .. } => DraftField::Selection,
        }
    }
}

/// Validation outcome: at most one error per field. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftErrors(BTreeMap<DraftField, DraftError>);

impl DraftErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: DraftField) -> Option<&DraftError> {
        self.0.get(&field)
    }

    pub fn contains(&self, error: &DraftError) -> bool {
        self.0.get(&error.field()) == Some(error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DraftError> {
        self.0.values()
    }

    /// Field name to message, as rendered next to the form controls.
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.0
            .iter()
            .map(|(field, error)| (field.as_str(), error.to_string()))
            .collect()
    }

    fn insert(&mut self, error: DraftError) {
        self.0.entry(error.field()).or_insert(error);
    }
}

impl From<DraftErrors> for ValidationErrors {
    fn from(errors: DraftErrors) -> Self {
        let mut out = ValidationErrors::new();
        for (field, error) in errors.0 {
            let mut e = ValidationError::new(error.code());
            e.message = Some(error.to_string().into());
            out.add(field.as_str(), e);
        }
        out
    }
}

/// Sum of the balances of the selected groups, saturating at the `Decimal`
/// range.
pub fn total_pending(selected: &[&FeeGroup]) -> Decimal {
    selected
        .iter()
        .fold(Decimal::ZERO, |sum, g| sum.saturating_add(g.balance))
}

/// Validate a draft against the selected fee groups.
///
/// The amount is bounded by the pending sum across *all* selected groups,
/// whatever the submission policy. Discount, fine, payment mode and dates
/// are not checked; negative fines and discounts pass.
pub fn validate(
    draft: &PaymentDraft,
    selected: &[&FeeGroup],
    role: Role,
    policy: SubmissionPolicy,
) -> DraftErrors {
    let mut errors = DraftErrors::default();

    match draft.parsed_amount() {
        Some(amount) if amount > Decimal::ZERO => {
            let pending = total_pending(selected);
            if amount > pending {
                errors.insert(DraftError::AmountExceedsPending { pending });
            }
        }
        _ => errors.insert(DraftError::AmountRequired),
    }

    if !role.is_admin() && draft.incharge_code.trim().is_empty() {
        errors.insert(DraftError::InchargeRequired);
    }

    if policy == SubmissionPolicy::ExactlyOne && selected.len() != 1 {
        errors.insert(DraftError::SingleSelectionRequired {
            selected: selected.len(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeeStatus;

    fn group(id: &str, balance: i64) -> FeeGroup {
        FeeGroup {
            id: id.to_string(),
            name: "N/A - N/A - N/A".to_string(),
            amount: Decimal::from(balance),
            paid: Decimal::ZERO,
            balance: Decimal::from(balance),
            discount: Decimal::ZERO,
            fine: Decimal::ZERO,
            status: FeeStatus::Pending,
            next_payment_due_date: None,
            payments: vec![],
        }
    }

    fn draft(amount: &str) -> PaymentDraft {
        PaymentDraft::empty()
            .with_amount(amount)
            .with_incharge_code("INC-1")
    }

    #[test]
    fn test_blank_amount_is_required() {
        let g = group("a", 1000);
        for role in [Role::Admin, Role::Center, Role::Incharge] {
            let errors = validate(&draft(""), &[&g], role, SubmissionPolicy::FirstSelected);
            assert_eq!(
                errors.get(DraftField::Amount),
                Some(&DraftError::AmountRequired)
            );
        }
    }

    #[test]
    fn test_non_positive_or_malformed_amount_is_required() {
        let g = group("a", 1000);
        for raw in ["0", "-10", "abc"] {
            let errors = validate(&draft(raw), &[&g], Role::Admin, SubmissionPolicy::FirstSelected);
            assert!(errors.contains(&DraftError::AmountRequired), "amount {:?}", raw);
        }
    }

    #[test]
    fn test_amount_bounded_by_sum_of_selected() {
        let a = group("a", 1000);
        let b = group("b", 500);

        let errors = validate(&draft("1600"), &[&a, &b], Role::Admin, SubmissionPolicy::FirstSelected);
        assert_eq!(
            errors.get(DraftField::Amount),
            Some(&DraftError::AmountExceedsPending {
                pending: Decimal::from(1500)
            })
        );

        // Exceeds the first group alone but not the selected sum.
        let errors = validate(&draft("1500"), &[&a, &b], Role::Admin, SubmissionPolicy::FirstSelected);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_nothing_selected_bounds_at_zero() {
        let errors = validate(&draft("10"), &[], Role::Admin, SubmissionPolicy::FirstSelected);
        assert!(errors.contains(&DraftError::AmountExceedsPending {
            pending: Decimal::ZERO
        }));
    }

    #[test]
    fn test_incharge_required_for_non_admin() {
        let g = group("a", 1000);
        let no_incharge = draft("100").with_incharge_code(" ");

        for role in [Role::Center, Role::Incharge] {
            let errors = validate(&no_incharge, &[&g], role, SubmissionPolicy::FirstSelected);
            assert_eq!(
                errors.get(DraftField::InchargeCode),
                Some(&DraftError::InchargeRequired)
            );
        }

        let errors = validate(&no_incharge, &[&g], Role::Admin, SubmissionPolicy::FirstSelected);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_negative_fine_and_discount_pass() {
        let g = group("a", 1000);
        let d = draft("100")
            .with_fine(Decimal::from(-50))
            .with_discount_amount(Decimal::from(-20));

        assert!(validate(&d, &[&g], Role::Center, SubmissionPolicy::FirstSelected).is_empty());
    }

    #[test]
    fn test_exactly_one_policy() {
        let a = group("a", 1000);
        let b = group("b", 500);

        let errors = validate(&draft("100"), &[&a, &b], Role::Admin, SubmissionPolicy::ExactlyOne);
        assert_eq!(
            errors.get(DraftField::Selection),
            Some(&DraftError::SingleSelectionRequired { selected: 2 })
        );

        assert!(validate(&draft("100"), &[&a], Role::Admin, SubmissionPolicy::ExactlyOne).is_empty());
    }

    #[test]
    fn test_errors_convert_to_validation_errors() {
        let errors = validate(&draft(""), &[], Role::Center, SubmissionPolicy::FirstSelected);
        let messages = errors.messages();
        assert_eq!(messages.get("amount").unwrap(), "Please enter a valid amount");

        let converted: ValidationErrors = errors.into();
        let fields = converted.field_errors();
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_largest_amounts_do_not_overflow() {
        let mut a = group("a", 0);
        a.balance = Decimal::MAX;
        let mut b = group("b", 0);
        b.balance = Decimal::MAX;

        assert_eq!(total_pending(&[&a, &b]), Decimal::MAX);

        let max = Decimal::MAX.to_string();
        assert!(validate(&draft(&max), &[&a, &b], Role::Admin, SubmissionPolicy::FirstSelected).is_empty());

        let small = group("c", 100);
        let errors = validate(&draft(&max), &[&small], Role::Admin, SubmissionPolicy::FirstSelected);
        assert!(errors.contains(&DraftError::AmountExceedsPending {
            pending: Decimal::from(100)
        }));
    }
}
