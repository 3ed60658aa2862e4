//! One fee collection attempt.
//!
//! A session bundles everything a collection dialog works on: the student's
//! fee groups as fetched when it opened, the operator's role, the selection
//! and the current draft. Edits return a new session, so two sessions never
//! share draft or error state.

use crate::models::{DiscountRule, FeeGroup, PaymentDraft, Role};
use crate::services::discount::{compute_discount_with_mode, find_rule, DiscountMode};
use crate::services::draft_validator::{validate, DraftErrors};
use crate::services::submission::{plan_submission, CollectFeeRequest, SubmissionPolicy};
use crate::services::totals::{aggregate_selected, FeeTotals};
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionRules {
    pub submission_policy: SubmissionPolicy,
    pub discount_mode: DiscountMode,
}

#[derive(Debug, Clone)]
pub struct CollectionSession {
    student_id: String,
    role: Role,
    groups: Vec<FeeGroup>,
    rules: CollectionRules,
    selected_ids: Vec<String>,
    draft: PaymentDraft,
}

impl CollectionSession {
    /// Open a session with an empty draft and nothing selected.
    pub fn open(
        student_id: impl Into<String>,
        role: Role,
        groups: Vec<FeeGroup>,
        rules: CollectionRules,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            role,
            groups,
            rules,
            selected_ids: Vec::new(),
            draft: PaymentDraft::empty(),
        }
    }

    pub fn draft(&self) -> &PaymentDraft {
        &self.draft
    }

    /// Replace the selection. Order is kept, duplicates are dropped.
    pub fn select<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected_ids: Vec<String> = Vec::new();
        for id in ids.into_iter().map(Into::into) {
            if !selected_ids.contains(&id) {
                selected_ids.push(id);
            }
        }

        Self {
            selected_ids,
            ..self
        }
    }

    /// Apply an edit to the draft.
    pub fn with_draft(self, edit: impl FnOnce(PaymentDraft) -> PaymentDraft) -> Self {
        let draft = edit(self.draft.clone());
        Self { draft, ..self }
    }

    /// Re-derive the discount amount from the catalogue and the current
    /// amount. Unknown codes derive zero.
    pub fn apply_discount(self, catalogue: &[DiscountRule]) -> Self {
        let base = self.draft.parsed_amount().unwrap_or_default();
        let rule = find_rule(catalogue, self.draft.discount_code());
        let discount = compute_discount_with_mode(rule, base, self.rules.discount_mode);
        self.with_draft(|d| d.with_discount_amount(discount))
    }

    /// Selected groups in selection order; ids that match no group are
    /// skipped.
    pub fn selected_groups(&self) -> Vec<&FeeGroup> {
        self.selected_ids
            .iter()
            .filter_map(|id| self.groups.iter().find(|g| &g.id == id))
            .collect()
    }

    pub fn selected_totals(&self) -> FeeTotals {
        aggregate_selected(&self.groups, &self.selected_ids)
    }

    pub fn errors(&self) -> DraftErrors {
        validate(
            &self.draft,
            &self.selected_groups(),
            self.role,
            self.rules.submission_policy,
        )
    }

    pub fn discount_amount(&self) -> Decimal {
        self.draft.discount_amount
    }

    /// Consume the session, producing the collect requests to send, or the
    /// errors that block submission.
    pub fn submit(self, today: NaiveDate) -> Result<Vec<CollectFeeRequest>, DraftErrors> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(errors);
        }

        let requests = plan_submission(
            &self.draft,
            &self.selected_groups(),
            self.rules.submission_policy,
            today,
        );
        tracing::debug!(
            student_id = %self.student_id,
            allocations = requests.len(),
            "Planned fee collection"
        );
        Ok(requests)
    }
}
