//! Read-only fee views: the collection table and the pending-fee list.

use crate::handlers::today;
use crate::middleware::Operator;
use crate::models::FeeGroup;
use crate::services::due_status::{classify_due_date, DueStatus};
use crate::services::normalizer::normalize;
use crate::services::totals::{aggregate, aggregate_selected, FeeTotals};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use desk_core::error::AppError;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Debug, Default, Deserialize)]
pub struct FeeSummaryQuery {
    /// Comma-separated fee group ids.
    pub selected: Option<String>,
}

impl FeeSummaryQuery {
    fn selected_ids(&self) -> Vec<String> {
        self.selected
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeGroupView {
    #[serde(flatten)]
    pub group: FeeGroup,
    pub due_status: DueStatus,
}

impl FeeGroupView {
    fn new(group: FeeGroup, today: NaiveDate) -> Self {
        let due_status = classify_due_date(group.next_payment_due_date, today);
        Self { group, due_status }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSummary {
    pub student_id: String,
    pub groups: Vec<FeeGroupView>,
    pub totals: FeeTotals,
    pub selected_ids: Vec<String>,
    pub selected_totals: FeeTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFees {
    pub student_id: String,
    pub groups: Vec<FeeGroupView>,
    pub totals: FeeTotals,
}

/// Fee groups of a student, normalized from the cached fee records.
pub async fn load_groups(
    state: &AppState,
    student_id: &str,
    caller_token: Option<&str>,
) -> Result<Vec<FeeGroup>, AppError> {
    let records = state.fees.student_fees(student_id, caller_token).await?;
    Ok(normalize(&records))
}

pub fn summarize(
    student_id: &str,
    groups: Vec<FeeGroup>,
    selected_ids: Vec<String>,
    today: NaiveDate,
) -> FeeSummary {
    let totals = aggregate(&groups);
    let selected_totals = aggregate_selected(&groups, &selected_ids);

    FeeSummary {
        student_id: student_id.to_string(),
        groups: groups
            .into_iter()
            .map(|g| FeeGroupView::new(g, today))
            .collect(),
        totals,
        selected_ids,
        selected_totals,
    }
}

/// Groups with a positive balance, most overdue first. Undated groups sort
/// last.
pub fn pending(student_id: &str, groups: Vec<FeeGroup>, today: NaiveDate) -> PendingFees {
    let mut groups: Vec<FeeGroupView> = groups
        .into_iter()
        .filter(|g| g.balance > rust_decimal::Decimal::ZERO)
        .map(|g| FeeGroupView::new(g, today))
        .collect();

    groups.sort_by_key(|v| {
        (
            v.group.next_payment_due_date.is_none(),
            Reverse(v.due_status.days_overdue),
            v.group.next_payment_due_date,
        )
    });

    let totals = aggregate(groups.iter().map(|v| &v.group));

    PendingFees {
        student_id: student_id.to_string(),
        groups,
        totals,
    }
}

#[tracing::instrument(skip(state, operator, query), fields(role = %operator.role.as_str()))]
pub async fn fee_summary(
    State(state): State<AppState>,
    operator: Operator,
    Path(student_id): Path<String>,
    Query(query): Query<FeeSummaryQuery>,
) -> Result<Json<FeeSummary>, AppError> {
    let groups = load_groups(&state, &student_id, operator.token.as_deref()).await?;
    Ok(Json(summarize(
        &student_id,
        groups,
        query.selected_ids(),
        today(),
    )))
}

#[tracing::instrument(skip(state, operator))]
pub async fn pending_fees(
    State(state): State<AppState>,
    operator: Operator,
    Path(student_id): Path<String>,
) -> Result<Json<PendingFees>, AppError> {
    let groups = load_groups(&state, &student_id, operator.token.as_deref()).await?;
    Ok(Json(pending(&student_id, groups, today())))
}
