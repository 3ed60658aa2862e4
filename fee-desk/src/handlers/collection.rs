//! Validate, collect and revert endpoints.
//!
//! Every request opens a fresh `CollectionSession` over the student's current
//! fee groups; nothing about a draft is kept between requests.

use crate::handlers::fees::{load_groups, summarize, FeeSummary};
use crate::handlers::today;
use crate::middleware::{Operator, ValidatedJson};
use crate::models::PaymentDraft;
use crate::services::metrics;
use crate::services::totals::FeeTotals;
use crate::services::{CollectFeeRequest, CollectionSession, FeeApiError, RevertPaymentRequest};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use desk_core::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    #[serde(default)]
    pub draft: PaymentDraft,
    #[serde(default)]
    pub selected_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: BTreeMap<&'static str, String>,
    pub discount_amount: Decimal,
    pub selected_totals: FeeTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionReceipt {
    pub fee_id: String,
    pub amount: Decimal,
    pub receipt_no: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse {
    pub receipts: Vec<CollectionReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<FailedAllocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_sent: Vec<PendingAllocation>,
    /// Absent when the refresh after a committed collection failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<FeeSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedAllocation {
    pub fee_id: String,
    pub amount: Decimal,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAllocation {
    pub fee_id: String,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RevertRequest {
    #[validate(length(min = 1, message = "Fee id is required"))]
    pub fee_id: String,
    #[validate(length(min = 1, message = "Receipt number is required"))]
    pub receipt_no: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertResponse {
    pub receipt_no: String,
    pub message: Option<String>,
    pub summary: FeeSummary,
}

async fn open_session(
    state: &AppState,
    student_id: &str,
    operator: &Operator,
    request: CollectionRequest,
) -> Result<CollectionSession, AppError> {
    let token = operator.token.as_deref();
    let groups = load_groups(state, student_id, token).await?;

    let catalogue = match request.draft.discount_code() {
        Some(_) => state.fees.discounts(token).await?,
        None => Arc::new(Vec::new()),
    };

    let mut draft = request.draft;
    if draft.collected_by.is_none() {
        draft.collected_by = operator.collected_by().map(str::to_string);
    }

    Ok(
        CollectionSession::open(student_id, operator.role, groups, state.rules)
            .select(request.selected_ids)
            .with_draft(|_| draft)
            .apply_discount(&catalogue),
    )
}

#[tracing::instrument(skip(state, operator, request))]
pub async fn validate_collection(
    State(state): State<AppState>,
    operator: Operator,
    Path(student_id): Path<String>,
    Json(request): Json<CollectionRequest>,
) -> Result<Json<ValidationReport>, AppError> {
    let session = open_session(&state, &student_id, &operator, request).await?;
    let errors = session.errors();

    Ok(Json(ValidationReport {
        valid: errors.is_empty(),
        errors: errors.messages(),
        discount_amount: session.discount_amount(),
        selected_totals: session.selected_totals(),
    }))
}

/// Outcome of sending allocations in order. Sending stops at the first
/// rejected allocation; everything before it is committed upstream.
struct Forwarded {
    receipts: Vec<CollectionReceipt>,
    failure: Option<(usize, FeeApiError)>,
}

async fn forward_all(
    state: &AppState,
    requests: &[CollectFeeRequest],
    caller_token: Option<&str>,
) -> Forwarded {
    let mut receipts = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        match state.ledger().collect_fee(request, caller_token).await {
            Ok(ack) => receipts.push(CollectionReceipt {
                fee_id: request.fee_id.clone(),
                amount: request.amount,
                receipt_no: ack.receipt_no,
            }),
            Err(err) => {
                return Forwarded {
                    receipts,
                    failure: Some((index, err)),
                }
            }
        }
    }
    Forwarded {
        receipts,
        failure: None,
    }
}

#[tracing::instrument(skip(state, operator, request), fields(role = %operator.role.as_str()))]
pub async fn collect_fee(
    State(state): State<AppState>,
    operator: Operator,
    Path(student_id): Path<String>,
    Json(request): Json<CollectionRequest>,
) -> Result<(StatusCode, Json<CollectionResponse>), AppError> {
    let token = operator.token.as_deref();
    let session = open_session(&state, &student_id, &operator, request).await?;

    let requests = match session.submit(today()) {
        Ok(requests) => requests,
        Err(errors) => {
            metrics::record_collection(false);
            tracing::info!(errors = errors.len(), "Collection rejected by validation");
            return Err(ValidationErrors::from(errors).into());
        }
    };
    metrics::record_collection(true);

    // The ledger may have changed even when a later request fails.
    let Forwarded { receipts, failure } = forward_all(&state, &requests, token).await;
    state.fees.invalidate(&student_id);

    let (status, failed, not_sent) = match failure {
        None => (StatusCode::OK, None, Vec::new()),
        Some((_, err)) if receipts.is_empty() => return Err(err.into()),
        Some((index, err)) => {
            tracing::error!(
                committed = receipts.len(),
                fee_id = %requests[index].fee_id,
                error = %err,
                "Collection partially committed"
            );
            let failed = FailedAllocation {
                fee_id: requests[index].fee_id.clone(),
                amount: requests[index].amount,
                error: err.to_string(),
            };
            let not_sent = requests[index + 1..]
                .iter()
                .map(|r| PendingAllocation {
                    fee_id: r.fee_id.clone(),
                    amount: r.amount,
                })
                .collect();
            (StatusCode::MULTI_STATUS, Some(failed), not_sent)
        }
    };

    let summary = match load_groups(&state, &student_id, token).await {
        Ok(groups) => Some(summarize(&student_id, groups, Vec::new(), today())),
        Err(err) => {
            tracing::warn!(error = %err, "Fee refresh after collection failed");
            None
        }
    };

    Ok((
        status,
        Json(CollectionResponse {
            receipts,
            failed,
            not_sent,
            summary,
        }),
    ))
}

#[tracing::instrument(skip(state, operator, request))]
pub async fn revert_payment(
    State(state): State<AppState>,
    operator: Operator,
    Path(student_id): Path<String>,
    ValidatedJson(request): ValidatedJson<RevertRequest>,
) -> Result<Json<RevertResponse>, AppError> {
    let token = operator.token.as_deref();
    let revert = RevertPaymentRequest {
        fee_id: request.fee_id,
        receipt_no: request.receipt_no,
    };

    let ack = state.ledger().revert_payment(&revert, token).await;
    state.fees.invalidate(&student_id);
    let ack = ack?;
    metrics::record_revert();

    let groups = load_groups(&state, &student_id, token).await?;
    Ok(Json(RevertResponse {
        receipt_no: revert.receipt_no,
        message: ack.message,
        summary: summarize(&student_id, groups, Vec::new(), today()),
    }))
}
