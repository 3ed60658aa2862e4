use crate::middleware::Operator;
use crate::models::wire::input_amount;
use crate::models::DiscountRule;
use crate::services::discount::{compute_discount_with_mode, find_rule};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use desk_core::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountQuoteRequest {
    #[serde(default)]
    pub discount_code: Option<String>,
    #[serde(default, deserialize_with = "input_amount")]
    pub base_amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountQuote {
    pub discount_code: Option<String>,
    pub discount_amount: Decimal,
    /// False when a code was given but matches no rule.
    pub matched: bool,
}

pub async fn list_discounts(
    State(state): State<AppState>,
    operator: Operator,
) -> Result<Json<Vec<DiscountRule>>, AppError> {
    let rules = state.fees.discounts(operator.token.as_deref()).await?;
    Ok(Json(rules.as_ref().clone()))
}

pub async fn quote_discount(
    State(state): State<AppState>,
    operator: Operator,
    Json(request): Json<DiscountQuoteRequest>,
) -> Result<Json<DiscountQuote>, AppError> {
    let code = request
        .discount_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let Some(code) = code else {
        return Ok(Json(DiscountQuote {
            discount_code: None,
            discount_amount: Decimal::ZERO,
            matched: true,
        }));
    };

    let rules = state.fees.discounts(operator.token.as_deref()).await?;
    let rule = find_rule(&rules, Some(code));
    let discount_amount =
        compute_discount_with_mode(rule, request.base_amount, state.rules.discount_mode);

    Ok(Json(DiscountQuote {
        discount_code: Some(code.to_string()),
        discount_amount,
        matched: rule.is_some(),
    }))
}
