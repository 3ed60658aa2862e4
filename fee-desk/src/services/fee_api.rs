//! Client for the remote fee API.
//!
//! The API owns the fee ledger: this client only reads fee records and the
//! discount catalogue, and forwards collect / revert commands. Every response
//! is wrapped in `{ success, data, message }`.

use crate::config::FeeApiSettings;
use crate::models::{DiscountRule, FeeRecord};
use crate::services::metrics;
use crate::services::submission::CollectFeeRequest;
use async_trait::async_trait;
use desk_core::error::AppError;
use desk_core::observability::{TracedClientExt, TracedRequest};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FeeApiError {
    #[error("fee API unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("fee API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("fee API rejected the request: {0}")]
    Rejected(String),

    #[error("invalid fee API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<FeeApiError> for AppError {
    fn from(err: FeeApiError) -> Self {
        match err {
            FeeApiError::Transport(e) => {
                tracing::error!(error = %e, "Fee API unreachable");
                AppError::ServiceUnavailable
            }
            FeeApiError::Upstream { status, message } => match status {
                400 | 422 => AppError::BadRequest(anyhow::anyhow!(message)),
                401 => AppError::Unauthorized(anyhow::anyhow!(message)),
                403 => AppError::Forbidden(anyhow::anyhow!(message)),
                404 => AppError::NotFound(anyhow::anyhow!(message)),
                409 => AppError::Conflict(anyhow::anyhow!(message)),
                _ => AppError::BadGateway(format!("{} {}", status, message)),
            },
            FeeApiError::Rejected(message) => AppError::BadRequest(anyhow::anyhow!(message)),
            FeeApiError::Decode(e) => AppError::BadGateway(e.to_string()),
        }
    }
}

/// Body of `POST /fees/revert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertPaymentRequest {
    pub fee_id: String,
    pub receipt_no: String,
}

/// What the API reports back for an accepted collect or revert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAck {
    pub receipt_no: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// Read and write access to the fee ledger.
///
/// `caller_token` is the operator's bearer token; when absent the client
/// falls back to its configured service token.
#[async_trait]
pub trait FeeLedger: Send + Sync {
    async fn student_fees(
        &self,
        student_id: &str,
        caller_token: Option<&str>,
    ) -> Result<Vec<FeeRecord>, FeeApiError>;

    async fn fee_discounts(&self, caller_token: Option<&str>)
        -> Result<Vec<DiscountRule>, FeeApiError>;

    async fn collect_fee(
        &self,
        request: &CollectFeeRequest,
        caller_token: Option<&str>,
    ) -> Result<LedgerAck, FeeApiError>;

    async fn revert_payment(
        &self,
        request: &RevertPaymentRequest,
        caller_token: Option<&str>,
    ) -> Result<LedgerAck, FeeApiError>;
}

#[derive(Clone)]
pub struct FeeApiClient {
    client: Client,
    settings: FeeApiSettings,
}

impl FeeApiClient {
    pub fn new(settings: FeeApiSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn prepare(&self, request: TracedRequest, caller_token: Option<&str>) -> TracedRequest {
        let request = request.timeout(Duration::from_secs(self.settings.timeout_seconds));

        let service_token = self
            .settings
            .api_token
            .as_ref()
            .map(|t| t.expose_secret().as_str());

        match caller_token.or(service_token) {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        caller_token: Option<&str>,
    ) -> Result<ApiEnvelope<T>, FeeApiError> {
        let url = self.url(path);
        let request = self.prepare(self.client.traced_get(&url), caller_token);
        let result = match request.send().await {
            Ok(response) => read_envelope(response).await,
            Err(e) => Err(e.into()),
        };
        metrics::record_fee_api_call(endpoint, result.is_ok());
        result
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        body: &B,
        caller_token: Option<&str>,
    ) -> Result<ApiEnvelope<T>, FeeApiError> {
        let url = self.url(path);
        let request = self.prepare(self.client.traced_post(&url).json(body), caller_token);
        let result = match request.send().await {
            Ok(response) => read_envelope(response).await,
            Err(e) => Err(e.into()),
        };
        metrics::record_fee_api_call(endpoint, result.is_ok());
        result
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<ApiEnvelope<T>, FeeApiError> {
    let status = response.status();
    let body = response.text().await?;

    tracing::debug!(status = %status, body_len = body.len(), "Fee API response");

    if !status.is_success() {
        return Err(FeeApiError::Upstream {
            status: status.as_u16(),
            message: upstream_message(status, &body),
        });
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
    if !envelope.success {
        let message = envelope
            .message
            .unwrap_or_else(|| "request was not successful".to_string());
        tracing::warn!(message = %message, "Fee API reported failure");
        return Err(FeeApiError::Rejected(message));
    }

    Ok(envelope)
}

/// Best-effort message from an error body: the envelope's `message`, else
/// the raw body, else the status text.
fn upstream_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string())
}

fn ack(envelope: ApiEnvelope<serde_json::Value>) -> LedgerAck {
    let receipt_no = envelope
        .data
        .as_ref()
        .and_then(|d| d.get("receiptNo"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    LedgerAck {
        receipt_no,
        message: envelope.message,
    }
}

#[async_trait]
impl FeeLedger for FeeApiClient {
    async fn student_fees(
        &self,
        student_id: &str,
        caller_token: Option<&str>,
    ) -> Result<Vec<FeeRecord>, FeeApiError> {
        let path = format!("/students/{}/fees", urlencoding::encode(student_id));
        let envelope = self
            .get::<Vec<FeeRecord>>("student_fees", &path, caller_token)
            .await?;

        let records = envelope.data.unwrap_or_default();
        tracing::debug!(student_id = %student_id, records = records.len(), "Fetched fee records");
        Ok(records)
    }

    async fn fee_discounts(
        &self,
        caller_token: Option<&str>,
    ) -> Result<Vec<DiscountRule>, FeeApiError> {
        let envelope = self
            .get::<Vec<DiscountRule>>("fee_discounts", "/fee-discounts", caller_token)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn collect_fee(
        &self,
        request: &CollectFeeRequest,
        caller_token: Option<&str>,
    ) -> Result<LedgerAck, FeeApiError> {
        let envelope = self
            .post::<_, serde_json::Value>("collect_fee", "/fees/collect", request, caller_token)
            .await?;

        let ack = ack(envelope);
        tracing::info!(
            fee_id = %request.fee_id,
            amount = %request.amount,
            receipt_no = ?ack.receipt_no,
            "Fee collected"
        );
        Ok(ack)
    }

    async fn revert_payment(
        &self,
        request: &RevertPaymentRequest,
        caller_token: Option<&str>,
    ) -> Result<LedgerAck, FeeApiError> {
        let envelope = self
            .post::<_, serde_json::Value>("revert_payment", "/fees/revert", request, caller_token)
            .await?;

        tracing::info!(
            fee_id = %request.fee_id,
            receipt_no = %request.receipt_no,
            "Payment reverted"
        );
        Ok(ack(envelope))
    }
}
