use crate::config::Settings;
use crate::handlers::{
    app::health_check,
    collection::{collect_fee, revert_payment, validate_collection},
    discounts::{list_discounts, quote_discount},
    fees::{fee_summary, pending_fees},
    metrics::metrics,
};
use crate::services::FeeApiClient;
use crate::AppState;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use desk_core::error::AppError;
use desk_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/fee-discounts", get(list_discounts))
        .route("/fee-discounts/quote", post(quote_discount))
        .route("/students/:student_id/fees", get(fee_summary))
        .route("/students/:student_id/fees/pending", get(pending_fees))
        .route(
            "/students/:student_id/fees/validate",
            post(validate_collection),
        )
        .route("/students/:student_id/fees/collect", post(collect_fee))
        .route("/students/:student_id/fees/revert", post(revert_payment))
        .layer(CorsLayer::permissive())
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    role = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let client = FeeApiClient::new(settings.fee_api.clone());
        tracing::info!(base_url = %client.base_url(), "Fee API client configured");

        let state = AppState::new(
            Arc::new(client),
            settings.collection.rules(),
            Duration::from_secs(settings.collection.cache_ttl_seconds),
        );

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!("Starting fee-desk on port {}", self.port);
        axum::serve(self.listener, self.router).await
    }
}
