use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

pub async fn metrics() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        desk_core::observability::render_metrics(),
    )
}
