use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use makan_index::analysis::analysis_router;
use makan_index::auth::{admin_router, AdminSessions};
use makan_index::config::GeminiConfig;
use makan_index::geo::geo_router;
use makan_index::vendors::{vendor_router, VendorRepository, VendorService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_directory_routes<R>(
    service: Arc<VendorService<R>>,
    sessions: Arc<AdminSessions>,
    gemini: GeminiConfig,
) -> axum::Router
where
    R: VendorRepository + 'static,
{
    vendor_router(service, sessions.clone())
        .merge(admin_router(sessions))
        .merge(analysis_router(gemini))
        .merge(geo_router())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
