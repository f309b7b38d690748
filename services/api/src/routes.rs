use crate::infra::AppState;
use applicant_portal::applicants::{applicant_router, ApplicantRepository, ApplicantService};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Assemble the full application around one shared repository.
pub(crate) fn build_app<R>(
    repository: Arc<R>,
    public_dir: &Path,
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
) -> Router
where
    R: ApplicantRepository + 'static,
{
    let state = AppState {
        readiness,
        storage: repository.clone(),
        metrics: Arc::new(metrics),
    };
    let service = Arc::new(ApplicantService::new(repository));

    with_service_routes(service, public_dir).layer(Extension(state))
}

pub(crate) fn with_service_routes<R>(service: Arc<ApplicantService<R>>, public_dir: &Path) -> Router
where
    R: ApplicantRepository + 'static,
{
    applicant_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if !state.readiness.load(Ordering::Relaxed) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        );
    }

    match state.storage.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "storage": "connected" })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "storage": "unreachable",
                "message": err.to_string(),
            })),
        ),
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
