use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::warn;

use super::domain::ApplicantRecord;
use super::repository::ApplicantRepository;
use super::service::ApplicantService;
use crate::error::AppError;

pub const APPLICANTS_PATH: &str = "/api/applicants";

/// Router builder exposing the applicant intake and review endpoints.
pub fn applicant_router<R>(service: Arc<ApplicantService<R>>) -> Router
where
    R: ApplicantRepository + 'static,
{
    Router::new()
        .route(
            APPLICANTS_PATH,
            get(list_handler::<R>).post(submit_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApplicantRecord>), AppError>
where
    R: ApplicantRepository + 'static,
{
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "unreadable applicant payload");
        AppError::from(rejection)
    })?;

    let record = service.submit(payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
) -> Result<Json<Vec<ApplicantRecord>>, AppError>
where
    R: ApplicantRepository + 'static,
{
    let records = service.list().await?;
    Ok(Json(records))
}
