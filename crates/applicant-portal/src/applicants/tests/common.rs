use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::applicants::domain::{ApplicantDraft, ApplicantRecord};
use crate::applicants::memory::InMemoryApplicantRepository;
use crate::applicants::repository::{ApplicantRepository, RepositoryError};
use crate::applicants::{applicant_router, ApplicantService, APPLICANTS_PATH};

/// The sample body used throughout the API documentation.
pub(super) fn payload() -> Value {
    json!({
        "name": "A",
        "age": 30,
        "address": "1 St",
        "city": "X",
        "state": "Y",
        "zip": "00000",
        "phone": "555",
        "email": "a@b.com",
        "number1": 1,
        "number2": 2,
        "number3": 3,
        "number4": 4,
    })
}

pub(super) fn payload_with(key: &str, value: Value) -> Value {
    let mut body = payload();
    body[key] = value;
    body
}

pub(super) fn payload_without(key: &str) -> Value {
    let mut body = payload();
    body.as_object_mut()
        .expect("sample payload is an object")
        .remove(key);
    body
}

pub(super) fn build_service() -> (
    ApplicantService<InMemoryApplicantRepository>,
    InMemoryApplicantRepository,
) {
    let repository = InMemoryApplicantRepository::default();
    let service = ApplicantService::new(Arc::new(repository.clone()));
    (service, repository)
}

pub(super) fn router_with_memory() -> (axum::Router, InMemoryApplicantRepository) {
    let (service, repository) = build_service();
    (applicant_router(Arc::new(service)), repository)
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl ApplicantRepository for UnavailableRepository {
    async fn insert(&self, _draft: ApplicantDraft) -> Result<ApplicantRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn list_newest_first(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Accepts nothing; every insert fails the way MongoDB refuses a bad document.
pub(super) struct RejectingRepository;

#[async_trait]
impl ApplicantRepository for RejectingRepository {
    async fn insert(&self, _draft: ApplicantDraft) -> Result<ApplicantRecord, RepositoryError> {
        Err(RepositoryError::Rejected("document too large".to_string()))
    }

    async fn list_newest_first(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

pub(super) async fn post_json(router: axum::Router, body: String) -> Response {
    post_with_content_type(router, Some("application/json"), body).await
}

pub(super) async fn post_with_content_type(
    router: axum::Router,
    content_type: Option<&str>,
    body: String,
) -> Response {
    let mut request = Request::post(APPLICANTS_PATH);
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    router
        .oneshot(request.body(Body::from(body)).expect("request builds"))
        .await
        .expect("route executes")
}

pub(super) async fn get_list(router: axum::Router) -> Response {
    router
        .oneshot(
            Request::get(APPLICANTS_PATH)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
