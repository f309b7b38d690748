use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use super::domain::ApplicantRecord;
use super::repository::{ApplicantRepository, RepositoryError};
use super::validation::{validate_applicant, ValidationError};

/// Service composing schema validation with the injected repository.
pub struct ApplicantService<R> {
    repository: Arc<R>,
}

impl<R> ApplicantService<R>
where
    R: ApplicantRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate and persist a submission, returning the stored record.
    pub async fn submit(&self, payload: Value) -> Result<ApplicantRecord, ApplicantServiceError> {
        let draft = match validate_applicant(payload) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(
                    field_errors = err.field_errors().len(),
                    "applicant submission rejected"
                );
                return Err(err.into());
            }
        };

        let record = self.repository.insert(draft).await.map_err(|err| {
            error!(error = %err, "failed to persist applicant");
            err
        })?;

        info!(applicant_id = %record.id, "applicant submitted");
        Ok(record)
    }

    /// All applicants, newest first.
    pub async fn list(&self) -> Result<Vec<ApplicantRecord>, ApplicantServiceError> {
        let records = self.repository.list_newest_first().await.map_err(|err| {
            error!(error = %err, "failed to list applicants");
            err
        })?;
        Ok(records)
    }
}

/// Error raised by the applicant service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicantServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
