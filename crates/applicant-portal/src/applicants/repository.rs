use async_trait::async_trait;

use super::domain::{ApplicantDraft, ApplicantRecord};

/// Storage abstraction so the service and routes can run without a database.
#[async_trait]
pub trait ApplicantRepository: Send + Sync {
    /// Persist a validated draft, assigning its identifier.
    async fn insert(&self, draft: ApplicantDraft) -> Result<ApplicantRecord, RepositoryError>;
    /// Every stored applicant, most recent `createdAt` first.
    async fn list_newest_first(&self) -> Result<Vec<ApplicantRecord>, RepositoryError>;
    /// Round-trip to the store without touching data.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage misconfigured: {0}")]
    Configuration(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored document is malformed: {0}")]
    Malformed(String),
    #[error("store rejected the document: {0}")]
    Rejected(String),
}
