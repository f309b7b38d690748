//! Applicant intake and review.
//!
//! Submissions are checked by [`validation::validate_applicant`] and handed to an
//! [`ApplicantRepository`]; MongoDB backs production and an in-memory store backs
//! tests and local demos.

pub mod domain;
pub mod memory;
pub mod mongo;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{ApplicantDraft, ApplicantId, ApplicantRecord};
pub use memory::InMemoryApplicantRepository;
pub use mongo::MongoApplicantRepository;
pub use repository::{ApplicantRepository, RepositoryError};
pub use router::{applicant_router, APPLICANTS_PATH};
pub use service::{ApplicantService, ApplicantServiceError};
pub use validation::{validate_applicant, FieldError, FieldKind, ValidationError, APPLICANT_FIELDS};
