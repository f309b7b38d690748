use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use super::domain::{ApplicantDraft, ApplicantId, ApplicantRecord};
use super::repository::{ApplicantRepository, RepositoryError};

/// Process-local store for tests and `serve --in-memory`.
///
/// Identifiers are real object ids so responses look the same as with MongoDB.
#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicantRepository {
    records: Arc<Mutex<Vec<ApplicantRecord>>>,
}

impl InMemoryApplicantRepository {
    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Records are pushed whole, so a poisoned lock never guards a torn vector.
    fn records(&self) -> MutexGuard<'_, Vec<ApplicantRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ApplicantRepository for InMemoryApplicantRepository {
    async fn insert(&self, draft: ApplicantDraft) -> Result<ApplicantRecord, RepositoryError> {
        let id = ApplicantId(ObjectId::new().to_hex());
        let record = ApplicantRecord::from_draft(id, draft);
        self.records().push(record.clone());
        Ok(record)
    }

    async fn list_newest_first(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        // Reverse first so equal timestamps keep last-inserted-first under the stable sort.
        let mut records: Vec<_> = self.records().iter().rev().cloned().collect();
        records.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(records)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applicants::validation::validate_applicant;
    use serde_json::json;

    fn draft(name: &str) -> ApplicantDraft {
        validate_applicant(json!({
            "name": name, "age": 30, "address": "1 St", "city": "X", "state": "Y",
            "zip": "00000", "phone": "555", "email": "a@b.com",
            "number1": 1, "number2": 2, "number3": 3, "number4": 4,
        }))
        .expect("valid draft")
    }

    #[tokio::test]
    async fn store_keeps_working_after_a_panicking_holder() {
        let repository = InMemoryApplicantRepository::default();
        repository.insert(draft("before")).await.expect("insert");

        let holder = repository.clone();
        let outcome = std::thread::spawn(move || {
            let _guard = holder.records.lock().expect("first lock");
            panic!("holder panics while the lock is held");
        })
        .join();
        assert!(outcome.is_err());
        assert!(repository.records.is_poisoned());

        repository.insert(draft("after")).await.expect("insert after poison");
        assert_eq!(repository.len(), 2);
        let listed = repository.list_newest_first().await.expect("list after poison");
        assert_eq!(listed.len(), 2);
    }
}
