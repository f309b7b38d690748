//! MongoDB-backed storage gateway.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use super::domain::{
    format_timestamp, ApplicantDraft, ApplicantId, ApplicantRecord, CREATED_AT_FIELD, ID_FIELD,
    VERSION_FIELD,
};
use super::repository::{ApplicantRepository, RepositoryError};
use crate::config::{StorageConfig, DEFAULT_DATABASE};

/// Applicant collection handle. The driver pools connections internally, so one
/// instance is shared by every request.
#[derive(Debug, Clone)]
pub struct MongoApplicantRepository {
    database: Database,
    collection: Collection<Document>,
}

impl MongoApplicantRepository {
    /// Build the client from the connection string.
    ///
    /// No network traffic happens here; the driver connects lazily, so use
    /// [`ApplicantRepository::ping`] to probe reachability.
    pub async fn connect(config: &StorageConfig) -> Result<Self, RepositoryError> {
        let mut options = ClientOptions::parse(config.uri.as_str())
            .await
            .map_err(|err| RepositoryError::Configuration(err.to_string()))?;
        options.server_selection_timeout = Some(config.server_selection_timeout);
        options
            .app_name
            .get_or_insert_with(|| "applicant-portal".to_string());

        let database_name = options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let client = Client::with_options(options)
            .map_err(|err| RepositoryError::Configuration(err.to_string()))?;

        info!(
            database = %database_name,
            collection = %config.collection,
            "storage gateway configured"
        );

        Ok(Self::from_database(
            client.database(&database_name),
            &config.collection,
        ))
    }

    pub fn from_database(database: Database, collection: &str) -> Self {
        let collection = database.collection::<Document>(collection);
        Self {
            database,
            collection,
        }
    }
}

#[async_trait]
impl ApplicantRepository for MongoApplicantRepository {
    async fn insert(&self, draft: ApplicantDraft) -> Result<ApplicantRecord, RepositoryError> {
        let object_id = ObjectId::new();
        let document = draft_to_document(object_id, &draft);
        ensure_encodable(&document)?;

        self.collection
            .insert_one(document)
            .await
            .map_err(insert_failure)?;
        debug!(applicant_id = %object_id, "applicant document inserted");

        Ok(ApplicantRecord::from_draft(
            ApplicantId(object_id.to_hex()),
            draft,
        ))
    }

    async fn list_newest_first(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(unavailable)?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(unavailable)?;

        documents.into_iter().map(document_to_record).collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

fn unavailable(err: mongodb::error::Error) -> RepositoryError {
    RepositoryError::Unavailable(err.to_string())
}

/// Document-level failures are the submission's fault; everything else is
/// treated as the store being unreachable.
fn insert_failure(err: mongodb::error::Error) -> RepositoryError {
    match &*err.kind {
        ErrorKind::BsonSerialization(_)
        | ErrorKind::InvalidArgument { .. }
        | ErrorKind::Write(WriteFailure::WriteError(_)) => {
            RepositoryError::Rejected(err.to_string())
        }
        _ => unavailable(err),
    }
}

pub(crate) fn ensure_encodable(document: &Document) -> Result<(), RepositoryError> {
    document
        .to_writer(Vec::<u8>::new())
        .map_err(|err| RepositoryError::Rejected(err.to_string()))
}

pub(crate) fn draft_to_document(object_id: ObjectId, draft: &ApplicantDraft) -> Document {
    let mut document = Document::new();
    document.insert(ID_FIELD, object_id);
    for (key, value) in &draft.fields {
        document.insert(key.as_str(), json_to_bson(value));
    }
    document.insert(
        CREATED_AT_FIELD,
        mongodb::bson::DateTime::from_millis(draft.created_at.timestamp_millis()),
    );
    document.insert(VERSION_FIELD, 0_i32);
    document
}

pub(crate) fn document_to_record(
    mut document: Document,
) -> Result<ApplicantRecord, RepositoryError> {
    let id = match document.remove(ID_FIELD) {
        Some(Bson::ObjectId(object_id)) => ApplicantId(object_id.to_hex()),
        Some(Bson::String(raw)) => ApplicantId(raw),
        Some(other) => {
            return Err(RepositoryError::Malformed(format!(
                "unexpected {ID_FIELD} type {:?}",
                other.element_type()
            )))
        }
        None => return Err(RepositoryError::Malformed(format!("missing {ID_FIELD}"))),
    };

    let created_at = match document.remove(CREATED_AT_FIELD) {
        Some(Bson::DateTime(stamp)) => {
            DateTime::<Utc>::from_timestamp_millis(stamp.timestamp_millis()).ok_or_else(|| {
                RepositoryError::Malformed(format!("{CREATED_AT_FIELD} out of range on {id}"))
            })?
        }
        _ => {
            return Err(RepositoryError::Malformed(format!(
                "missing or non-date {CREATED_AT_FIELD} on {id}"
            )))
        }
    };

    document.remove(VERSION_FIELD);
    let fields = document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect::<Map<String, Value>>();

    Ok(ApplicantRecord {
        id,
        created_at,
        fields,
    })
}

/// JSON integers that fit in 32 bits are stored as int32, matching what
/// other drivers write for small numbers.
fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(flag) => Bson::Boolean(*flag),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                i32::try_from(int)
                    .map(Bson::Int32)
                    .unwrap_or(Bson::Int64(int))
            } else {
                Bson::Double(number.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(text) => Bson::String(text.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.iter()
                .map(|(key, value)| (key.clone(), json_to_bson(value)))
                .collect(),
        ),
    }
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(flag) => Value::Bool(flag),
        Bson::Int32(int) => Value::from(int),
        Bson::Int64(int) => Value::from(int),
        Bson::Double(float) => Number::from_f64(float).map_or(Value::Null, Value::Number),
        Bson::String(text) => Value::String(text),
        Bson::ObjectId(object_id) => Value::String(object_id.to_hex()),
        Bson::DateTime(stamp) => DateTime::<Utc>::from_timestamp_millis(stamp.timestamp_millis())
            .map_or(Value::Null, |parsed| Value::String(format_timestamp(parsed))),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        other => other.into_relaxed_extjson(),
    }
}
