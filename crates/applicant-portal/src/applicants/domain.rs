use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Store-assigned identifier key, as exposed over the wire.
pub const ID_FIELD: &str = "_id";
/// Creation timestamp key.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Document version key. Records are never updated so it is always zero.
pub const VERSION_FIELD: &str = "__v";

/// Identifier assigned by the store (24 hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ApplicantId(pub String);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A submission that passed validation and awaits an identifier from the store.
///
/// `fields` carries every submitted key except the reserved ones, extra keys
/// included, with integer fields normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantDraft {
    pub created_at: DateTime<Utc>,
    pub fields: Map<String, Value>,
}

/// A persisted applicant. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRecord {
    pub id: ApplicantId,
    pub created_at: DateTime<Utc>,
    pub fields: Map<String, Value>,
}

impl ApplicantRecord {
    pub fn from_draft(id: ApplicantId, draft: ApplicantDraft) -> Self {
        Self {
            id,
            created_at: draft.created_at,
            fields: draft.fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl Serialize for ApplicantRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 3))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(CREATED_AT_FIELD, &format_timestamp(self.created_at))?;
        map.serialize_entry(VERSION_FIELD, &0)?;
        map.end()
    }
}

/// ISO 8601 in UTC with millisecond precision, e.g. `2025-01-02T03:04:05.678Z`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Drops sub-millisecond precision, which the store does not keep.
pub fn truncate_to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or(value)
}

pub fn now_millis() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}
