//! Explicit schema check for applicant submissions.
//!
//! Mirrors the document-store schema: twelve required fields, a defaulted
//! `createdAt`, and any other storable keys passed through untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::domain::{
    now_millis, truncate_to_millis, ApplicantDraft, CREATED_AT_FIELD, ID_FIELD, VERSION_FIELD,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl FieldKind {
    const fn label(self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Integer => "an integer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Text,
    }
}

const fn integer(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Integer,
    }
}

/// Required applicant fields in declaration order.
pub const APPLICANT_FIELDS: [FieldSpec; 12] = [
    text("name"),
    integer("age"),
    text("address"),
    text("city"),
    text("state"),
    text("zip"),
    text("phone"),
    text("email"),
    integer("number1"),
    integer("number2"),
    integer("number3"),
    integer("number4"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Applicant validation failed: request body must be a JSON object")]
    NotAnObject,
    #[error("Applicant validation failed: {}", summarize(.0))]
    Fields(Vec<FieldError>),
}

impl ValidationError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::NotAnObject => &[],
            ValidationError::Fields(errors) => errors,
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check a submitted body and turn it into a storable draft.
///
/// Every field is checked before failing so callers see all problems at once.
pub fn validate_applicant(payload: Value) -> Result<ApplicantDraft, ValidationError> {
    let Value::Object(mut fields) = payload else {
        return Err(ValidationError::NotAnObject);
    };

    fields.remove(ID_FIELD);
    fields.remove(VERSION_FIELD);

    let mut errors = Vec::new();
    for spec in APPLICANT_FIELDS {
        match check_field(spec, fields.get(spec.name)) {
            Ok(Some(normalized)) => {
                fields.insert(spec.name.to_string(), normalized);
            }
            Ok(None) => {}
            Err(message) => errors.push(FieldError {
                field: spec.name.to_string(),
                message,
            }),
        }
    }
    errors.extend(unstorable_keys(&fields));

    let created_at = match take_created_at(&mut fields) {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(FieldError {
                field: CREATED_AT_FIELD.to_string(),
                message,
            });
            None
        }
    };

    match created_at {
        Some(created_at) if errors.is_empty() => Ok(ApplicantDraft { created_at, fields }),
        _ => Err(ValidationError::Fields(errors)),
    }
}

/// `Ok(Some(_))` carries a normalized replacement value.
///
/// Scalars are cast the way the document schema casts them: numeric strings
/// become integers, and numbers or booleans become text.
fn check_field(spec: FieldSpec, value: Option<&Value>) -> Result<Option<Value>, String> {
    let value = match value {
        None | Some(Value::Null) => return Err(required(spec.name)),
        Some(value) => value,
    };

    match (spec.kind, value) {
        (FieldKind::Text, Value::String(raw)) if raw.is_empty() => Err(required(spec.name)),
        (FieldKind::Text, Value::String(_)) => Ok(None),
        (FieldKind::Text, Value::Number(_) | Value::Bool(_)) => {
            Ok(Some(Value::String(value.to_string())))
        }
        (FieldKind::Integer, Value::Number(number)) if number.is_i64() => Ok(None),
        (FieldKind::Integer, Value::Number(number)) => integral(number)
            .map(|int| Some(Value::from(int)))
            .ok_or_else(|| {
                format!(
                    "Path `{}` must be {}, got {number}.",
                    spec.name,
                    spec.kind.label()
                )
            }),
        (FieldKind::Integer, Value::String(raw)) if raw.trim().is_empty() => {
            Err(required(spec.name))
        }
        (FieldKind::Integer, Value::String(raw)) => parse_integer(raw.trim())
            .map(|int| Some(Value::from(int)))
            .ok_or_else(|| mismatch(spec, value)),
        _ => Err(mismatch(spec, value)),
    }
}

fn integral(number: &Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|float| {
                float.fract() == 0.0 && *float >= i64::MIN as f64 && *float < i64::MAX as f64
            })
            .map(|float| float as i64)
    })
}

fn parse_integer(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .and_then(|number| integral(&number))
    })
}

/// BSON keys are NUL-terminated and top-level `$` keys are operators, so
/// neither can be persisted as a field name.
fn unstorable_keys(fields: &Map<String, Value>) -> Vec<FieldError> {
    fields
        .iter()
        .filter(|(key, value)| {
            key.starts_with('$') || key.contains('\0') || has_nul_key(value)
        })
        .map(|(key, _)| FieldError {
            field: key.clone(),
            message: format!("Path `{key}` is not a storable field name."),
        })
        .collect()
}

fn has_nul_key(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(key, nested)| key.contains('\0') || has_nul_key(nested)),
        Value::Array(items) => items.iter().any(has_nul_key),
        _ => false,
    }
}

fn take_created_at(fields: &mut Map<String, Value>) -> Result<DateTime<Utc>, String> {
    match fields.remove(CREATED_AT_FIELD) {
        None | Some(Value::Null) => Ok(now_millis()),
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| truncate_to_millis(parsed.with_timezone(&Utc)))
            .map_err(|_| {
                format!("Path `{CREATED_AT_FIELD}` must be an RFC 3339 timestamp, got \"{raw}\".")
            }),
        Some(other) => Err(format!(
            "Path `{CREATED_AT_FIELD}` must be an RFC 3339 timestamp, got {}.",
            json_type(&other)
        )),
    }
}

fn mismatch(spec: FieldSpec, value: &Value) -> String {
    format!(
        "Path `{}` must be {}, got {}.",
        spec.name,
        spec.kind.label(),
        json_type(value)
    )
}

fn required(field: &str) -> String {
    format!("Path `{field}` is required.")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
