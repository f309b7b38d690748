use super::common::*;
use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::applicants::validation::{validate_applicant, ValidationError, APPLICANT_FIELDS};

#[test]
fn accepts_complete_payload() {
    let draft = validate_applicant(payload()).expect("sample payload is valid");

    assert_eq!(draft.fields.get("name"), Some(&json!("A")));
    assert_eq!(draft.fields.get("number4"), Some(&json!(4)));
    assert!(!draft.fields.contains_key("createdAt"));
    assert!(draft.created_at <= Utc::now());
}

#[test]
fn every_declared_field_is_required() {
    for spec in APPLICANT_FIELDS {
        match validate_applicant(payload_without(spec.name)) {
            Err(ValidationError::Fields(errors)) => {
                assert_eq!(errors.len(), 1, "only {} should fail", spec.name);
                assert_eq!(errors[0].field, spec.name);
                assert_eq!(
                    errors[0].message,
                    format!("Path `{}` is required.", spec.name)
                );
            }
            other => panic!("missing {} should fail, got {other:?}", spec.name),
        }
    }
}

#[test]
fn null_and_empty_text_count_as_missing() {
    let err = validate_applicant(payload_with("city", json!(""))).expect_err("empty city");
    assert_eq!(err.field_errors()[0].message, "Path `city` is required.");

    let err = validate_applicant(payload_with("age", json!(null))).expect_err("null age");
    assert_eq!(err.field_errors()[0].message, "Path `age` is required.");
}

#[test]
fn reports_all_type_mismatches_in_declaration_order() {
    let mut body = payload_with("age", json!("thirty"));
    body["zip"] = json!(["55401"]);
    body["number2"] = json!(2.5);

    let err = validate_applicant(body).expect_err("three bad fields");
    let fields: Vec<_> = err
        .field_errors()
        .iter()
        .map(|error| error.field.as_str())
        .collect();
    assert_eq!(fields, ["age", "zip", "number2"]);
    assert_eq!(
        err.to_string(),
        "Applicant validation failed: age: Path `age` must be an integer, got string., \
         zip: Path `zip` must be a string, got array., \
         number2: Path `number2` must be an integer, got 2.5."
    );
}

#[test]
fn integral_floats_are_normalized() {
    let draft = validate_applicant(payload_with("age", json!(30.0))).expect("30.0 is an integer");
    assert_eq!(draft.fields.get("age"), Some(&json!(30)));
    assert!(draft.fields["age"].is_i64());
}

#[test]
fn compatible_scalars_are_cast_to_declared_types() {
    let mut body = payload_with("age", json!("30"));
    body["number1"] = json!(" 7 ");
    body["number2"] = json!("2.0");
    body["zip"] = json!(55401);
    body["phone"] = json!(5551234);
    body["email"] = json!(true);

    let draft = validate_applicant(body).expect("castable scalars are accepted");
    assert_eq!(draft.fields["age"], json!(30));
    assert_eq!(draft.fields["number1"], json!(7));
    assert_eq!(draft.fields["number2"], json!(2));
    assert_eq!(draft.fields["zip"], json!("55401"));
    assert_eq!(draft.fields["phone"], json!("5551234"));
    assert_eq!(draft.fields["email"], json!("true"));
}

#[test]
fn numeric_strings_must_still_be_integral() {
    let err = validate_applicant(payload_with("number3", json!("2.5"))).expect_err("fraction");
    assert_eq!(
        err.field_errors()[0].message,
        "Path `number3` must be an integer, got string."
    );

    let err = validate_applicant(payload_with("age", json!("  "))).expect_err("blank age");
    assert_eq!(err.field_errors()[0].message, "Path `age` is required.");
}

#[test]
fn unstorable_keys_are_rejected() {
    let mut body = payload_with("bad\u{0}key", json!(1));
    body["$where"] = json!("sleep(1000)");
    body["referral"] = json!({ "nested\u{0}key": [1] });
    body["price$"] = json!(10);

    let err = validate_applicant(body).expect_err("keys the store cannot encode");
    let mut fields: Vec<_> = err
        .field_errors()
        .iter()
        .map(|error| error.field.as_str())
        .collect();
    fields.sort_unstable();
    assert_eq!(fields, ["$where", "bad\u{0}key", "referral"]);
    let operator = err
        .field_errors()
        .iter()
        .find(|error| error.field == "$where")
        .expect("operator key reported");
    assert_eq!(operator.message, "Path `$where` is not a storable field name.");
}

#[test]
fn extra_fields_pass_through_and_reserved_keys_are_dropped() {
    let mut body = payload_with("referral", json!({ "source": "job fair" }));
    body["_id"] = json!("client-chosen");
    body["__v"] = json!(7);

    let draft = validate_applicant(body).expect("extras are permitted");
    assert_eq!(
        draft.fields.get("referral"),
        Some(&json!({ "source": "job fair" }))
    );
    assert!(!draft.fields.contains_key("_id"));
    assert!(!draft.fields.contains_key("__v"));
}

#[test]
fn supplied_created_at_is_kept_and_invalid_values_rejected() {
    let draft = validate_applicant(payload_with(
        "createdAt",
        json!("2024-06-01T12:30:00.123456+02:00"),
    ))
    .expect("rfc3339 timestamp accepted");
    let expected = Utc
        .with_ymd_and_hms(2024, 6, 1, 10, 30, 0)
        .single()
        .expect("valid")
        + chrono::Duration::milliseconds(123);
    assert_eq!(draft.created_at, expected);

    let err = validate_applicant(payload_with("createdAt", json!("yesterday")))
        .expect_err("not a timestamp");
    assert_eq!(err.field_errors()[0].field, "createdAt");
}

#[test]
fn rejects_non_object_bodies() {
    for body in [json!([payload()]), json!("A"), json!(null)] {
        let err = validate_applicant(body).expect_err("not an object");
        assert_eq!(err, ValidationError::NotAnObject);
        assert!(err.field_errors().is_empty());
    }
}
