//! Tests for operation parsing, param decoding and response encoding
//!
//! These tests verify:
//! - Operation names round-trip and unknown names are rejected
//! - Positional params decode into typed commands
//! - Malformed params are InvalidInput
//! - Responses render as JSON keyed by header names

use chrono::{TimeZone, Utc};
use gridstore::protocol::{
    cell_value_from_json, cell_value_to_json, decode_params, field_map_from_json,
    record_to_json, values_from_json,
};
use gridstore::{CellValue, Command, GridError, Operation, Record, RecordMap, Response};
use serde_json::json;

// =============================================================================
// Operation Tests
// =============================================================================

#[test]
fn test_operation_names() {
    for operation in Operation::ALL {
        let parsed: Operation = operation.as_str().parse().unwrap();
        assert_eq!(parsed, operation);
        assert_eq!(operation.to_string(), operation.as_str());
    }

    assert_eq!("UNDO_DELETE".parse::<Operation>().unwrap(), Operation::UndoDelete);
}

#[test]
fn test_only_read_leaves_the_store_untouched() {
    let mutating: Vec<Operation> = Operation::ALL
        .into_iter()
        .filter(Operation::is_mutating)
        .collect();

    assert_eq!(mutating.len(), Operation::ALL.len() - 1);
    assert!(!mutating.contains(&Operation::Read));
    assert!(!Operation::Read.is_mutating());
}

#[test]
fn test_unknown_operation_name() {
    for name in ["DROP_SHEET", "create", " READ", ""] {
        match name.parse::<Operation>() {
            Err(GridError::UnknownOperation(got)) => assert_eq!(got, name),
            other => panic!("expected UnknownOperation for {:?}, got {:?}", name, other),
        }
    }
}

// =============================================================================
// Param Decoding Tests
// =============================================================================

#[test]
fn test_decode_create_sheet() {
    let command = decode_params(Operation::CreateSheet, &[json!(["a", "b"])]).unwrap();
    assert_eq!(
        command,
        Command::CreateSheet {
            extra_columns: vec!["a".to_string(), "b".to_string()]
        }
    );

    let bare = decode_params(Operation::CreateSheet, &[]).unwrap();
    assert_eq!(bare, Command::CreateSheet { extra_columns: vec![] });

    assert!(matches!(
        decode_params(Operation::CreateSheet, &[json!([1])]),
        Err(GridError::InvalidInput(_))
    ));
}

#[test]
fn test_decode_create_accepts_list_or_single_map() {
    let list = decode_params(Operation::Create, &[json!([{"a": 1}, {"b": "x"}])]).unwrap();
    let Command::Create { rows } = list else {
        panic!("expected Create");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["a"], CellValue::Number(1.0));

    let single = decode_params(Operation::Create, &[json!({"a": true})]).unwrap();
    assert_eq!(single.operation(), Operation::Create);

    assert!(matches!(
        decode_params(Operation::Create, &[]),
        Err(GridError::InvalidInput(_))
    ));
}

#[test]
fn test_decode_column_and_values() {
    let command =
        decode_params(Operation::Delete, &[json!("ID"), json!(["X_1", "X_2"])]).unwrap();
    assert_eq!(
        command,
        Command::Delete {
            column: "ID".to_string(),
            values: vec![CellValue::from("X_1"), CellValue::from("X_2")],
        }
    );

    let read_all = decode_params(Operation::Read, &[json!("Valid")]).unwrap();
    assert_eq!(
        read_all,
        Command::Read {
            column: "Valid".to_string(),
            values: vec![],
        }
    );

    let scalar = decode_params(Operation::UndoDelete, &[json!("ID"), json!("X_1")]).unwrap();
    assert_eq!(
        scalar,
        Command::UndoDelete {
            column: "ID".to_string(),
            values: vec![CellValue::from("X_1")],
        }
    );

    for params in [vec![], vec![json!("")], vec![json!(["ID"])]] {
        assert!(matches!(
            decode_params(Operation::Read, &params),
            Err(GridError::InvalidInput(_))
        ));
    }
}

#[test]
fn test_decode_update_requires_map() {
    let command = decode_params(Operation::Update, &[json!({"ID": "X_1", "n": 2})]).unwrap();
    let Command::Update { fields } = command else {
        panic!("expected Update");
    };
    assert_eq!(fields.len(), 2);

    assert!(matches!(
        decode_params(Operation::Update, &[json!([{"ID": "X_1"}])]),
        Err(GridError::InvalidInput(_))
    ));
}

#[test]
fn test_clean_sheet_ignores_params() {
    let command = decode_params(Operation::CleanSheet, &[json!("whatever")]).unwrap();
    assert_eq!(command, Command::CleanSheet);
}

// =============================================================================
// Value Conversion Tests
// =============================================================================

#[test]
fn test_cell_values_from_json() {
    assert_eq!(cell_value_from_json(&json!(null)).unwrap(), None);
    assert_eq!(
        cell_value_from_json(&json!("x")).unwrap(),
        Some(CellValue::from("x"))
    );
    assert_eq!(
        cell_value_from_json(&json!(2.5)).unwrap(),
        Some(CellValue::Number(2.5))
    );
    assert_eq!(
        cell_value_from_json(&json!(false)).unwrap(),
        Some(CellValue::Bool(false))
    );
    assert!(cell_value_from_json(&json!({"a": 1})).is_err());
    assert!(cell_value_from_json(&json!([1])).is_err());
}

#[test]
fn test_field_map_drops_nulls() {
    let fields = field_map_from_json(&json!({"a": null, "b": 1})).unwrap();

    assert_eq!(fields.len(), 1);
    assert!(fields.contains_key("b"));
    assert!(field_map_from_json(&json!("a")).is_err());
}

#[test]
fn test_values_from_json_skips_nulls() {
    let values = values_from_json(&json!(["a", null, 3])).unwrap();

    assert_eq!(values, vec![CellValue::from("a"), CellValue::Number(3.0)]);
    assert!(values_from_json(&json!(null)).unwrap().is_empty());
}

#[test]
fn test_cell_values_to_json() {
    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

    assert_eq!(cell_value_to_json(&CellValue::Number(3.0)), json!(3));
    assert_eq!(cell_value_to_json(&CellValue::Number(0.25)), json!(0.25));
    assert_eq!(cell_value_to_json(&CellValue::Bool(true)), json!(true));
    assert_eq!(
        cell_value_to_json(&CellValue::Timestamp(ts)),
        json!("2024-03-01T09:00:00+00:00")
    );
}

// =============================================================================
// Response Encoding Tests
// =============================================================================

fn sample_record() -> Record {
    let mut record = Record {
        id: Some("X_1".to_string()),
        created_by: Some("alice".to_string()),
        valid: Some(true),
        ..Record::default()
    };
    record.fields.insert("name".to_string(), CellValue::from("Acme"));
    record
}

#[test]
fn test_record_to_json_omits_absent_fields() {
    let json = record_to_json(&sample_record());

    assert_eq!(
        json,
        json!({"ID": "X_1", "CreatedBy": "alice", "Valid": true, "name": "Acme"})
    );
}

#[test]
fn test_response_shapes() {
    let mut records = RecordMap::new();
    records.insert("X_1".to_string(), sample_record());

    assert_eq!(
        Response::CollectionName("People".to_string()).to_json(),
        json!("People")
    );
    assert_eq!(Response::Removed(4).to_json(), json!(4));
    assert_eq!(
        Response::Records(records).to_json()["X_1"]["name"],
        json!("Acme")
    );
    assert_eq!(
        Response::List(vec![sample_record()]).to_json()[0]["ID"],
        json!("X_1")
    );
}
