//! Tests for workbook snapshots
//!
//! These tests verify:
//! - Save/load keeps every sheet, cell and presentation setting
//! - Corruption is detected (magic, version, length, checksum)
//! - Missing snapshots open as an empty workbook

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use gridstore::sheet::{read_snapshot, write_snapshot, WorkbookData};
use gridstore::{
    CellValue, Engine, FieldMap, GridError, ManualClock, MemoryWorkbook, Config, Sheet,
    StaticIdentity, Workbook,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn populated_workbook() -> MemoryWorkbook {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    ));
    let engine = Engine::new(
        Config::default(),
        Arc::new(StaticIdentity::new("alice")),
        clock,
    );
    let workbook = MemoryWorkbook::new();
    engine
        .create_collection(&workbook, "Customers", &["name".to_string()])
        .unwrap();
    let sheet = workbook.sheet("Customers").unwrap();

    let rows: Vec<FieldMap> = (0..20)
        .map(|i| {
            let mut fields = FieldMap::new();
            fields.insert("name".to_string(), CellValue::from(format!("c{}", i)));
            fields.insert("score".to_string(), CellValue::from(i as f64 / 4.0));
            fields
        })
        .collect();
    engine.create(sheet.as_ref(), rows).unwrap();

    workbook.insert_sheet("Empty").unwrap();
    workbook
}

fn corrupt(path: &Path, offset: usize) {
    let mut bytes = fs::read(path).unwrap();
    bytes[offset] ^= 0xFF;
    fs::write(path, bytes).unwrap();
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_save_and_load_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.snap");
    let workbook = populated_workbook();

    workbook.save(&path).unwrap();
    let loaded = MemoryWorkbook::load(&path).unwrap();

    assert_eq!(loaded.to_data(), workbook.to_data());
    assert_eq!(loaded.sheet_names(), vec!["Customers", "Empty"]);

    let customers = loaded.memory_sheet("Customers").unwrap();
    assert_eq!(customers.row_count().unwrap(), 21);
    assert_eq!(customers.frozen_rows(), 1);
    assert!(customers.header_bold());
}

#[test]
fn test_save_replaces_previous_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.snap");

    populated_workbook().save(&path).unwrap();
    MemoryWorkbook::new().save(&path).unwrap();

    let loaded = read_snapshot(&path).unwrap();
    assert_eq!(loaded, WorkbookData::default());
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("store.snap");

    write_snapshot(&path, &WorkbookData::default()).unwrap();

    assert!(path.exists());
}

#[test]
fn test_open_or_new_without_file() {
    let dir = TempDir::new().unwrap();

    let workbook = MemoryWorkbook::open_or_new(&dir.path().join("missing.snap")).unwrap();

    assert!(workbook.sheet_names().is_empty());
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();

    let result = MemoryWorkbook::load(&dir.path().join("missing.snap"));

    assert!(matches!(result, Err(GridError::Io(_))));
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_detects_bad_magic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.snap");
    populated_workbook().save(&path).unwrap();

    corrupt(&path, 0);

    assert!(matches!(
        read_snapshot(&path),
        Err(GridError::SnapshotCorruption(_))
    ));
}

#[test]
fn test_detects_unknown_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.snap");
    populated_workbook().save(&path).unwrap();

    corrupt(&path, 4);

    assert!(matches!(
        read_snapshot(&path),
        Err(GridError::SnapshotCorruption(_))
    ));
}

#[test]
fn test_detects_flipped_payload_byte() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.snap");
    populated_workbook().save(&path).unwrap();
    let len = fs::metadata(&path).unwrap().len() as usize;

    corrupt(&path, len / 2);

    match read_snapshot(&path) {
        Err(GridError::SnapshotCorruption(message)) => assert!(message.contains("checksum")),
        other => panic!("expected checksum failure, got {:?}", other),
    }
}

#[test]
fn test_detects_truncation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.snap");
    populated_workbook().save(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();
    assert!(matches!(
        read_snapshot(&path),
        Err(GridError::SnapshotCorruption(_))
    ));

    fs::write(&path, &bytes[..8]).unwrap();
    assert!(matches!(
        read_snapshot(&path),
        Err(GridError::SnapshotCorruption(_))
    ));
}
