//! Tests for MemorySheet and MemoryWorkbook

use std::sync::Arc;
use std::thread;

use gridstore::record::Row;
use gridstore::{CellValue, GridError, MemorySheet, MemoryWorkbook, Sheet, Workbook};

fn cell(value: &str) -> Option<CellValue> {
    Some(CellValue::from(value))
}

// =============================================================================
// Sheet Tests
// =============================================================================

#[test]
fn test_new_sheet_is_empty() {
    let sheet = MemorySheet::new("Things");

    assert_eq!(sheet.name(), "Things");
    assert_eq!(sheet.row_count().unwrap(), 0);
    assert_eq!(sheet.column_count().unwrap(), 0);
    assert!(sheet.read_rows().unwrap().is_empty());
}

#[test]
fn test_rows_are_padded_to_widest() {
    let sheet = MemorySheet::new("Things");
    sheet.append_row(vec![cell("a"), cell("b"), cell("c")]).unwrap();
    sheet.append_row(vec![cell("x")]).unwrap();

    let rows = sheet.read_rows().unwrap();

    assert_eq!(rows[1], vec![cell("x"), None, None]);
    assert_eq!(sheet.read_row(1).unwrap().len(), 3);
}

#[test]
fn test_append_returns_index() {
    let sheet = MemorySheet::new("Things");

    assert_eq!(sheet.append_row(vec![cell("h")]).unwrap(), 0);
    assert_eq!(sheet.append_row(vec![cell("r")]).unwrap(), 1);
}

#[test]
fn test_read_row_out_of_range() {
    let sheet = MemorySheet::new("Things");

    assert!(matches!(sheet.read_row(3), Err(GridError::Backend(_))));
}

#[test]
fn test_write_cell_grows_grid() {
    let sheet = MemorySheet::new("Things");
    sheet.append_row(vec![cell("h")]).unwrap();

    sheet.write_cell(0, 3, cell("late")).unwrap();
    sheet.write_cell(2, 0, cell("far")).unwrap();

    assert_eq!(sheet.column_count().unwrap(), 4);
    assert_eq!(sheet.row_count().unwrap(), 3);
    let rows = sheet.read_rows().unwrap();
    assert_eq!(rows[0], vec![cell("h"), None, None, cell("late")]);
    assert_eq!(rows[1], vec![None; 4]);
    assert_eq!(rows[2][0], cell("far"));
}

#[test]
fn test_write_rows_overwrites_block() {
    let sheet = MemorySheet::new("Things");
    for value in ["h", "1", "2", "3"] {
        sheet.append_row(vec![cell(value)]).unwrap();
    }

    let block: Vec<Row> = vec![vec![cell("one")], vec![cell("two")]];
    sheet.write_rows(1, &block).unwrap();

    let rows = sheet.read_rows().unwrap();
    assert_eq!(rows[1], vec![cell("one")]);
    assert_eq!(rows[2], vec![cell("two")]);
    assert_eq!(rows[3], vec![cell("3")]);
}

#[test]
fn test_clear_keeps_presentation() {
    let sheet = MemorySheet::new("Things");
    sheet.append_row(vec![cell("h")]).unwrap();
    sheet.freeze_rows(1).unwrap();
    sheet.set_header_bold(true).unwrap();

    sheet.clear().unwrap();

    assert_eq!(sheet.row_count().unwrap(), 0);
    assert_eq!(sheet.column_count().unwrap(), 0);
    assert_eq!(sheet.frozen_rows(), 1);
    assert!(sheet.header_bold());
}

#[test]
fn test_concurrent_appends() {
    let sheet = Arc::new(MemorySheet::new("Things"));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let sheet = Arc::clone(&sheet);
            thread::spawn(move || {
                for i in 0..100 {
                    sheet
                        .append_row(vec![cell(&format!("{}-{}", t, i))])
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sheet.row_count().unwrap(), 400);
}

// =============================================================================
// Workbook Tests
// =============================================================================

#[test]
fn test_workbook_insert_and_lookup() {
    let workbook = MemoryWorkbook::new();

    let sheet = workbook.insert_sheet("B").unwrap();
    workbook.insert_sheet("A").unwrap();
    sheet.append_row(vec![cell("h")]).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["B", "A"]);
    assert_eq!(workbook.sheet("B").unwrap().row_count().unwrap(), 1);
    assert!(workbook.sheet("C").is_none());
    assert_eq!(workbook.sheets().len(), 2);
}

#[test]
fn test_workbook_rejects_duplicate_names() {
    let workbook = MemoryWorkbook::new();
    workbook.insert_sheet("A").unwrap();

    assert!(matches!(
        workbook.insert_sheet("A"),
        Err(GridError::InvalidInput(_))
    ));
    assert_eq!(workbook.sheet_names().len(), 1);
}

#[test]
fn test_workbook_data_round_trip() {
    let workbook = MemoryWorkbook::new();
    let sheet = workbook.insert_sheet("A").unwrap();
    sheet.append_row(vec![cell("h"), cell("i")]).unwrap();
    sheet.freeze_rows(1).unwrap();

    let rebuilt = MemoryWorkbook::from_data(workbook.to_data());

    assert_eq!(rebuilt.to_data(), workbook.to_data());
    assert_eq!(rebuilt.memory_sheet("A").unwrap().frozen_rows(), 1);
}
