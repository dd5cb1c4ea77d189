//! Row Codec
//!
//! Converts between positional rows and `Record`s.

use crate::error::Result;
use crate::schema::{ColumnMap, SchemaManager};

use super::{
    CellValue, Record, Row, CREATED_BY_COLUMN, DATE_CREATED_COLUMN, DATE_MODIFIED_COLUMN,
    ID_COLUMN, MODIFIED_BY_COLUMN, VALID_COLUMN,
};

/// Decode a positional row into a record
///
/// Blank cells are skipped, so the record never carries a key for an absent
/// value. Reserved cells whose content cannot be read as their type are
/// dropped as well.
pub fn decode(columns: &ColumnMap, row: &[Option<CellValue>]) -> Record {
    let mut record = Record::default();

    for (index, name) in columns.names().iter().enumerate() {
        let Some(value) = row.get(index).and_then(Option::as_ref) else {
            continue;
        };

        match name.as_str() {
            "" => {}
            ID_COLUMN => record.id = Some(value.to_string()),
            CREATED_BY_COLUMN => record.created_by = Some(value.to_string()),
            MODIFIED_BY_COLUMN => record.modified_by = Some(value.to_string()),
            DATE_CREATED_COLUMN => record.date_created = value.as_timestamp(),
            DATE_MODIFIED_COLUMN => record.date_modified = value.as_timestamp(),
            VALID_COLUMN => record.valid = value.as_bool(),
            _ => {
                record.fields.insert(name.clone(), value.clone());
            }
        }
    }

    record
}

/// Encode a record into a row as wide as the (possibly grown) header
///
/// Every field name not yet in the header gets a new column through the
/// schema manager before the row is assembled.
pub fn encode(record: &Record, schema: &mut SchemaManager<'_>) -> Result<Row> {
    let mut placed: Vec<(usize, CellValue)> = Vec::new();

    for (name, value) in record.entries() {
        let index = schema.ensure_column(&name)?;
        placed.push((index, value));
    }

    let mut row: Row = vec![None; schema.columns().width()];
    for (index, value) in placed {
        row[index] = Some(value);
    }

    Ok(row)
}
