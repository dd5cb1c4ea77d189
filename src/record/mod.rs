//! Record Module
//!
//! Cell values, positional rows, and the named-field view of a row.
//!
//! ## Row Layout
//! ```text
//! ┌────┬───────────┬────────────┬─────────────┬──────────────┬───────┬─────────────┐
//! │ ID │ CreatedBy │ ModifiedBy │ DateCreated │ DateModified │ Valid │ user fields │
//! └────┴───────────┴────────────┴─────────────┴──────────────┴───────┴─────────────┘
//!   0        1            2             3              4          5      6..
//! ```
//!
//! A blank cell (`None`) means the field is absent for that row. It is never
//! the same thing as an empty string.

mod codec;
mod id;

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

pub use codec::{decode, encode};
pub use id::IdGenerator;

// =============================================================================
// Reserved Columns
// =============================================================================

pub const ID_COLUMN: &str = "ID";
pub const CREATED_BY_COLUMN: &str = "CreatedBy";
pub const MODIFIED_BY_COLUMN: &str = "ModifiedBy";
pub const DATE_CREATED_COLUMN: &str = "DateCreated";
pub const DATE_MODIFIED_COLUMN: &str = "DateModified";
pub const VALID_COLUMN: &str = "Valid";

/// Bookkeeping columns every collection carries at positions 0..6, in order
pub const RESERVED_COLUMNS: [&str; 6] = [
    ID_COLUMN,
    CREATED_BY_COLUMN,
    MODIFIED_BY_COLUMN,
    DATE_CREATED_COLUMN,
    DATE_MODIFIED_COLUMN,
    VALID_COLUMN,
];

/// Whether a header name belongs to the reserved set
pub fn is_reserved(name: &str) -> bool {
    RESERVED_COLUMNS.contains(&name)
}

// =============================================================================
// Cells
// =============================================================================

/// A scalar stored in one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

/// One grid cell; `None` is blank
pub type Cell = Option<CellValue>;

/// One positional row, aligned to the header
pub type Row = Vec<Cell>;

/// Caller-supplied field bag (field name → value)
pub type FieldMap = IndexMap<String, CellValue>;

impl CellValue {
    /// Read a boolean, accepting `"true"`/`"false"` text in any case
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            CellValue::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Read a timestamp, accepting RFC 3339 text
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Timestamp(ts) => Some(*ts),
            CellValue::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            // Whole numbers print without a trailing ".0" so numeric IDs read naturally
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::Timestamp(value)
    }
}

// =============================================================================
// Record
// =============================================================================

/// A row materialized as named fields
///
/// Reserved columns are typed members; each is `None` when its cell was
/// blank. User columns live in `fields`, which never holds a key for an
/// absent value and keeps the order fields were inserted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub id: Option<String>,
    pub created_by: Option<String>,
    pub modified_by: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub valid: Option<bool>,
    pub fields: FieldMap,
}

impl Record {
    /// Build a record from caller input.
    ///
    /// `ID`, `CreatedBy` and `DateCreated` are taken as given. `ModifiedBy`,
    /// `DateModified` and `Valid` are dropped because every write restamps
    /// them.
    pub fn from_field_map(map: FieldMap) -> Result<Self> {
        let mut record = Record::default();

        for (name, value) in map {
            if name.trim().is_empty() {
                return Err(GridError::InvalidInput(
                    "field names must not be empty".to_string(),
                ));
            }

            match name.as_str() {
                ID_COLUMN => record.id = Some(value.to_string()),
                CREATED_BY_COLUMN => record.created_by = Some(value.to_string()),
                DATE_CREATED_COLUMN => {
                    let ts = value.as_timestamp().ok_or_else(|| {
                        GridError::InvalidInput(format!(
                            "{} must be a timestamp, got {:?}",
                            DATE_CREATED_COLUMN, value
                        ))
                    })?;
                    record.date_created = Some(ts);
                }
                MODIFIED_BY_COLUMN | DATE_MODIFIED_COLUMN | VALID_COLUMN => {}
                _ => {
                    record.fields.insert(name, value);
                }
            }
        }

        Ok(record)
    }

    /// The logical entity ID, if present and non-empty
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether this row is the live version of its entity
    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }

    /// Look up any field by its header name
    pub fn get(&self, name: &str) -> Option<CellValue> {
        match name {
            ID_COLUMN => self.id.clone().map(CellValue::Text),
            CREATED_BY_COLUMN => self.created_by.clone().map(CellValue::Text),
            MODIFIED_BY_COLUMN => self.modified_by.clone().map(CellValue::Text),
            DATE_CREATED_COLUMN => self.date_created.map(CellValue::Timestamp),
            DATE_MODIFIED_COLUMN => self.date_modified.map(CellValue::Timestamp),
            VALID_COLUMN => self.valid.map(CellValue::Bool),
            _ => self.fields.get(name).cloned(),
        }
    }

    /// All present fields: reserved first, then user fields in `fields` order
    pub fn entries(&self) -> Vec<(String, CellValue)> {
        RESERVED_COLUMNS
            .iter()
            .filter_map(|name| self.get(name).map(|v| (name.to_string(), v)))
            .chain(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }
}
