//! Schema Manager
//!
//! Maps header names to column positions and grows the header when new
//! field names show up.
//!
//! ## Rules
//! - Row 0 is the header; names are unique and never removed
//! - Positions 0..6 hold the reserved columns, in order
//! - An empty sheet is bootstrapped with the reserved header on first write
//! - A non-empty sheet without the reserved header is a fatal schema error

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{GridError, Result};
use crate::record::{CellValue, Row, RESERVED_COLUMNS};
use crate::sheet::Sheet;

/// Header name → column index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    /// Header names by position (blank header cells are "")
    names: Vec<String>,
    /// First position of each non-blank name
    index: HashMap<String, usize>,
}

impl ColumnMap {
    /// Build a map from a header row
    pub fn from_header(header: &[Option<CellValue>]) -> Self {
        let mut map = ColumnMap::default();
        for cell in header {
            let name = cell.as_ref().map(|v| v.to_string()).unwrap_or_default();
            map.push(name);
        }
        map
    }

    /// Build a map from plain names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut map = ColumnMap::default();
        for name in names {
            map.push(name.as_ref().to_string());
        }
        map
    }

    fn push(&mut self, name: String) -> usize {
        let position = self.names.len();
        if !name.is_empty() {
            self.index.entry(name.clone()).or_insert(position);
        }
        self.names.push(name);
        position
    }

    /// Column position of a field
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Header names by position
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether positions 0..6 hold the reserved columns in order
    pub fn has_reserved_header(&self) -> bool {
        self.names.len() >= RESERVED_COLUMNS.len()
            && RESERVED_COLUMNS
                .iter()
                .zip(&self.names)
                .all(|(expected, actual)| expected == actual)
    }

    /// Position of a field, or `InvalidInput` naming the missing column
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| {
            GridError::InvalidInput(format!("column '{}' does not exist", name))
        })
    }

    /// The non-blank cell under `name` in `row`
    pub fn cell<'r>(&self, row: &'r [Option<CellValue>], name: &str) -> Option<&'r CellValue> {
        let position = self.index_of(name)?;
        row.get(position).and_then(Option::as_ref)
    }

    /// Overwrite the cell under `name`, padding the row if it is short
    ///
    /// Returns false when the column does not exist.
    pub fn set_cell(&self, row: &mut Row, name: &str, value: CellValue) -> bool {
        let Some(position) = self.index_of(name) else {
            return false;
        };
        if row.len() <= position {
            row.resize(position + 1, None);
        }
        row[position] = Some(value);
        true
    }
}

/// Header access for one sheet
///
/// Holds the column map it last read, and keeps it in step with every column
/// it appends. Only valid while the caller has exclusive access to the sheet.
pub struct SchemaManager<'a> {
    sheet: &'a dyn Sheet,
    columns: ColumnMap,
}

impl<'a> SchemaManager<'a> {
    /// Read a sheet's header into a column map (O(width))
    pub fn resolve_columns(sheet: &dyn Sheet) -> Result<ColumnMap> {
        if sheet.row_count()? == 0 {
            return Ok(ColumnMap::default());
        }
        Ok(ColumnMap::from_header(&sheet.read_row(0)?))
    }

    /// Open a sheet for schema access without validating it
    pub fn open(sheet: &'a dyn Sheet) -> Result<Self> {
        let columns = Self::resolve_columns(sheet)?;
        Ok(Self { sheet, columns })
    }

    /// Open a sheet for writing
    ///
    /// An empty sheet gets the reserved header when `bootstrap` is set and
    /// stays empty otherwise. A non-empty sheet must already start with the
    /// reserved columns; if not, nothing is written and a fatal
    /// `GridError::Schema` is returned.
    pub fn validate(sheet: &'a dyn Sheet, bootstrap: bool) -> Result<Self> {
        let mut manager = Self::open(sheet)?;

        if manager.columns.is_empty() {
            if bootstrap {
                debug!(sheet = %sheet.name(), "bootstrapping reserved header");
                manager.write_header(&[])?;
            }
            return Ok(manager);
        }

        if !manager.columns.has_reserved_header() {
            warn!(
                sheet = %sheet.name(),
                header = ?manager.columns.names(),
                "reserved header missing or misordered"
            );
            return Err(GridError::Schema(format!(
                "sheet '{}' must start with columns {:?}, found {:?}",
                sheet.name(),
                RESERVED_COLUMNS,
                manager.columns.names()
            )));
        }

        Ok(manager)
    }

    /// Write the reserved header plus `extra` columns into an empty sheet
    pub fn write_header(&mut self, extra: &[String]) -> Result<()> {
        let names: Vec<String> = RESERVED_COLUMNS
            .iter()
            .map(|name| name.to_string())
            .chain(extra.iter().cloned())
            .collect();

        let header: Row = names
            .iter()
            .map(|name| Some(CellValue::Text(name.clone())))
            .collect();

        self.sheet.append_row(header)?;
        self.columns = ColumnMap::from_names(&names);
        Ok(())
    }

    /// Position of `name`, appending a new header column if it is unknown
    ///
    /// The new column goes at the current width. Calling this while a row is
    /// being assembled is fine: each unknown name costs exactly one append.
    pub fn ensure_column(&mut self, name: &str) -> Result<usize> {
        if let Some(position) = self.columns.index_of(name) {
            return Ok(position);
        }

        let position = self.columns.width();
        self.sheet
            .write_cell(0, position, Some(CellValue::Text(name.to_string())))?;
        self.columns.push(name.to_string());

        debug!(sheet = %self.sheet.name(), column = name, position, "appended column");
        Ok(position)
    }

    /// The current column map
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }
}
