//! In-memory backend
//!
//! Grid storage guarded by `parking_lot::RwLock`.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::record::{Cell, Row};

use super::{read_snapshot, write_snapshot, Sheet, Workbook};

/// Plain contents of one sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Row>,
    pub columns: usize,
    pub frozen_rows: usize,
    pub header_bold: bool,
}

/// Plain contents of a workbook (what a snapshot stores)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbookData {
    pub sheets: Vec<SheetData>,
}

impl SheetData {
    fn padded(&self, row: &Row) -> Row {
        let mut row = row.clone();
        if row.len() < self.columns {
            row.resize(self.columns, None);
        }
        row
    }

    fn grow_to(&mut self, rows: usize, columns: usize) {
        if self.rows.len() < rows {
            self.rows.resize(rows, Vec::new());
        }
        self.columns = self.columns.max(columns);
    }
}

/// In-memory sheet
///
/// ## Concurrency:
/// - `data`: Protected by RwLock (many concurrent readers, exclusive writer)
/// - Each trait call holds the lock for its whole duration, nothing longer
pub struct MemorySheet {
    data: RwLock<SheetData>,
}

impl MemorySheet {
    /// Create an empty sheet
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_data(SheetData {
            name: name.into(),
            ..SheetData::default()
        })
    }

    /// Wrap existing contents
    pub fn from_data(data: SheetData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Copy out the current contents
    pub fn snapshot(&self) -> SheetData {
        self.data.read().clone()
    }

    /// Number of frozen rows
    pub fn frozen_rows(&self) -> usize {
        self.data.read().frozen_rows
    }

    /// Whether the header row is rendered bold
    pub fn header_bold(&self) -> bool {
        self.data.read().header_bold
    }
}

impl Sheet for MemorySheet {
    fn name(&self) -> String {
        self.data.read().name.clone()
    }

    fn row_count(&self) -> Result<usize> {
        Ok(self.data.read().rows.len())
    }

    fn column_count(&self) -> Result<usize> {
        Ok(self.data.read().columns)
    }

    fn read_rows(&self) -> Result<Vec<Row>> {
        let data = self.data.read();
        Ok(data.rows.iter().map(|row| data.padded(row)).collect())
    }

    fn read_row(&self, index: usize) -> Result<Row> {
        let data = self.data.read();
        let row = data.rows.get(index).ok_or_else(|| {
            GridError::Backend(format!(
                "row {} out of range (sheet '{}' has {} rows)",
                index,
                data.name,
                data.rows.len()
            ))
        })?;
        Ok(data.padded(row))
    }

    fn write_cell(&self, row: usize, column: usize, value: Cell) -> Result<()> {
        let mut data = self.data.write();
        data.grow_to(row + 1, column + 1);

        let cells = &mut data.rows[row];
        if cells.len() <= column {
            cells.resize(column + 1, None);
        }
        cells[column] = value;
        Ok(())
    }

    fn append_row(&self, row: Row) -> Result<usize> {
        let mut data = self.data.write();
        data.columns = data.columns.max(row.len());
        data.rows.push(row);
        Ok(data.rows.len() - 1)
    }

    fn write_rows(&self, start: usize, rows: &[Row]) -> Result<()> {
        let mut data = self.data.write();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        data.grow_to(start + rows.len(), width);

        for (offset, row) in rows.iter().enumerate() {
            data.rows[start + offset] = row.clone();
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut data = self.data.write();
        data.rows.clear();
        data.columns = 0;
        Ok(())
    }

    fn freeze_rows(&self, count: usize) -> Result<()> {
        self.data.write().frozen_rows = count;
        Ok(())
    }

    fn set_header_bold(&self, bold: bool) -> Result<()> {
        self.data.write().header_bold = bold;
        Ok(())
    }
}

/// In-memory workbook
pub struct MemoryWorkbook {
    /// Sheets in creation order
    sheets: RwLock<Vec<Arc<MemorySheet>>>,
}

impl MemoryWorkbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self {
            sheets: RwLock::new(Vec::new()),
        }
    }

    /// Rebuild a workbook from plain contents
    pub fn from_data(data: WorkbookData) -> Self {
        let sheets = data
            .sheets
            .into_iter()
            .map(|sheet| Arc::new(MemorySheet::from_data(sheet)))
            .collect();

        Self {
            sheets: RwLock::new(sheets),
        }
    }

    /// Copy out the current contents of every sheet
    pub fn to_data(&self) -> WorkbookData {
        WorkbookData {
            sheets: self.sheets.read().iter().map(|s| s.snapshot()).collect(),
        }
    }

    /// Concrete handle to a sheet (for inspecting presentation state)
    pub fn memory_sheet(&self, name: &str) -> Option<Arc<MemorySheet>> {
        self.sheets
            .read()
            .iter()
            .find(|sheet| sheet.name() == name)
            .cloned()
    }

    /// Load a workbook from a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_data(read_snapshot(path)?))
    }

    /// Load a workbook if the snapshot exists, otherwise start empty
    pub fn open_or_new(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Persist the workbook to a snapshot file
    pub fn save(&self, path: &Path) -> Result<()> {
        write_snapshot(path, &self.to_data())
    }
}

impl Default for MemoryWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet(&self, name: &str) -> Option<Arc<dyn Sheet>> {
        self.memory_sheet(name).map(|sheet| sheet as Arc<dyn Sheet>)
    }

    fn insert_sheet(&self, name: &str) -> Result<Arc<dyn Sheet>> {
        let mut sheets = self.sheets.write();

        if sheets.iter().any(|sheet| sheet.name() == name) {
            return Err(GridError::InvalidInput(format!(
                "sheet '{}' already exists",
                name
            )));
        }

        let sheet = Arc::new(MemorySheet::new(name));
        sheets.push(Arc::clone(&sheet));
        Ok(sheet as Arc<dyn Sheet>)
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.read().iter().map(|sheet| sheet.name()).collect()
    }
}
