//! Sheet Module
//!
//! The tabular backend boundary.
//!
//! ## Responsibilities
//! - `Sheet`: one growable grid of cells (a collection)
//! - `Workbook`: a named group of sheets (a collection group)
//! - `MemorySheet` / `MemoryWorkbook`: in-process backend
//! - Snapshot persistence for the in-process backend
//!
//! The backend offers no transactions, no row identity and no column
//! typing. Each call is atomic on its own; anything larger is the engine's
//! job.
//!
//! ## Snapshot Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                       │
//! │   Magic: "GRDS" (4) | Version: u16 (2) | Len: u64 (8)   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Payload (Len bytes, bincode-encoded workbook)           │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer (4 bytes)                                        │
//! │   PayloadCRC: u32                                       │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod memory;
mod snapshot;

use std::sync::Arc;

use crate::error::Result;
use crate::record::{Cell, Row};

pub use memory::{MemorySheet, MemoryWorkbook, SheetData, WorkbookData};
pub use snapshot::{read_snapshot, write_snapshot};

/// One grid of cells, addressable by row and column, growable both ways
///
/// All methods take `&self`; implementations synchronize internally.
pub trait Sheet: Send + Sync {
    /// Sheet name within its workbook
    fn name(&self) -> String;

    /// Number of rows holding content (header included)
    fn row_count(&self) -> Result<usize>;

    /// Number of columns in use
    fn column_count(&self) -> Result<usize>;

    /// Read the full grid, every row padded to `column_count`
    fn read_rows(&self) -> Result<Vec<Row>>;

    /// Read one row, padded to `column_count`
    fn read_row(&self, index: usize) -> Result<Row>;

    /// Write one cell, growing the grid when needed
    fn write_cell(&self, row: usize, column: usize, value: Cell) -> Result<()>;

    /// Append a row after the last one; returns its index
    fn append_row(&self, row: Row) -> Result<usize>;

    /// Overwrite a contiguous block of rows starting at `start`
    fn write_rows(&self, start: usize, rows: &[Row]) -> Result<()>;

    /// Remove all content, keeping presentation settings
    fn clear(&self) -> Result<()>;

    /// Freeze the first `count` rows (presentation only)
    fn freeze_rows(&self, count: usize) -> Result<()>;

    /// Render the header row bold (presentation only)
    fn set_header_bold(&self, bold: bool) -> Result<()>;
}

/// A named group of sheets
pub trait Workbook: Send + Sync {
    /// Look up a sheet by name
    fn sheet(&self, name: &str) -> Option<Arc<dyn Sheet>>;

    /// Create a new empty sheet; fails if the name is taken
    fn insert_sheet(&self, name: &str) -> Result<Arc<dyn Sheet>>;

    /// Names of all sheets, in creation order
    fn sheet_names(&self) -> Vec<String>;

    /// All sheets, in creation order
    fn sheets(&self) -> Vec<Arc<dyn Sheet>> {
        self.sheet_names()
            .iter()
            .filter_map(|name| self.sheet(name))
            .collect()
    }
}
