//! Compactor
//!
//! Physically removes soft-deleted rows that have aged past the retention
//! window. This is the only place rows ever leave a sheet; once a row is
//! compacted away `undo_delete` can no longer bring it back.
//!
//! A row survives when any of these hold:
//! - it is the header
//! - `Valid` is true
//! - `DateModified` is within `retention` of now
//!
//! A retention too large to subtract from the current time keeps every row.
//!
//! `compact` on its own does not take the coordinator lock. Calling it while
//! CRUD operations run against the same sheet can lose their writes; route
//! compaction through `Coordinator` (CLEAN_SHEET) when that matters.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::context::Clock;
use crate::error::{GridError, Result};
use crate::record::{Row, DATE_MODIFIED_COLUMN, VALID_COLUMN};
use crate::schema::ColumnMap;
use crate::sheet::Sheet;

/// Garbage collector for soft-deleted rows
pub struct Compactor {
    /// Rows modified within this window are kept regardless of validity
    retention: Duration,

    /// Time source for the retention cutoff
    clock: Arc<dyn Clock>,
}

impl Compactor {
    pub fn new(retention: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { retention, clock }
    }

    /// Sweep several sheets; returns the total number of rows removed
    ///
    /// Sheets without the reserved header are skipped with a warning.
    /// Backend failures abort the sweep.
    pub fn compact(&self, sheets: &[Arc<dyn Sheet>]) -> Result<usize> {
        let mut removed = 0;

        for sheet in sheets {
            match self.compact_sheet(sheet.as_ref()) {
                Ok(count) => removed += count,
                Err(GridError::Schema(reason)) => {
                    warn!(collection = %sheet.name(), %reason, "skipping compaction");
                }
                Err(e) => return Err(e),
            }
        }

        info!(sheets = sheets.len(), removed, "compaction sweep finished");
        Ok(removed)
    }

    /// Compact one sheet; returns the number of rows removed
    pub fn compact_sheet(&self, sheet: &dyn Sheet) -> Result<usize> {
        let rows = sheet.read_rows()?;
        let Some((header, data)) = rows.split_first() else {
            return Ok(0);
        };

        let columns = ColumnMap::from_header(header);
        if !columns.has_reserved_header() {
            return Err(GridError::Schema(format!(
                "sheet '{}' has no reserved header",
                sheet.name()
            )));
        }

        // A window reaching past the earliest representable time expires nothing
        let Some(cutoff) = chrono::Duration::from_std(self.retention)
            .ok()
            .and_then(|retention| self.clock.now().checked_sub_signed(retention))
        else {
            debug!(
                collection = %sheet.name(),
                retention = ?self.retention,
                "retention exceeds clock range, nothing to compact"
            );
            return Ok(0);
        };

        let mut kept: Vec<Row> = Vec::with_capacity(rows.len());
        kept.push(header.clone());

        for row in data {
            let valid = columns
                .cell(row, VALID_COLUMN)
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let recent = columns
                .cell(row, DATE_MODIFIED_COLUMN)
                .and_then(|v| v.as_timestamp())
                .map_or(false, |modified| modified >= cutoff);

            if valid || recent {
                kept.push(row.clone());
            }
        }

        let removed = rows.len() - kept.len();
        if removed == 0 {
            debug!(collection = %sheet.name(), "nothing to compact");
            return Ok(0);
        }

        sheet.clear()?;
        sheet.write_rows(0, &kept)?;

        info!(collection = %sheet.name(), removed, kept = kept.len() - 1, "compacted");
        Ok(removed)
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }
}
