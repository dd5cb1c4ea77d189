//! Engine Module
//!
//! The CRUD engine: create, read, update, delete and undo-delete over one
//! sheet, plus collection bootstrap.
//!
//! ## Responsibilities
//! - Stamp bookkeeping columns (ID, who, when, validity)
//! - Grow the schema as new fields appear
//! - Soft-delete and revalidate rows
//! - Keep exactly one valid row per logical entity across updates
//!
//! Every method assumes the caller already holds exclusive access (see
//! `Coordinator`). Validation always happens before the first backend write.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::context::{Clock, IdentityProvider};
use crate::error::{GridError, Result};
use crate::record::{
    self, is_reserved, CellValue, FieldMap, IdGenerator, Record, Row, DATE_MODIFIED_COLUMN,
    ID_COLUMN, VALID_COLUMN,
};
use crate::schema::{ColumnMap, SchemaManager};
use crate::sheet::{Sheet, Workbook};

/// Records keyed by their entity ID
pub type RecordMap = BTreeMap<String, Record>;

/// The row-store engine
///
/// ## Versioning Model
///
/// - **create**: appends a row with a fresh ID and `Valid=true`
/// - **update**: retires the current row (`Valid=false`) and appends a new
///   row with the same ID, keeping `CreatedBy`/`DateCreated`
/// - **delete**: retires matching rows without replacement
/// - **undo_delete**: revalidates the most recent matching row per value
///
/// Rows are never physically removed here; that is the `Compactor`'s job.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Row ID source
    ids: IdGenerator,

    /// Principal stamped into CreatedBy / ModifiedBy
    identity: Arc<dyn IdentityProvider>,

    /// Time source for DateCreated / DateModified
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// Create an engine with the given config and collaborators
    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ids = IdGenerator::new(config.id_suffix_len);
        Self {
            config,
            ids,
            identity,
            clock,
        }
    }

    // =========================================================================
    // Collection Management
    // =========================================================================

    /// Create a new collection with the reserved header plus `extra_columns`
    ///
    /// Freezes and bolds the header row. Returns the name unchanged.
    pub fn create_collection(
        &self,
        workbook: &dyn Workbook,
        name: &str,
        extra_columns: &[String],
    ) -> Result<String> {
        if name.trim().is_empty() {
            return Err(invalid("collection name must not be empty"));
        }

        let mut seen: Vec<&str> = Vec::with_capacity(extra_columns.len());
        for column in extra_columns {
            if column.trim().is_empty() {
                return Err(invalid("column names must not be empty"));
            }
            if is_reserved(column) || seen.contains(&column.as_str()) {
                return Err(invalid(format!("duplicate column name '{}'", column)));
            }
            seen.push(column);
        }

        if workbook.sheet(name).is_some() {
            return Err(invalid(format!("collection '{}' already exists", name)));
        }

        let sheet = workbook.insert_sheet(name)?;
        let mut schema = SchemaManager::open(sheet.as_ref())?;
        schema.write_header(extra_columns)?;

        sheet.freeze_rows(1)?;
        sheet.set_header_bold(true)?;

        info!(collection = name, columns = ?schema.columns().names(), "created collection");
        Ok(name.to_string())
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Append one new row per field map
    ///
    /// Maps without an `ID` get a generated one and are stamped as new
    /// entities. `ModifiedBy`, `DateModified` and `Valid` are always
    /// restamped. New field names grow the header.
    ///
    /// Explicit IDs are not checked for uniqueness: callers must not reuse
    /// the ID of a valid row (use `update` for that). A reused ID is logged
    /// and leaves more than one valid row for the entity.
    pub fn create(&self, sheet: &dyn Sheet, rows: Vec<FieldMap>) -> Result<RecordMap> {
        if rows.is_empty() {
            warn!(collection = %sheet.name(), "create called without any rows");
            return Err(invalid("create requires at least one field map"));
        }

        let records = rows
            .into_iter()
            .map(Record::from_field_map)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                warn!(collection = %sheet.name(), error = %e, "create rejected");
                e
            })?;

        if records.iter().any(|r| r.id().is_some()) {
            let mut seen = live_ids(sheet)?;
            for id in records.iter().filter_map(Record::id) {
                if !seen.insert(id.to_string()) {
                    warn!(
                        collection = %sheet.name(),
                        id,
                        "explicit ID already names a valid row"
                    );
                }
            }
        }

        self.insert_records(sheet, records)
    }

    /// Stamp, encode and append already-validated records
    fn insert_records(&self, sheet: &dyn Sheet, records: Vec<Record>) -> Result<RecordMap> {
        let mut schema = SchemaManager::validate(sheet, true)?;

        let now = self.clock.now();
        let user = self.identity.current_user();
        let prefix = self.config.id_prefix_for(&sheet.name());

        let mut created = RecordMap::new();
        for mut record in records {
            if record.id().is_none() {
                record.id = Some(self.ids.new_id(&prefix));
                record.created_by = Some(user.clone());
                record.date_created = Some(now);
            }
            // An explicit ID with no provenance is treated as a new entity
            if record.created_by.is_none() {
                record.created_by = Some(user.clone());
            }
            if record.date_created.is_none() {
                record.date_created = Some(now);
            }
            record.modified_by = Some(user.clone());
            record.date_modified = Some(now);
            record.valid = Some(true);

            let row = record::encode(&record, &mut schema)?;
            sheet.append_row(row)?;

            if let Some(id) = record.id.clone() {
                created.insert(id, record);
            }
        }

        debug!(collection = %sheet.name(), count = created.len(), "created rows");
        Ok(created)
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Valid rows whose `column` cell is one of `values`
    ///
    /// An empty `values` slice matches every row. Rows without an ID and
    /// soft-deleted rows are never returned.
    pub fn read(&self, sheet: &dyn Sheet, column: &str, values: &[CellValue]) -> Result<RecordMap> {
        let rows = sheet.read_rows()?;
        let (columns, data) = split_header(&rows);

        if let Err(e) = columns.require(column) {
            warn!(collection = %sheet.name(), column, "read on unknown column");
            return Err(e);
        }

        let mut found = RecordMap::new();
        for row in data {
            if !matches(columns.cell(row, column), values) {
                continue;
            }

            let record = record::decode(&columns, row);
            if !record.is_valid() {
                continue;
            }
            if let Some(id) = record.id().map(str::to_string) {
                found.insert(id, record);
            }
        }

        debug!(collection = %sheet.name(), column, matched = found.len(), "read rows");
        Ok(found)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Replace the current version of the entity named by `fields["ID"]`
    ///
    /// Retires the existing row (if any) and appends the new version,
    /// carrying the old `CreatedBy`/`DateCreated` forward. With no existing
    /// row this is a plain create under the supplied ID.
    pub fn update(&self, sheet: &dyn Sheet, fields: FieldMap) -> Result<RecordMap> {
        let mut record = Record::from_field_map(fields)?;

        let Some(id) = record.id().map(str::to_string) else {
            warn!(collection = %sheet.name(), "update called without an ID");
            return Err(invalid("update requires an ID field"));
        };

        SchemaManager::validate(sheet, true)?;

        let retired = self.delete(sheet, ID_COLUMN, &[CellValue::Text(id.clone())])?;
        match retired.get(&id) {
            Some(previous) => {
                record.created_by = previous.created_by.clone();
                record.date_created = previous.date_created;
            }
            None => {
                debug!(collection = %sheet.name(), id = %id, "no prior version, creating");
                record.created_by = None;
                record.date_created = None;
            }
        }

        self.insert_records(sheet, vec![record])
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Soft-delete every row whose `column` cell is one of `values`
    ///
    /// Sets `Valid=false` and refreshes `DateModified`. Returns the retired
    /// rows keyed by ID (rows without an ID are left out).
    pub fn delete(&self, sheet: &dyn Sheet, column: &str, values: &[CellValue]) -> Result<RecordMap> {
        let schema = SchemaManager::validate(sheet, false)?;
        let columns = schema.columns();

        require_columns(sheet, columns, &[column, VALID_COLUMN, DATE_MODIFIED_COLUMN])?;

        if values.is_empty() {
            warn!(collection = %sheet.name(), column, "delete called without values");
            return Err(invalid("delete requires at least one value"));
        }

        let mut rows = sheet.read_rows()?;
        let now = self.clock.now();

        let mut retired = RecordMap::new();
        let mut touched = 0usize;
        for row in rows.iter_mut().skip(1) {
            if !matches(columns.cell(row, column), values) {
                continue;
            }

            columns.set_cell(row, VALID_COLUMN, CellValue::Bool(false));
            columns.set_cell(row, DATE_MODIFIED_COLUMN, CellValue::Timestamp(now));
            touched += 1;

            let record = record::decode(columns, row);
            if let Some(id) = record.id().map(str::to_string) {
                retired.insert(id, record);
            }
        }

        if touched == 0 {
            debug!(collection = %sheet.name(), column, "delete matched no rows");
            return Ok(retired);
        }

        sheet.write_rows(1, &rows[1..])?;

        debug!(collection = %sheet.name(), column, touched, "soft-deleted rows");
        Ok(retired)
    }

    // =========================================================================
    // Undo Delete
    // =========================================================================

    /// Revalidate the most recent row for each of `values`
    ///
    /// Scans newest to oldest. The first row found for a value claims it, so
    /// older versions sharing that value stay untouched. Related collections
    /// are not adjusted.
    pub fn undo_delete(
        &self,
        sheet: &dyn Sheet,
        column: &str,
        values: &[CellValue],
    ) -> Result<Vec<Record>> {
        let schema = SchemaManager::validate(sheet, false)?;
        let columns = schema.columns();

        require_columns(sheet, columns, &[column, VALID_COLUMN])?;

        let mut rows = sheet.read_rows()?;
        let mut pending: Vec<CellValue> = values.to_vec();

        let mut restored = Vec::new();
        for row in rows.iter_mut().skip(1).rev() {
            if pending.is_empty() {
                break;
            }

            let Some(cell) = columns.cell(row, column).cloned() else {
                continue;
            };
            let Some(position) = pending.iter().position(|v| *v == cell) else {
                continue;
            };
            pending.remove(position);

            columns.set_cell(row, VALID_COLUMN, CellValue::Bool(true));
            restored.push(record::decode(columns, row));
        }

        if restored.is_empty() {
            debug!(collection = %sheet.name(), column, "undo_delete matched no rows");
            return Ok(restored);
        }

        sheet.write_rows(1, &rows[1..])?;

        debug!(collection = %sheet.name(), column, restored = restored.len(), "revalidated rows");
        Ok(restored)
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

fn invalid(message: impl Into<String>) -> GridError {
    GridError::InvalidInput(message.into())
}

/// Column map of the header plus the data rows after it
fn split_header(rows: &[Row]) -> (ColumnMap, &[Row]) {
    match rows.split_first() {
        Some((header, data)) => (ColumnMap::from_header(header), data),
        None => (ColumnMap::default(), &[]),
    }
}

/// IDs of every valid row
fn live_ids(sheet: &dyn Sheet) -> Result<HashSet<String>> {
    let rows = sheet.read_rows()?;
    let (columns, data) = split_header(&rows);
    Ok(data
        .iter()
        .map(|row| record::decode(&columns, row))
        .filter(Record::is_valid)
        .filter_map(|record| record.id().map(str::to_string))
        .collect())
}

/// Set membership; an empty filter matches everything, a blank cell nothing else
fn matches(cell: Option<&CellValue>, values: &[CellValue]) -> bool {
    if values.is_empty() {
        return true;
    }
    cell.map_or(false, |cell| values.contains(cell))
}

fn require_columns(sheet: &dyn Sheet, columns: &ColumnMap, names: &[&str]) -> Result<()> {
    for name in names {
        if let Err(e) = columns.require(name) {
            warn!(collection = %sheet.name(), column = name, "required column missing");
            return Err(e);
        }
    }
    Ok(())
}
