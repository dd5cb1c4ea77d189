//! Access Coordinator
//!
//! Serializes every operation behind one process-wide lock and routes it to
//! the engine, the collection bootstrap or the compactor.
//!
//! ## Locking
//! - One `Mutex<()>` for all collections (not per collection, not re-entrant)
//! - Bounded wait (`Config::lock_timeout`, 30 s by default)
//! - Timeout → `GridError::LockTimeout`, nothing touched
//! - The guard is scoped, so release happens on every exit path

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, warn};

use crate::compactor::Compactor;
use crate::config::Config;
use crate::context::{Clock, IdentityProvider};
use crate::engine::Engine;
use crate::error::{GridError, Result};
use crate::protocol::{decode_params, Command, Operation, Response};
use crate::sheet::{Sheet, Workbook};

/// Entry point for callers
pub struct Coordinator {
    /// CRUD engine
    engine: Engine,

    /// Soft-delete garbage collector (CLEAN_SHEET)
    compactor: Compactor,

    /// The single process-wide lock
    lock: Mutex<()>,

    /// Maximum wait for `lock`
    lock_timeout: Duration,

    /// Collection groups callers may address by name
    workbooks: RwLock<HashMap<String, Arc<dyn Workbook>>>,
}

impl Coordinator {
    /// Create a coordinator with the given config and collaborators
    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lock_timeout = config.lock_timeout;
        let compactor = Compactor::new(config.retention, Arc::clone(&clock));
        let engine = Engine::new(config, identity, clock);

        Self {
            engine,
            compactor,
            lock: Mutex::new(()),
            lock_timeout,
            workbooks: RwLock::new(HashMap::new()),
        }
    }

    /// Make a collection group addressable by `name`
    pub fn register_workbook(&self, name: impl Into<String>, workbook: Arc<dyn Workbook>) {
        self.workbooks.write().insert(name.into(), workbook);
    }

    /// Resolve a collection group reference to its handle
    pub fn workbook(&self, name: &str) -> Result<Arc<dyn Workbook>> {
        self.workbooks
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| GridError::CollectionNotFound(format!("collection group '{}'", name)))
    }

    /// Execute an operation named by string, with JSON params
    ///
    /// The name and params are checked before the lock is requested, so an
    /// unknown operation or malformed params never wait or touch anything.
    pub fn dispatch(
        &self,
        operation: &str,
        group: &str,
        collection: &str,
        params: &[Value],
    ) -> Result<Response> {
        let operation: Operation = operation.parse().map_err(|e| {
            warn!(operation, "unknown operation");
            e
        })?;
        let command = decode_params(operation, params)?;
        let workbook = self.workbook(group)?;

        self.execute(workbook.as_ref(), collection, command)
    }

    /// Execute a typed command against a resolved workbook
    pub fn execute(
        &self,
        workbook: &dyn Workbook,
        collection: &str,
        command: Command,
    ) -> Result<Response> {
        let operation = command.operation();
        let started = Instant::now();

        let _guard = self.lock.try_lock_for(self.lock_timeout).ok_or_else(|| {
            warn!(%operation, collection, timeout = ?self.lock_timeout, "lock timeout");
            GridError::LockTimeout(self.lock_timeout)
        })?;

        let waited = started.elapsed();
        let result = self.run(workbook, collection, command);

        match &result {
            Ok(_) => debug!(
                %operation,
                collection,
                ?waited,
                elapsed = ?started.elapsed(),
                "operation finished"
            ),
            Err(e) => warn!(%operation, collection, error = %e, "operation failed"),
        }
        result
    }

    /// Route a command (lock already held)
    fn run(&self, workbook: &dyn Workbook, collection: &str, command: Command) -> Result<Response> {
        let sheet = || resolve_sheet(workbook, collection);

        match command {
            Command::CreateSheet { extra_columns } => self
                .engine
                .create_collection(workbook, collection, &extra_columns)
                .map(Response::CollectionName),
            Command::CleanSheet => self
                .compactor
                .compact_sheet(sheet()?.as_ref())
                .map(Response::Removed),
            Command::Create { rows } => self
                .engine
                .create(sheet()?.as_ref(), rows)
                .map(Response::Records),
            Command::Read { column, values } => self
                .engine
                .read(sheet()?.as_ref(), &column, &values)
                .map(Response::Records),
            Command::Update { fields } => self
                .engine
                .update(sheet()?.as_ref(), fields)
                .map(Response::Records),
            Command::Delete { column, values } => self
                .engine
                .delete(sheet()?.as_ref(), &column, &values)
                .map(Response::Records),
            Command::UndoDelete { column, values } => self
                .engine
                .undo_delete(sheet()?.as_ref(), &column, &values)
                .map(Response::List),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Get the compactor (its direct methods bypass the lock)
    pub fn compactor(&self) -> &Compactor {
        &self.compactor
    }

    /// Get the lock timeout
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}

fn resolve_sheet(workbook: &dyn Workbook, collection: &str) -> Result<Arc<dyn Sheet>> {
    workbook
        .sheet(collection)
        .ok_or_else(|| GridError::CollectionNotFound(collection.to_string()))
}
