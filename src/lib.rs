//! # gridstore
//!
//! A versioned row store on top of a plain cell grid, with:
//! - Create / read / update / delete / undo-delete over named fields
//! - Soft deletion with history (one valid row per entity)
//! - Automatic schema growth as new fields appear
//! - One process-wide lock with a bounded wait
//! - Compaction of old soft-deleted rows
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Coordinator                           │
//! │              (global lock, operation routing)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Engine    │          │  Compactor  │
//!   │   (CRUD)    │          │    (GC)     │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        │
//!   ┌─────────────┐                 │
//!   │ Schema/Codec│                 │
//!   │  ID source  │                 │
//!   └──────┬──────┘                 │
//!          │                        │
//!          ▼                        ▼
//!   ┌─────────────────────────────────────┐
//!   │        Sheet / Workbook backend     │
//!   └─────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod context;

pub mod record;
pub mod sheet;
pub mod schema;
pub mod engine;
pub mod compactor;
pub mod protocol;
pub mod coordinator;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{GridError, Result};
pub use config::Config;
pub use context::{Clock, IdentityProvider, ManualClock, StaticIdentity, SystemClock};
pub use record::{CellValue, FieldMap, Record};
pub use sheet::{MemorySheet, MemoryWorkbook, Sheet, Workbook};
pub use engine::{Engine, RecordMap};
pub use compactor::Compactor;
pub use protocol::{Command, Operation, Response};
pub use coordinator::Coordinator;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of gridstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
