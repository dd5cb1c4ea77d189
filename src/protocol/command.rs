//! Command definitions
//!
//! Represents operations requested by callers.

use std::fmt;
use std::str::FromStr;

use crate::error::GridError;
use crate::record::{CellValue, FieldMap};

/// Operation names accepted by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateSheet,
    CleanSheet,
    Create,
    Read,
    Update,
    Delete,
    UndoDelete,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::CreateSheet,
        Operation::CleanSheet,
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
        Operation::UndoDelete,
    ];

    /// Wire name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateSheet => "CREATE_SHEET",
            Operation::CleanSheet => "CLEAN_SHEET",
            Operation::Create => "CREATE",
            Operation::Read => "READ",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::UndoDelete => "UNDO_DELETE",
        }
    }

    /// Whether the operation can change the backend
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Operation::Read)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = GridError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| GridError::UnknownOperation(name.to_string()))
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a collection with the reserved header plus extra columns
    CreateSheet { extra_columns: Vec<String> },

    /// Compact the collection
    CleanSheet,

    /// Append new rows
    Create { rows: Vec<FieldMap> },

    /// Valid rows whose `column` is one of `values` (all rows when empty)
    Read { column: String, values: Vec<CellValue> },

    /// Replace the current version of one entity
    Update { fields: FieldMap },

    /// Soft-delete matching rows
    Delete { column: String, values: Vec<CellValue> },

    /// Revalidate the most recent matching row per value
    UndoDelete { column: String, values: Vec<CellValue> },
}

impl Command {
    /// Get the operation
    pub fn operation(&self) -> Operation {
        match self {
            Command::CreateSheet { .. } => Operation::CreateSheet,
            Command::CleanSheet => Operation::CleanSheet,
            Command::Create { .. } => Operation::Create,
            Command::Read { .. } => Operation::Read,
            Command::Update { .. } => Operation::Update,
            Command::Delete { .. } => Operation::Delete,
            Command::UndoDelete { .. } => Operation::UndoDelete,
        }
    }
}
