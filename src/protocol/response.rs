//! Response definitions
//!
//! Represents successful results returned to callers. Failures are never a
//! response; they travel as `GridError`.

use serde_json::Value;

use crate::engine::RecordMap;
use crate::record::Record;

/// A successful result
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// CREATE_SHEET: the collection name
    CollectionName(String),

    /// CLEAN_SHEET: number of rows physically removed
    Removed(usize),

    /// CREATE / READ / UPDATE / DELETE: records keyed by ID
    Records(RecordMap),

    /// UNDO_DELETE: revalidated records, newest first
    List(Vec<Record>),
}

impl Response {
    pub fn into_records(self) -> Option<RecordMap> {
        match self {
            Response::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Record>> {
        match self {
            Response::List(records) => Some(records),
            _ => None,
        }
    }

    pub fn removed(&self) -> Option<usize> {
        match self {
            Response::Removed(count) => Some(*count),
            _ => None,
        }
    }

    pub fn collection_name(&self) -> Option<&str> {
        match self {
            Response::CollectionName(name) => Some(name),
            _ => None,
        }
    }

    /// Render as JSON
    pub fn to_json(&self) -> Value {
        super::encode_response(self)
    }
}
