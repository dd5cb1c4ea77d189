//! Protocol codec
//!
//! Decoding positional JSON params into commands, and encoding responses
//! back to JSON.

use serde_json::{Map, Number, Value};

use crate::error::{GridError, Result};
use crate::record::{CellValue, FieldMap, Record};

use super::{Command, Operation, Response};

/// Integral floats below this magnitude render as JSON integers
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// =============================================================================
// Param Decoding
// =============================================================================

/// Decode the positional params of an operation
pub fn decode_params(operation: Operation, params: &[Value]) -> Result<Command> {
    match operation {
        Operation::CreateSheet => {
            let extra_columns = match params.first() {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(names)) => names
                    .iter()
                    .map(|name| {
                        name.as_str().map(str::to_string).ok_or_else(|| {
                            invalid(format!("{}: column names must be strings", operation))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
                Some(other) => {
                    return Err(invalid(format!(
                        "{}: expected a list of column names, got {}",
                        operation, other
                    )))
                }
            };
            Ok(Command::CreateSheet { extra_columns })
        }
        Operation::CleanSheet => Ok(Command::CleanSheet),
        Operation::Create => {
            let rows = match params.first() {
                Some(Value::Array(maps)) => maps
                    .iter()
                    .map(field_map_from_json)
                    .collect::<Result<Vec<_>>>()?,
                Some(map @ Value::Object(_)) => vec![field_map_from_json(map)?],
                _ => {
                    return Err(invalid(format!(
                        "{}: expected a list of field maps",
                        operation
                    )))
                }
            };
            Ok(Command::Create { rows })
        }
        Operation::Read => {
            let (column, values) = column_and_values(operation, params)?;
            Ok(Command::Read { column, values })
        }
        Operation::Update => {
            let fields = match params.first() {
                Some(map @ Value::Object(_)) => field_map_from_json(map)?,
                _ => return Err(invalid(format!("{}: expected a field map", operation))),
            };
            Ok(Command::Update { fields })
        }
        Operation::Delete => {
            let (column, values) = column_and_values(operation, params)?;
            Ok(Command::Delete { column, values })
        }
        Operation::UndoDelete => {
            let (column, values) = column_and_values(operation, params)?;
            Ok(Command::UndoDelete { column, values })
        }
    }
}

/// `[columnName, values]`; a missing values param decodes as empty
fn column_and_values(operation: Operation, params: &[Value]) -> Result<(String, Vec<CellValue>)> {
    let column = params
        .first()
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| invalid(format!("{}: expected a column name", operation)))?
        .to_string();

    let values = match params.get(1) {
        Some(values) => values_from_json(values)?,
        None => Vec::new(),
    };

    Ok((column, values))
}

/// Decode a JSON object into a field map, dropping `null` fields
///
/// Fields keep the order they appear in the object.
pub fn field_map_from_json(value: &Value) -> Result<FieldMap> {
    let Value::Object(object) = value else {
        return Err(invalid(format!("expected a JSON object, got {}", value)));
    };

    let mut fields = FieldMap::new();
    for (name, value) in object {
        if let Some(cell) = cell_value_from_json(value)? {
            fields.insert(name.clone(), cell);
        }
    }
    Ok(fields)
}

/// Decode a scalar; `null` means absent
pub fn cell_value_from_json(value: &Value) -> Result<Option<CellValue>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(CellValue::Text(s.clone()))),
        Value::Bool(b) => Ok(Some(CellValue::Bool(*b))),
        Value::Number(n) => n
            .as_f64()
            .map(|n| Some(CellValue::Number(n)))
            .ok_or_else(|| invalid(format!("number out of range: {}", n))),
        Value::Array(_) | Value::Object(_) => {
            Err(invalid(format!("cell values must be scalars, got {}", value)))
        }
    }
}

/// Decode a value filter; a single scalar counts as a one-element list
pub fn values_from_json(value: &Value) -> Result<Vec<CellValue>> {
    match value {
        Value::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                if let Some(cell) = cell_value_from_json(item)? {
                    values.push(cell);
                }
            }
            Ok(values)
        }
        other => Ok(cell_value_from_json(other)?.into_iter().collect()),
    }
}

// =============================================================================
// Response Encoding
// =============================================================================

/// Render one cell value
pub fn cell_value_to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Text(s) => Value::String(s.clone()),
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
            Value::from(*n as i64)
        }
        CellValue::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
    }
}

/// Render a record as an object keyed by header names
pub fn record_to_json(record: &Record) -> Value {
    let object: Map<String, Value> = record
        .entries()
        .into_iter()
        .map(|(name, value)| (name, cell_value_to_json(&value)))
        .collect();
    Value::Object(object)
}

/// Render a response
pub fn encode_response(response: &Response) -> Value {
    match response {
        Response::CollectionName(name) => Value::String(name.clone()),
        Response::Removed(count) => Value::from(*count),
        Response::Records(records) => Value::Object(
            records
                .iter()
                .map(|(id, record)| (id.clone(), record_to_json(record)))
                .collect(),
        ),
        Response::List(records) => Value::Array(records.iter().map(record_to_json).collect()),
    }
}

fn invalid(message: String) -> GridError {
    GridError::InvalidInput(message)
}
