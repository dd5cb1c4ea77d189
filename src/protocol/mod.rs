//! Protocol Module
//!
//! Operation names, typed commands and responses, and their JSON form.
//!
//! ## Operations
//! | Name         | Params                          | Response          |
//! |--------------|---------------------------------|-------------------|
//! | CREATE_SHEET | `[[extra columns...]]`          | `CollectionName`  |
//! | CLEAN_SHEET  | `[]`                            | `Removed`         |
//! | CREATE       | `[[{field: value}...]]`         | `Records`         |
//! | READ         | `[column, [values...]]`         | `Records`         |
//! | UPDATE       | `[{field: value}]`              | `Records`         |
//! | DELETE       | `[column, [values...]]`         | `Records`         |
//! | UNDO_DELETE  | `[column, [values...]]`         | `List`            |
//!
//! ### JSON Values
//! - string → `Text`, number → `Number`, boolean → `Bool`
//! - `null` → absent
//! - timestamps render as RFC 3339 strings

mod command;
mod response;
mod codec;

pub use command::{Command, Operation};
pub use response::Response;
pub use codec::{
    cell_value_from_json, cell_value_to_json, decode_params, encode_response,
    field_map_from_json, record_to_json, values_from_json,
};
