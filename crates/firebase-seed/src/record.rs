//! Source records and document identifier resolution.

use serde_json::{Map, Value};
use thiserror::Error;

/// Field that names the target document. Never stored in the payload.
pub const ID_FIELD: &str = "id";

/// Longest document id the store accepts, in bytes.
const MAX_ID_BYTES: usize = 1500;

/// A source record: arbitrary JSON object, unknown fields kept as-is.
pub type Record = Map<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentIdError {
    #[error("document id must be a string, got {0}")]
    NotAString(&'static str),
    #[error("document id {0:?} contains '/'")]
    ContainsSlash(String),
    #[error("document id {0:?} is reserved")]
    Reserved(String),
    #[error("document id is longer than 1500 bytes")]
    TooLong,
}

/// Resolves the `id` value of a record into a document id.
///
/// Falsy values (`null`, `false`, `0`, `""`) count as absent and yield
/// `Ok(None)`, so the caller allocates a fresh id.
pub fn resolve_id(value: Option<&Value>) -> Result<Option<String>, DocumentIdError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        Value::String(s) => validate_id(s).map(|()| Some(s.clone())),
        Value::Bool(true) => Err(DocumentIdError::NotAString("boolean")),
        Value::Number(_) => Err(DocumentIdError::NotAString("number")),
        Value::Array(_) => Err(DocumentIdError::NotAString("array")),
        Value::Object(_) => Err(DocumentIdError::NotAString("object")),
    }
}

fn validate_id(id: &str) -> Result<(), DocumentIdError> {
    if id.contains('/') {
        return Err(DocumentIdError::ContainsSlash(id.to_string()));
    }
    if id == "." || id == ".." {
        return Err(DocumentIdError::Reserved(id.to_string()));
    }
    if id.len() > MAX_ID_BYTES {
        return Err(DocumentIdError::TooLong);
    }
    Ok(())
}

/// Splits a record into its requested id and the payload to store.
///
/// The `id` field is removed from the payload even when it is falsy.
pub fn split_record(mut record: Record) -> Result<(Option<String>, Record), DocumentIdError> {
    let raw = record.remove(ID_FIELD);
    let id = resolve_id(raw.as_ref())?;
    Ok((id, record))
}
