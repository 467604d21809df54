//! Loading flat record lists from JSON files.
//!
//! The persistence layer proper is an external collaborator; a JSON file
//! holding a top-level array of objects stands in for it at the CLI boundary.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::instrument;

use crate::domain::error::{DomainError, TreeResult};
use crate::domain::record::Record;

/// Read records from a JSON file. The top level must be an array and every
/// element must be an object.
#[instrument(level = "debug")]
pub fn load_records(path: &Path) -> TreeResult<Vec<Record>> {
    if !path.exists() {
        return Err(DomainError::FileNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| DomainError::InvalidFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let value: Value =
        serde_json::from_str(&content).map_err(|e| DomainError::InvalidFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(DomainError::InvalidFormat {
                path: path.to_path_buf(),
                message: format!("expected a top-level array, got {}", type_name(&other)),
            })
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => records.push(map),
            other => {
                return Err(DomainError::InvalidFormat {
                    path: path.to_path_buf(),
                    message: format!("element {} is not an object, got {}", i, type_name(&other)),
                })
            }
        }
    }

    Ok(records)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
