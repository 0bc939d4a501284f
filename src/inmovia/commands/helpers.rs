use crate::error::{Result, StoreError};
use crate::model::Record;
use serde_json::Value;

/// Parse a command-line JSON argument that must be an object.
pub fn parse_object(input: &str) -> Result<Record> {
    match serde_json::from_str(input)? {
        Value::Object(record) => Ok(record),
        other => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Parse `field=value` filters. The value is read as JSON when it parses
/// (`active=true`, `precio=250000`), otherwise as a plain string.
pub fn parse_filters(raw: &[String]) -> Result<Vec<(String, Value)>> {
    raw.iter()
        .map(|filter| {
            let (field, value) = filter.split_once('=').ok_or_else(|| {
                StoreError::InvalidRecord(format!("filter must be field=value, got '{}'", filter))
            })?;
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.into()));
            Ok((field.to_string(), value))
        })
        .collect()
}

pub fn matches_filters(record: &Record, filters: &[(String, Value)]) -> bool {
    filters
        .iter()
        .all(|(field, value)| record.get(field) == Some(value))
}
