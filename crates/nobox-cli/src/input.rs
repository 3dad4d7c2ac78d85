//! Turning command-line and import text into records.

use nobox_store::{Record, Value};
use thiserror::Error;

/// Malformed user input, caught before anything reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid format '{0}'. Use 'field:value' format.")]
    MissingColon(String),

    #[error("Invalid format '{0}'. Field name is empty.")]
    EmptyField(String),

    #[error("Invalid format: {0}")]
    Line(String),

    #[error("JSON Line missing '_key' field")]
    MissingKey,

    #[error("JSON Line is not a flat record: {0}")]
    JsonLine(String),
}

/// Parse `field:value` tokens into a record.
///
/// The token is split at the first colon, so values may contain colons
/// (`url:http://x`). Values are typed with [`Value::infer`].
pub fn parse_fields<S: AsRef<str>>(args: &[S]) -> Result<Record, ValidationError> {
    let mut record = Record::new();
    for arg in args {
        let arg = arg.as_ref();
        let (field, value) = arg
            .split_once(':')
            .ok_or_else(|| ValidationError::MissingColon(arg.to_string()))?;
        if field.is_empty() {
            return Err(ValidationError::EmptyField(arg.to_string()));
        }
        record.insert(field.to_string(), Value::infer(value));
    }
    Ok(record)
}

/// Parse one non-blank import line into `(key, record)`.
///
/// A line wrapped in `{...}` is a JSON-lines record carrying its key in
/// `_key`; anything else is `key field:value ...`.
pub fn parse_line(line: &str) -> Result<(String, Record), ValidationError> {
    if line.starts_with('{') && line.ends_with('}') {
        return parse_json_line(line);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(ValidationError::Line(line.to_string()));
    }
    let record = parse_fields(&parts[1..])?;
    Ok((parts[0].to_string(), record))
}

fn parse_json_line(line: &str) -> Result<(String, Record), ValidationError> {
    let mut object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(line).map_err(|e| ValidationError::JsonLine(e.to_string()))?;

    let key = match object.remove("_key") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Err(ValidationError::MissingKey),
    };

    let record: Record = serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| ValidationError::JsonLine(e.to_string()))?;
    Ok((key, record))
}
