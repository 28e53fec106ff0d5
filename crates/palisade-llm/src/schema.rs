//! Structural validation of provider payloads against a response contract
//!
//! Supports the JSON-schema subset the router needs: `type` checks,
//! `required` keys, recursive `properties`, and `items` for arrays.
//! Validation stops at the first violation and reports its key path. A
//! malformed schema yields the same mismatch kind as a bad payload, so the
//! router's fallback logic treats both uniformly.

use serde_json::Value;
use thiserror::Error;

/// First violation found while validating a payload
#[derive(Debug, Error, PartialEq, Eq)]
#[error("schema mismatch at {path}: {reason}")]
pub struct SchemaMismatch {
    /// Path to the offending key, e.g. `$.parcel.value[2]`
    pub path: String,
    /// What went wrong at that path
    pub reason: String,
}

impl SchemaMismatch {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Validate a payload against a JSON-schema-like contract
///
/// # Errors
///
/// Returns the first [`SchemaMismatch`] encountered
pub fn validate(payload: &Value, schema: &Value) -> Result<(), SchemaMismatch> {
    validate_at(payload, schema, "$")
}

fn validate_at(payload: &Value, schema: &Value, path: &str) -> Result<(), SchemaMismatch> {
    let Some(schema_obj) = schema.as_object() else {
        return Err(SchemaMismatch::new(path, "schema must be an object"));
    };

    if let Some(type_value) = schema_obj.get("type") {
        let Some(expected) = type_value.as_str() else {
            return Err(SchemaMismatch::new(path, "schema `type` must be a string"));
        };
        match type_matches(payload, expected) {
            None => {
                return Err(SchemaMismatch::new(
                    path,
                    format!("unsupported schema type `{expected}`"),
                ));
            }
            Some(false) => {
                return Err(SchemaMismatch::new(
                    path,
                    format!("expected {expected}, got {}", type_name(payload)),
                ));
            }
            Some(true) => {}
        }
    }

    if let Some(required) = schema_obj.get("required") {
        let Some(required) = required.as_array() else {
            return Err(SchemaMismatch::new(path, "schema `required` must be an array"));
        };
        let Some(payload_obj) = payload.as_object() else {
            return Err(SchemaMismatch::new(
                path,
                format!("expected object, got {}", type_name(payload)),
            ));
        };
        for key in required {
            let Some(key) = key.as_str() else {
                return Err(SchemaMismatch::new(path, "schema `required` entries must be strings"));
            };
            if !payload_obj.contains_key(key) {
                return Err(SchemaMismatch::new(
                    &format!("{path}.{key}"),
                    "missing required key",
                ));
            }
        }
    }

    if let Some(properties) = schema_obj.get("properties") {
        let Some(properties) = properties.as_object() else {
            return Err(SchemaMismatch::new(path, "schema `properties` must be an object"));
        };
        if let Some(payload_obj) = payload.as_object() {
            for (key, subschema) in properties {
                if let Some(child) = payload_obj.get(key) {
                    validate_at(child, subschema, &format!("{path}.{key}"))?;
                }
            }
        }
    }

    if let Some(items) = schema_obj.get("items")
        && let Some(elements) = payload.as_array()
    {
        for (index, element) in elements.iter().enumerate() {
            validate_at(element, items, &format!("{path}[{index}]"))?;
        }
    }

    Ok(())
}

/// Whether a value satisfies a schema type name; `None` for unknown names
fn type_matches(value: &Value, expected: &str) -> Option<bool> {
    let matches = match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => return None,
    };
    Some(matches)
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
