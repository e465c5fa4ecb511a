//! Reading input documents as JSON or YAML trees

use dataconnector_generator_common::{GeneratorError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read a document, choosing the syntax from the file extension
///
/// `.yaml` and `.yml` are read as YAML, everything else as JSON.
pub(crate) fn read_document(path: &Path, document: &str) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        GeneratorError::Parse(format!(
            "Failed to read {} file {}: {}",
            document,
            path.display(),
            e
        ))
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        parse_yaml(&content, document)
    } else {
        parse_json(&content, document)
    }
}

pub(crate) fn parse_json(content: &str, document: &str) -> Result<Value> {
    serde_json::from_str(content)
        .map_err(|e| GeneratorError::Parse(format!("Failed to parse {} JSON: {}", document, e)))
}

/// Parse YAML into a JSON tree
///
/// Non-string mapping keys (status codes such as `200:`) become strings.
pub(crate) fn parse_yaml(content: &str, document: &str) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| GeneratorError::Parse(format!("Failed to parse {} YAML: {}", document, e)))?;
    Ok(yaml_to_json(yaml))
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (key, value) in map {
                object.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Deserialize a validated tree into typed structures
pub(crate) fn into_typed<T: serde::de::DeserializeOwned>(value: Value, document: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| GeneratorError::Parse(format!("Failed to read {} document: {}", document, e)))
}
