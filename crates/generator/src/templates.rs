//! Template loading and management

use dataconnector_generator_common::{GeneratorError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    // Register custom filters
    tera.register_filter("capitalize", capitalize_filter);
    tera.register_filter("java_string", java_string_filter);
    tera.register_filter("java_doc", java_doc_filter);
    tera.register_filter("xml_attr", xml_attr_filter);

    tera.add_raw_template("model.java", include_str!("../templates/model.java.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load model.java template: {}", e))
        })?;

    tera.add_raw_template("client.java", include_str!("../templates/client.java.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load client.java template: {}", e))
        })?;

    tera.add_raw_template(
        "converter.java",
        include_str!("../templates/converter.java.tera"),
    )
    .map_err(|e| {
        GeneratorError::Generation(format!("Failed to load converter.java template: {}", e))
    })?;

    tera.add_raw_template(
        "connector.java",
        include_str!("../templates/connector.java.tera"),
    )
    .map_err(|e| {
        GeneratorError::Generation(format!("Failed to load connector.java template: {}", e))
    })?;

    tera.add_raw_template("schema.orx", include_str!("../templates/schema.orx.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load schema.orx template: {}", e))
        })?;

    tera.add_raw_template("meta.json", include_str!("../templates/meta.json.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load meta.json template: {}", e))
        })?;

    Ok(tera)
}

/// Filter to capitalize first letter
fn capitalize_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("capitalize filter expects a string"))?;

    let mut chars = s.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };

    Ok(Value::String(capitalized))
}

/// Filter to escape a value for a Java string literal
fn java_string_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("java_string filter expects a string"))?;

    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if (c as u32) < 0x20 => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }

    Ok(Value::String(escaped))
}

/// Filter to keep free text from terminating a Javadoc comment
fn java_doc_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("java_doc filter expects a string"))?;

    let single_line = s.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(Value::String(single_line.replace("*/", "*&#47;")))
}

/// Filter to escape a value for an XML attribute
fn xml_attr_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("xml_attr filter expects a string"))?;

    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }

    Ok(Value::String(escaped))
}
