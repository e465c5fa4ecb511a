//! Structural validation of the raw input trees
//!
//! Runs before any typed deserialization so failures can name the exact
//! offending location. Both documents are checked against fixed JSON Schemas;
//! mapping rules that span several attributes run afterwards as a separate
//! pass. Locations are slash-joined segments with `/` and `~` escaped as in
//! JSON pointers; the document root is reported as `root`.

use dataconnector_generator_common::{GeneratorError, Result};
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::primitive_type::PrimitiveType;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::{json, Value};
use std::collections::HashSet;

const OPENAPI: &str = "OpenAPI";
const MAPPING: &str = "mapping";

/// Slash-joined location with JSON pointer escapes, `root` when empty
pub(crate) fn json_pointer<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return "root".to_string();
    }
    segments
        .iter()
        .map(|s| s.as_ref().replace('~', "~0").replace('/', "~1"))
        .collect::<Vec<_>>()
        .join("/")
}

/// Top-level shape of an OpenAPI 3 or Swagger 2 document
fn openapi_schema() -> Value {
    let operation = json!({
        "type": "object",
        "properties": {
            "operationId": { "type": "string" },
            "parameters": { "type": "array" },
            "responses": { "type": "object" }
        }
    });

    json!({
        "type": "object",
        "properties": {
            "info": { "type": "object" },
            "paths": {
                "type": "object",
                "patternProperties": { "^x-": {} },
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "parameters": { "type": "array" },
                        "get": operation,
                        "post": operation,
                        "put": operation,
                        "patch": operation,
                        "delete": operation
                    }
                }
            },
            "servers": { "type": "array" },
            "components": { "type": "object" },
            "securityDefinitions": { "type": "object" },
            "definitions": { "type": "object" },
            "security": { "type": "array" }
        },
        "required": ["info", "paths"],
        "oneOf": [
            { "required": ["openapi"] },
            { "required": ["swagger"] }
        ]
    })
}

/// Shape of a directory mapping document
fn mapping_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "dnStructure": {
                "type": "object",
                "properties": {
                    "baseDnSuffix": { "type": "string" },
                    "rdnAttribute": { "type": "string" },
                    "components": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "ldapName": { "type": "string" },
                                "openApiParameterName": { "type": "string" }
                            },
                            "required": ["ldapName", "openApiParameterName"]
                        }
                    }
                },
                "required": ["baseDnSuffix", "rdnAttribute"]
            },
            "objectClasses": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "ldapName": { "type": "string" },
                        "openApiSchemaRef": { "type": "string" },
                        "openApiSchemaName": { "type": "string" },
                        "apiEndpoint": { "type": "string" },
                        "primaryKeyLdapAttribute": { "type": "string" },
                        "primaryKeyOpenApiParameterName": { "type": "string" },
                        "primaryKeyJsonPath": { "type": "string" },
                        "attributes": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "ldapName": { "type": "string" },
                                    "openApiPropertyName": { "type": "string" },
                                    "jsonPath": { "type": "string" },
                                    "typeOverride": { "type": "string" },
                                    "readOnly": { "type": "boolean" },
                                    "required": { "type": "boolean" },
                                    "primaryKey": { "type": "boolean" },
                                    "apiQueryParam": { "type": "string" }
                                },
                                "required": ["ldapName"],
                                "oneOf": [
                                    { "required": ["openApiPropertyName"] },
                                    { "required": ["jsonPath"] }
                                ]
                            }
                        }
                    },
                    "required": ["ldapName", "attributes"],
                    "oneOf": [
                        { "required": ["openApiSchemaRef"] },
                        { "required": ["openApiSchemaName"] }
                    ]
                }
            }
        },
        "required": ["dnStructure", "objectClasses"]
    })
}

/// Keys of a `oneOf` pair, identified by where the failing object sits
fn alternatives(document: &str, segments: &[String]) -> Option<(&'static str, &'static str)> {
    match (document, segments.len()) {
        (OPENAPI, 0) => Some(("openapi", "swagger")),
        (MAPPING, 2) => Some(("openApiSchemaRef", "openApiSchemaName")),
        (MAPPING, 4) => Some(("openApiPropertyName", "jsonPath")),
        _ => None,
    }
}

fn type_name(kind: &TypeKind) -> Option<&'static str> {
    let TypeKind::Single(primitive) = kind else {
        return None;
    };
    Some(match primitive {
        PrimitiveType::Array => "an array",
        PrimitiveType::Boolean => "a boolean",
        PrimitiveType::Integer => "an integer",
        PrimitiveType::Null => "null",
        PrimitiveType::Number => "a number",
        PrimitiveType::Object => "an object",
        PrimitiveType::String => "a string",
    })
}

/// Turn the first schema violation into a structural error
fn structural(document: &str, error: &ValidationError<'_>) -> GeneratorError {
    let segments = error.instance_path.clone().into_vec();

    let message = match &error.kind {
        ValidationErrorKind::Required { property } => format!(
            "missing required property '{}'",
            property.as_str().unwrap_or_default()
        ),
        ValidationErrorKind::Type { kind } => match type_name(kind) {
            Some(expected) => format!("expected {}", expected),
            None => error.to_string(),
        },
        ValidationErrorKind::OneOfMultipleValid => match alternatives(document, &segments) {
            Some((first, second)) => format!("'{}' and '{}' are mutually exclusive", first, second),
            None => error.to_string(),
        },
        ValidationErrorKind::OneOfNotValid => match alternatives(document, &segments) {
            Some((first, second)) => {
                format!("exactly one of '{}' or '{}' is required", first, second)
            }
            None => error.to_string(),
        },
        _ => error.to_string(),
    };

    GeneratorError::structural(document, json_pointer(&segments), message)
}

fn check_schema(document: &str, schema: &Value, value: &Value) -> Result<()> {
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|e| GeneratorError::Parse(format!("Invalid {} schema: {}", document, e)))?;

    let result = compiled.validate(value);
    if let Err(mut errors) = result {
        if let Some(error) = errors.next() {
            return Err(structural(document, &error));
        }
    }
    Ok(())
}

/// Validate the top-level shape of an OpenAPI or Swagger document
pub fn validate_openapi(value: &Value) -> Result<()> {
    check_schema(OPENAPI, &openapi_schema(), value)
}

/// Validate a mapping document, including cross-attribute consistency
pub fn validate_mapping(value: &Value) -> Result<()> {
    check_schema(MAPPING, &mapping_schema(), value)?;

    let classes = value
        .get("objectClasses")
        .and_then(Value::as_object)
        .into_iter()
        .flatten();
    for (name, class) in classes {
        check_attributes(name, class)?;
    }
    Ok(())
}

/// Duplicate names and primary-key agreement inside one object class
fn check_attributes(class_name: &str, class: &Value) -> Result<()> {
    let declared_pk = class.get("primaryKeyLdapAttribute").and_then(Value::as_str);
    let attributes = class
        .get("attributes")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();

    let mut seen = HashSet::new();
    let mut flagged_pk: Option<usize> = None;

    for (i, attribute) in attributes.enumerate() {
        let index = i.to_string();
        let at = |leaf: &str| {
            json_pointer(&[
                "objectClasses",
                class_name,
                "attributes",
                String::as_str(&index),
                leaf,
            ])
        };
        let ldap_name = attribute
            .get("ldapName")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if !seen.insert(ldap_name) {
            return Err(GeneratorError::structural(
                MAPPING,
                at("ldapName"),
                format!("duplicate attribute '{}'", ldap_name),
            ));
        }

        let is_pk = attribute
            .get("primaryKey")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !is_pk {
            continue;
        }
        if let Some(first) = flagged_pk {
            return Err(GeneratorError::structural(
                MAPPING,
                at("primaryKey"),
                format!("attribute {} is already marked as primary key", first),
            ));
        }
        if let Some(declared) = declared_pk {
            if declared != ldap_name {
                return Err(GeneratorError::structural(
                    MAPPING,
                    at("primaryKey"),
                    format!(
                        "primary key '{}' disagrees with primaryKeyLdapAttribute '{}'",
                        ldap_name, declared
                    ),
                ));
            }
        }
        flagged_pk = Some(i);
    }

    Ok(())
}
