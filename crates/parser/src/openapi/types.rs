//! OpenAPI 3 / Swagger 2 type definitions
//!
//! Simplified representation covering the subset needed to build a connector.
//! Maps use `IndexMap` so iteration follows declaration order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// OpenAPI document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiSpec {
    /// OpenAPI version (e.g., "3.0.0"), absent for Swagger 2
    #[serde(default)]
    pub openapi: Option<String>,

    /// Swagger version ("2.0"), absent for OpenAPI 3
    #[serde(default)]
    pub swagger: Option<String>,

    /// API metadata
    pub info: Info,

    #[serde(default)]
    pub servers: Vec<Server>,

    /// Swagger 2 host, combined with `basePath` and `schemes`
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub base_path: Option<String>,

    #[serde(default)]
    pub schemes: Vec<String>,

    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default)]
    pub components: Option<Components>,

    /// Swagger 2 schemas
    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,

    /// Swagger 2 reusable parameters
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,

    /// Swagger 2 security schemes
    #[serde(default)]
    pub security_definitions: IndexMap<String, SecurityScheme>,

    /// Global security requirements; each entry maps scheme name to scopes
    #[serde(default)]
    pub security: Vec<IndexMap<String, Vec<String>>>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub variables: IndexMap<String, ServerVariable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerVariable {
    #[serde(default)]
    pub default: Option<String>,

    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,
}

/// Operations for a path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    /// Parameters shared by every operation on this path
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default)]
    pub request_body: Option<RequestBody>,

    /// Responses keyed by status code, in declaration order
    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    /// Operation-level security override
    #[serde(default)]
    pub security: Option<Vec<IndexMap<String, Vec<String>>>>,
}

/// Parameter definition, or a `$ref` to one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub name: String,

    /// Location: query, header, path, cookie, or Swagger 2 body/formData
    #[serde(rename = "in", default)]
    pub location: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub schema: Option<Schema>,

    /// Swagger 2 inline type for non-body parameters
    #[serde(rename = "type", default)]
    pub param_type: Option<String>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub items: Option<Box<Schema>>,
}

impl Parameter {
    /// Schema describing the parameter value
    ///
    /// OpenAPI 3 carries it under `schema`; Swagger 2 inlines `type`/`format`.
    pub fn value_schema(&self) -> Schema {
        if let Some(schema) = &self.schema {
            return schema.clone();
        }
        Schema {
            schema_type: self.param_type.clone().map(SchemaType::Single),
            format: self.format.clone(),
            items: self.items.clone(),
            ..Schema::default()
        }
    }
}

/// Request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Content types in declaration order
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

/// Response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    /// Swagger 2 response body schema
    #[serde(default)]
    pub schema: Option<Schema>,
}

/// Media type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<Schema>,
}

/// `type` as a single name or, in newer documents, a list such as `["string", "null"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    /// First non-null type name
    pub fn primary(&self) -> Option<&str> {
        match self {
            SchemaType::Single(name) => Some(name.as_str()),
            SchemaType::Multiple(names) => names
                .iter()
                .map(String::as_str)
                .find(|name| *name != "null")
                .or_else(|| names.first().map(String::as_str)),
        }
    }
}

/// `additionalProperties`: a flag or a value schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Flag(bool),
    Schema(Box<Schema>),
}

/// Schema definition, or a `$ref` to one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,

    #[serde(rename = "type", default)]
    pub schema_type: Option<SchemaType>,

    /// Format (e.g., int32, int64, date-time)
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Properties (for object type)
    #[serde(default)]
    pub properties: IndexMap<String, Schema>,

    #[serde(default)]
    pub required: Vec<String>,

    /// Items schema (for array type)
    #[serde(default)]
    pub items: Option<Box<Schema>>,

    #[serde(default)]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default)]
    pub read_only: bool,

    #[serde(rename = "enum", default)]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(default)]
    pub all_of: Vec<Schema>,

    #[serde(default)]
    pub one_of: Vec<Schema>,

    #[serde(default)]
    pub any_of: Vec<Schema>,
}

impl Schema {
    pub fn type_name(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(SchemaType::primary)
    }

    /// Whether this named schema renders as its own data class
    ///
    /// Objects with declared properties, and bare `type: object` without a
    /// value schema, are models. Maps and primitive aliases are not.
    pub fn is_model(&self) -> bool {
        if self.reference.is_some() {
            return false;
        }
        if !self.properties.is_empty() {
            return true;
        }
        self.type_name() == Some("object") && self.additional_properties.is_none()
    }

    pub fn is_composed(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty()
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }
}

/// Reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,

    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,

    #[serde(default)]
    pub request_bodies: IndexMap<String, RequestBody>,

    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    #[serde(default)]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Security scheme declaration (OpenAPI 3 and Swagger 2 shapes)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "type", default)]
    pub scheme_type: String,

    #[serde(default)]
    pub description: Option<String>,

    /// apiKey: header/query/cookie parameter name
    #[serde(default)]
    pub name: Option<String>,

    /// apiKey: header, query or cookie
    #[serde(rename = "in", default)]
    pub location: Option<String>,

    /// http: basic, bearer, ...
    #[serde(default)]
    pub scheme: Option<String>,

    #[serde(default)]
    pub bearer_format: Option<String>,

    /// OpenAPI 3 OAuth flows in declaration order
    #[serde(default)]
    pub flows: IndexMap<String, OAuthFlow>,

    /// Swagger 2 OAuth flow name
    #[serde(default)]
    pub flow: Option<String>,

    #[serde(default)]
    pub authorization_url: Option<String>,

    #[serde(default)]
    pub token_url: Option<String>,

    /// Swagger 2 scopes
    #[serde(default)]
    pub scopes: IndexMap<String, String>,

    #[serde(default)]
    pub open_id_connect_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(default)]
    pub authorization_url: Option<String>,

    #[serde(default)]
    pub token_url: Option<String>,

    #[serde(default)]
    pub refresh_url: Option<String>,

    #[serde(default)]
    pub scopes: IndexMap<String, String>,
}
