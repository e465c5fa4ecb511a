//! Connector intermediate representation
//!
//! Every collection keeps declaration order so repeated runs over the same
//! inputs serialize byte-identically.

use crate::types::{DirectoryType, TypeDescriptor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Fully resolved connector description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorIr {
    pub metadata: ApiMetadata,
    pub names: ConnectorNames,
    /// Resolved models, unique by schema name
    pub models: Vec<ModelDescriptor>,
    pub operations: Vec<OperationDescriptor>,
    pub capabilities: BTreeSet<Capability>,
    /// Credential requirements, unique, in first-reference order
    pub auth: Vec<AuthRequirement>,
    pub object_classes: Vec<ObjectClassMapping>,
    pub dn_structure: DnStructure,
    pub connection_properties: Vec<ConnectionProperty>,
    pub test_connection: Option<TestConnectionTarget>,
    /// Mapping document exactly as loaded
    pub mapping_source: serde_json::Value,
}

impl ConnectorIr {
    pub fn model(&self, schema_name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.schema_name == schema_name)
    }

    pub fn operation(&self, operation_id: &str) -> Option<&OperationDescriptor> {
        self.operations.iter().find(|o| o.operation_id == operation_id)
    }

    pub fn object_class(&self, ldap_name: &str) -> Option<&ObjectClassMapping> {
        self.object_classes.iter().find(|c| c.ldap_name == ldap_name)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Connection property playing `role`, optionally scoped to one scheme
    pub fn property(&self, role: PropertyRole, scheme: Option<&str>) -> Option<&ConnectionProperty> {
        self.connection_properties
            .iter()
            .find(|p| p.role == role && (scheme.is_none() || p.scheme.as_deref() == scheme))
    }
}

/// Global API facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    /// First server URL, possibly still containing `{variable}` placeholders
    pub base_url: Option<String>,
    /// `base_url` with server-variable defaults substituted
    pub base_url_example: Option<String>,
    pub server_variables: IndexMap<String, String>,
}

/// Derived class and package names shared by every artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorNames {
    pub display_name: String,
    pub package_name: String,
    pub client_class: String,
    pub connector_class: String,
    pub request_converter_class: String,
    pub response_converter_class: String,
    pub backend_request_class: String,
    pub backend_response_class: String,
    /// Field names the connector class uses for its collaborators
    pub client_var: String,
    pub response_converter_var: String,
}

/// A schema rendered as a data class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub schema_name: String,
    pub class_name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Property name as it appears on the wire
    pub property_name: String,
    pub field_name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub required: bool,
    pub read_only: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Methods considered when walking a path item, in walk order
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lowercase key used in a path item
    pub fn key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Body => write!(f, "body"),
        }
    }
}

/// Success payload of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "lowercase")]
pub enum ResponsePayload {
    Typed(TypeDescriptor),
    /// A success response that carries no body
    Empty,
}

impl ResponsePayload {
    pub fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        match self {
            ResponsePayload::Typed(ty) => Some(ty),
            ResponsePayload::Empty => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    /// Stable identity: declared `operationId` or a synthesized one
    pub operation_id: String,
    pub id_synthesized: bool,
    /// Client method name
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
    /// `None` when no success response is declared
    pub response: Option<ResponsePayload>,
}

impl OperationDescriptor {
    pub fn path_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
    }

    pub fn body_parameter(&self) -> Option<&ParameterDescriptor> {
        self.parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
    }

    pub fn response_type(&self) -> Option<&TypeDescriptor> {
        self.response.as_ref().and_then(ResponsePayload::type_descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub name: String,
    pub variable_name: String,
    pub location: ParameterLocation,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub required: bool,
    pub description: Option<String>,
}

/// Facet the generated connector advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    Search,
    Insertion,
    Modification,
    Deletion,
    TestConnect,
    SchemaExtraction,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Search => "Search",
            Capability::Insertion => "Insertion",
            Capability::Modification => "Modification",
            Capability::Deletion => "Deletion",
            Capability::TestConnect => "TestConnect",
            Capability::SchemaExtraction => "SchemaExtraction",
        };
        f.write_str(name)
    }
}

/// Where an attribute's value comes from in the source schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AttributeSource {
    Property(String),
    PathExpression(String),
}

impl AttributeSource {
    pub fn as_str(&self) -> &str {
        match self {
            AttributeSource::Property(s) | AttributeSource::PathExpression(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeMapping {
    pub ldap_name: String,
    pub source: AttributeSource,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub directory_type: DirectoryType,
    pub multi_valued: bool,
    pub read_only: bool,
    pub required: bool,
    pub primary_key: bool,
    /// False when the source could not be located and the type degraded
    pub resolved: bool,
    pub api_query_param: Option<String>,
}

/// Operation identities a converter dispatches to for one object class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBindings {
    pub search: Option<String>,
    pub lookup: Option<String>,
    pub insert: Option<String>,
    pub modify: Option<String>,
    pub delete: Option<String>,
}

impl OperationBindings {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.lookup.is_none()
            && self.insert.is_none()
            && self.modify.is_none()
            && self.delete.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectClassMapping {
    pub ldap_name: String,
    pub schema_name: String,
    /// Class name of the resolved source model
    pub model_class: String,
    /// Converter method dedicated to this class
    pub handler: String,
    pub api_endpoint: Option<String>,
    pub attributes: Vec<AttributeMapping>,
    /// Directory name of the primary-key attribute, when one was declared
    pub primary_key: Option<String>,
    pub bindings: OperationBindings,
}

impl ObjectClassMapping {
    pub fn primary_key_attribute(&self) -> Option<&AttributeMapping> {
        self.attributes.iter().find(|a| a.primary_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OAuthFlowKind {
    AuthorizationCode,
    ClientCredentials,
    Implicit,
    Password,
    OpenIdConnect,
}

/// A credential the connector must be configured with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthRequirement {
    #[serde(rename_all = "camelCase")]
    ApiKey {
        scheme: String,
        /// Header, query or cookie name, verbatim
        name: String,
        location: ApiKeyLocation,
    },
    HttpBasic,
    #[serde(rename_all = "camelCase")]
    BearerToken {
        scheme: String,
        bearer_format: Option<String>,
    },
    /// Detected but not executed; the connector receives the settings only
    #[serde(rename_all = "camelCase")]
    OAuthPartial {
        scheme: String,
        flow: OAuthFlowKind,
        authorization_url: Option<String>,
        token_url: Option<String>,
        /// OpenID Connect discovery document
        discovery_url: Option<String>,
        scopes: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Password,
    Url,
}

/// What a connection property configures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyRole {
    BaseUrl,
    ApiKey,
    Username,
    Password,
    BearerToken,
    ClientId,
    ClientSecret,
    AuthorizationUrl,
    TokenUrl,
    DiscoveryUrl,
    Scopes,
}

/// A setting the connector exposes to its operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProperty {
    pub name: String,
    pub label: String,
    pub description: String,
    pub kind: PropertyKind,
    pub required: bool,
    pub default: Option<String>,
    pub role: PropertyRole,
    /// Security scheme the property belongs to, for scheme-scoped credentials
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnStructure {
    pub base_dn_suffix: String,
    pub rdn_attribute: String,
    pub components: Vec<DnComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnComponent {
    pub ldap_name: String,
    pub parameter_name: String,
}

/// Operation invoked to verify connectivity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionTarget {
    pub operation_id: String,
    pub name: String,
    pub path: String,
    pub has_parameters: bool,
}
