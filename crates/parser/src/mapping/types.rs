//! Attribute mapping document type definitions

use dataconnector_generator_common::AttributeSource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Mapping document root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSpec {
    pub dn_structure: DnStructureDef,

    /// Object classes keyed by mapping name, in declaration order
    pub object_classes: IndexMap<String, ObjectClassDef>,
}

/// How directory names are built from API parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnStructureDef {
    pub base_dn_suffix: String,
    pub rdn_attribute: String,

    #[serde(default)]
    pub components: Vec<DnComponentDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnComponentDef {
    pub ldap_name: String,
    pub open_api_parameter_name: String,
}

/// One directory object class and its source schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectClassDef {
    pub ldap_name: String,

    /// `#/components/schemas/User` style reference
    #[serde(default)]
    pub open_api_schema_ref: Option<String>,

    /// Bare schema name
    #[serde(default)]
    pub open_api_schema_name: Option<String>,

    /// Path template of the entity, e.g. `/users/{userId}`
    #[serde(default)]
    pub api_endpoint: Option<String>,

    #[serde(default)]
    pub primary_key_ldap_attribute: Option<String>,

    #[serde(default)]
    pub primary_key_open_api_parameter_name: Option<String>,

    #[serde(default)]
    pub primary_key_json_path: Option<String>,

    pub attributes: Vec<AttributeDef>,
}

impl ObjectClassDef {
    /// Name of the declared primary-key attribute, from either declaration form
    pub fn declared_primary_key(&self) -> Option<&str> {
        self.primary_key_ldap_attribute.as_deref().or_else(|| {
            self.attributes
                .iter()
                .find(|a| a.primary_key)
                .map(|a| a.ldap_name.as_str())
        })
    }
}

/// Correspondence between one directory attribute and an API field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    pub ldap_name: String,

    #[serde(default)]
    pub open_api_property_name: Option<String>,

    #[serde(default)]
    pub json_path: Option<String>,

    #[serde(default)]
    pub type_override: Option<String>,

    #[serde(default)]
    pub read_only: Option<bool>,

    #[serde(default)]
    pub required: Option<bool>,

    #[serde(default)]
    pub primary_key: bool,

    /// Query parameter a directory filter on this attribute translates to
    #[serde(default)]
    pub api_query_param: Option<String>,
}

impl AttributeDef {
    /// Where the attribute value comes from
    ///
    /// Validation guarantees exactly one of the two forms is present.
    pub fn source(&self) -> AttributeSource {
        match (&self.open_api_property_name, &self.json_path) {
            (Some(property), _) => AttributeSource::Property(property.clone()),
            (None, Some(path)) => AttributeSource::PathExpression(path.clone()),
            (None, None) => AttributeSource::Property(self.ldap_name.clone()),
        }
    }
}
