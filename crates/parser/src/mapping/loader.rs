//! Mapping document loader

use super::types::{DnStructureDef, MappingSpec, ObjectClassDef};
use crate::source;
use crate::validation;
use dataconnector_generator_common::{DnComponent, DnStructure, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

const DOCUMENT: &str = "mapping";

/// A validated mapping document
///
/// Keeps the raw tree next to the typed view so it can be persisted verbatim.
#[derive(Debug, Clone)]
pub struct MappingDocument {
    spec: MappingSpec,
    raw: Value,
}

impl MappingDocument {
    /// Load a mapping document from a JSON or YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let value = source::read_document(path.as_ref(), DOCUMENT)?;
        Self::from_value(value)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(source::parse_json(json, DOCUMENT)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_value(source::parse_yaml(yaml, DOCUMENT)?)
    }

    /// Validate and type a parsed tree
    pub fn from_value(value: Value) -> Result<Self> {
        validation::validate_mapping(&value)?;
        let spec: MappingSpec = source::into_typed(value.clone(), DOCUMENT)?;
        tracing::debug!(
            object_classes = spec.object_classes.len(),
            "Loaded mapping document"
        );
        Ok(Self { spec, raw: value })
    }

    pub fn object_classes(&self) -> &IndexMap<String, ObjectClassDef> {
        &self.spec.object_classes
    }

    pub fn object_class(&self, name: &str) -> Option<&ObjectClassDef> {
        self.spec.object_classes.get(name)
    }

    pub fn dn_structure_def(&self) -> &DnStructureDef {
        &self.spec.dn_structure
    }

    /// DN structure in IR form
    pub fn dn_structure(&self) -> DnStructure {
        let def = &self.spec.dn_structure;
        DnStructure {
            base_dn_suffix: def.base_dn_suffix.clone(),
            rdn_attribute: def.rdn_attribute.clone(),
            components: def
                .components
                .iter()
                .map(|c| DnComponent {
                    ldap_name: c.ldap_name.clone(),
                    parameter_name: c.open_api_parameter_name.clone(),
                })
                .collect(),
        }
    }

    /// The document exactly as it was read
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataconnector_generator_common::{AttributeSource, GeneratorError};

    const MAPPING: &str = r##"{
        "dnStructure": {
            "baseDnSuffix": "o=rest",
            "rdnAttribute": "uid",
            "components": [{ "ldapName": "uid", "openApiParameterName": "userId" }]
        },
        "objectClasses": {
            "person": {
                "ldapName": "inetOrgPerson",
                "openApiSchemaRef": "#/components/schemas/User",
                "apiEndpoint": "/users/{userId}",
                "primaryKeyLdapAttribute": "uid",
                "attributes": [
                    { "ldapName": "uid", "openApiPropertyName": "id" },
                    { "ldapName": "mail", "jsonPath": "$.contact.email", "readOnly": true }
                ]
            },
            "group": {
                "ldapName": "groupOfNames",
                "openApiSchemaName": "Group",
                "attributes": [
                    { "ldapName": "cn", "openApiPropertyName": "name", "primaryKey": true }
                ]
            }
        }
    }"##;

    #[test]
    fn test_load_mapping_json() {
        let doc = MappingDocument::from_json(MAPPING).unwrap();
        let names: Vec<_> = doc.object_classes().keys().cloned().collect();
        assert_eq!(names, vec!["person", "group"]);

        let person = doc.object_class("person").unwrap();
        assert_eq!(person.declared_primary_key(), Some("uid"));
        assert_eq!(
            person.attributes[1].source(),
            AttributeSource::PathExpression("$.contact.email".to_string())
        );
        assert_eq!(person.attributes[1].read_only, Some(true));
        assert_eq!(person.attributes[0].required, None);

        let group = doc.object_class("group").unwrap();
        assert_eq!(group.declared_primary_key(), Some("cn"));
    }

    #[test]
    fn test_dn_structure() {
        let doc = MappingDocument::from_json(MAPPING).unwrap();
        let dn = doc.dn_structure();
        assert_eq!(dn.base_dn_suffix, "o=rest");
        assert_eq!(dn.components[0].parameter_name, "userId");
    }

    #[test]
    fn test_raw_is_verbatim() {
        let doc = MappingDocument::from_json(MAPPING).unwrap();
        let expected: Value = serde_json::from_str(MAPPING).unwrap();
        assert_eq!(doc.raw(), &expected);
    }

    #[test]
    fn test_structural_error_is_fatal() {
        let err = MappingDocument::from_json(r#"{ "objectClasses": {} }"#).unwrap_err();
        assert!(matches!(err, GeneratorError::Structural { .. }));
    }

    #[test]
    fn test_load_yaml() {
        let yaml = r#"
dnStructure:
  baseDnSuffix: o=rest
  rdnAttribute: uid
objectClasses:
  person:
    ldapName: person
    openApiSchemaName: User
    attributes:
      - ldapName: uid
        openApiPropertyName: id
        primaryKey: true
"#;
        let doc = MappingDocument::from_yaml(yaml).unwrap();
        assert_eq!(doc.object_class("person").unwrap().attributes.len(), 1);
    }
}
