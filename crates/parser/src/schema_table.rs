//! Named schemas indexed for reference lookups

use crate::openapi::{local_name, Schema};
use indexmap::IndexMap;

const SCHEMA_PREFIXES: [&str; 2] = ["#/components/schemas/", "#/definitions/"];

/// Why a reference could not be followed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// Points outside the document or at a non-schema section
    NonLocal,
    /// Local reference to a schema that is not declared
    Missing(String),
}

/// Read-only view over the document's named schemas
///
/// Each schema has a stable arena index (its declaration position) used by
/// the resolver's visited set.
#[derive(Debug, Clone, Copy)]
pub struct SchemaTable<'a> {
    schemas: &'a IndexMap<String, Schema>,
}

/// A successful reference lookup
#[derive(Debug, Clone, Copy)]
pub struct SchemaEntry<'a> {
    pub index: usize,
    pub name: &'a str,
    pub schema: &'a Schema,
}

impl<'a> SchemaTable<'a> {
    pub fn new(schemas: &'a IndexMap<String, Schema>) -> Self {
        Self { schemas }
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<SchemaEntry<'a>> {
        self.schemas
            .get_full(name)
            .map(|(index, name, schema)| SchemaEntry {
                index,
                name: name.as_str(),
                schema,
            })
    }

    /// Follow a `#/components/schemas/X` or `#/definitions/X` reference
    pub fn lookup(&self, reference: &str) -> Result<SchemaEntry<'a>, LookupFailure> {
        let name = local_name(reference, &SCHEMA_PREFIXES).ok_or(LookupFailure::NonLocal)?;
        self.get(&name).ok_or(LookupFailure::Missing(name))
    }

    /// Named schemas in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Schema)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn is_model(&self, name: &str) -> bool {
        self.schemas.get(name).map(Schema::is_model).unwrap_or(false)
    }
}

/// Simple name at the end of any reference string
pub fn reference_simple_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemas() -> IndexMap<String, Schema> {
        let mut schemas = IndexMap::new();
        schemas.insert("User".to_string(), Schema::default());
        schemas.insert("Group".to_string(), Schema::default());
        schemas
    }

    #[test]
    fn test_lookup_both_prefixes() {
        let schemas = schemas();
        let table = SchemaTable::new(&schemas);
        assert_eq!(table.lookup("#/components/schemas/Group").unwrap().index, 1);
        assert_eq!(table.lookup("#/definitions/User").unwrap().name, "User");
    }

    #[test]
    fn test_lookup_failures() {
        let schemas = schemas();
        let table = SchemaTable::new(&schemas);
        assert_eq!(
            table.lookup("#/components/schemas/Ghost").unwrap_err(),
            LookupFailure::Missing("Ghost".to_string())
        );
        assert_eq!(
            table.lookup("common.yaml#/User").unwrap_err(),
            LookupFailure::NonLocal
        );
    }

    #[test]
    fn test_reference_simple_name() {
        assert_eq!(reference_simple_name("#/components/schemas/User"), "User");
        assert_eq!(reference_simple_name("User"), "User");
    }
}
