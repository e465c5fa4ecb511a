//! Object class resolution against the API schemas
//!
//! For each mapped attribute, locates the schema fragment it reads from,
//! resolves its type, infers the directory type and cardinality, and checks
//! that the declared primary key is usable.

use crate::mapping::{AttributeDef, ObjectClassDef};
use crate::openapi::Schema;
use crate::schema_table::{LookupFailure, SchemaEntry, SchemaTable};
use crate::type_resolver::TypeResolver;
use crate::validation::json_pointer;
use dataconnector_generator_common::{
    AttributeMapping, AttributeSource, DiagnosticKind, Diagnostics, DirectoryType, TypeDescriptor,
};

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Property(String),
    Index(usize),
}

/// Parse a dot-segmented path expression such as `$.contact.emails[0]`
///
/// Filters, wildcards, recursive descent and non-numeric brackets are rejected.
pub fn parse_path_expression(expression: &str) -> Result<Vec<PathStep>, String> {
    let rest = expression
        .trim()
        .strip_prefix('$')
        .ok_or_else(|| format!("path expression '{}' must start with '$'", expression))?;

    let mut steps = Vec::new();
    let mut rest = rest;
    while !rest.is_empty() {
        if rest.starts_with("..") {
            return Err(format!("recursive descent in '{}' is not supported", expression));
        }
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            let segment = &after[..end];
            if segment.is_empty() {
                return Err(format!("empty segment in '{}'", expression));
            }
            if segment.contains('*') {
                return Err(format!("wildcard in '{}' is not supported", expression));
            }
            steps.push(match segment.parse::<usize>() {
                Ok(index) => PathStep::Index(index),
                Err(_) => PathStep::Property(segment.to_string()),
            });
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after
                .find(']')
                .ok_or_else(|| format!("unterminated bracket in '{}'", expression))?;
            let inner = after[..end].trim();
            if inner.starts_with('?') {
                return Err(format!("filter in '{}' is not supported", expression));
            }
            if inner == "*" {
                return Err(format!("wildcard in '{}' is not supported", expression));
            }
            let index = inner
                .parse::<usize>()
                .map_err(|_| format!("bracket '[{}]' in '{}' is not a numeric index", inner, expression))?;
            steps.push(PathStep::Index(index));
            rest = &after[end + 1..];
        } else {
            return Err(format!("unexpected character in '{}'", expression));
        }
    }

    if steps.is_empty() {
        return Err(format!("path expression '{}' selects no property", expression));
    }
    Ok(steps)
}

/// The schema fragment an attribute reads from
#[derive(Debug, Clone, Copy)]
struct Located<'s> {
    fragment: &'s Schema,
    /// Object schema declaring the final property, for its `required` list
    parent: Option<&'s Schema>,
    property: Option<&'s str>,
}

enum LocateError {
    /// The path is well formed but leads nowhere
    NotFound(String),
    /// The path uses a construct outside the supported subset
    Rejected(String),
}

/// Object class after resolution, before class names are allocated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedObjectClass {
    /// Key of the class in the mapping document
    pub key: String,
    pub ldap_name: String,
    pub schema_name: String,
    pub api_endpoint: Option<String>,
    pub attributes: Vec<AttributeMapping>,
    pub primary_key: Option<String>,
}

/// Resolves mapping object classes against a schema table
pub struct MappingResolver<'a> {
    resolver: TypeResolver<'a>,
}

impl<'a> MappingResolver<'a> {
    pub fn new(resolver: TypeResolver<'a>) -> Self {
        Self { resolver }
    }

    fn table(&self) -> SchemaTable<'a> {
        self.resolver.table()
    }

    /// Resolve one object class; `None` means it was excluded with a diagnostic
    pub fn resolve(
        &self,
        key: &str,
        class: &ObjectClassDef,
        diagnostics: &mut Diagnostics,
    ) -> Option<ResolvedObjectClass> {
        let location = json_pointer(&["objectClasses", key]);

        let source = self.source_schema(class, &location, diagnostics)?;
        tracing::debug!(object_class = key, schema = source.name, "Resolving object class");

        let declared_pk = class.declared_primary_key();
        let attributes: Vec<AttributeMapping> = class
            .attributes
            .iter()
            .enumerate()
            .map(|(i, attribute)| {
                let attr_at = format!("{}/attributes/{}", location, i);
                let is_pk = declared_pk == Some(attribute.ldap_name.as_str());
                self.resolve_attribute(source.schema, attribute, is_pk, &attr_at, diagnostics)
            })
            .collect();

        let primary_key = match declared_pk {
            Some(pk) => match attributes.iter().find(|a| a.ldap_name == pk) {
                Some(attribute) if attribute.resolved => Some(pk.to_string()),
                Some(_) => {
                    diagnostics.error(
                        DiagnosticKind::MappingIntegrity,
                        &location,
                        format!(
                            "primary key '{}' cannot be resolved in schema '{}'; object class excluded",
                            pk, source.name
                        ),
                    );
                    return None;
                }
                None => {
                    diagnostics.error(
                        DiagnosticKind::MappingIntegrity,
                        &location,
                        format!("primary key '{}' is not a mapped attribute; object class excluded", pk),
                    );
                    return None;
                }
            },
            None => {
                diagnostics.warning(
                    DiagnosticKind::MissingPrimaryKey,
                    &location,
                    "no primary key declared; identity-based operations are unavailable",
                );
                None
            }
        };

        Some(ResolvedObjectClass {
            key: key.to_string(),
            ldap_name: class.ldap_name.clone(),
            schema_name: source.name.to_string(),
            api_endpoint: class.api_endpoint.clone(),
            attributes,
            primary_key,
        })
    }

    /// Named model schema an object class reads from, following aliases
    fn source_schema(
        &self,
        class: &ObjectClassDef,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<SchemaEntry<'a>> {
        let entry = match (&class.open_api_schema_ref, &class.open_api_schema_name) {
            (Some(reference), _) => match self.table().lookup(reference) {
                Ok(entry) => Some(entry),
                Err(LookupFailure::NonLocal) => {
                    diagnostics.error(
                        DiagnosticKind::MappingIntegrity,
                        format!("{}/openApiSchemaRef", location),
                        format!("'{}' is not a local schema reference; object class excluded", reference),
                    );
                    return None;
                }
                Err(LookupFailure::Missing(_)) => None,
            },
            (None, Some(name)) => self.table().get(name),
            (None, None) => None,
        };

        let Some(mut entry) = entry else {
            let wanted = class
                .open_api_schema_ref
                .as_deref()
                .or(class.open_api_schema_name.as_deref())
                .unwrap_or_default();
            diagnostics.error(
                DiagnosticKind::MappingIntegrity,
                location,
                format!("source schema '{}' is not declared; object class excluded", wanted),
            );
            return None;
        };

        let mut hops = 0;
        while let Some(reference) = &entry.schema.reference {
            hops += 1;
            match self.table().lookup(reference) {
                Ok(next) if hops <= self.table().len() => entry = next,
                _ => break,
            }
        }

        if !entry.schema.is_model() {
            diagnostics.error(
                DiagnosticKind::MappingIntegrity,
                location,
                format!("source schema '{}' is not an object schema; object class excluded", entry.name),
            );
            return None;
        }
        Some(entry)
    }

    fn resolve_attribute(
        &self,
        root: &Schema,
        attribute: &AttributeDef,
        is_pk: bool,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> AttributeMapping {
        let source = attribute.source();
        let located = match &source {
            AttributeSource::Property(name) => match root.properties.get_key_value(name) {
                Some((property, fragment)) => Ok(Located {
                    fragment,
                    parent: Some(root),
                    property: Some(property.as_str()),
                }),
                None => Err(LocateError::NotFound(format!("property '{}' not found", name))),
            },
            AttributeSource::PathExpression(expression) => match parse_path_expression(expression) {
                Ok(steps) => self.navigate(root, &steps),
                Err(reason) => Err(LocateError::Rejected(reason)),
            },
        };

        let (ty, resolved, default_required, default_read_only) = match located {
            Ok(located) => {
                let ty = self.resolver.resolve_into(located.fragment, location, diagnostics);
                let required = match (located.parent, located.property) {
                    (Some(parent), Some(property)) => parent.is_required(property),
                    _ => false,
                };
                (ty, true, required, located.fragment.read_only)
            }
            Err(LocateError::NotFound(reason)) => {
                diagnostics.warning(
                    DiagnosticKind::ResolutionGap,
                    location,
                    format!(
                        "attribute '{}': {} ('{}'); using an open-ended type",
                        attribute.ldap_name,
                        reason,
                        source.as_str()
                    ),
                );
                (TypeDescriptor::Any, false, false, false)
            }
            Err(LocateError::Rejected(reason)) => {
                diagnostics.warning(
                    DiagnosticKind::Unsupported,
                    location,
                    format!("attribute '{}': {}; using an open-ended type", attribute.ldap_name, reason),
                );
                (TypeDescriptor::Any, false, false, false)
            }
        };

        let inferred = ty.directory_type();
        let directory_type = match &attribute.type_override {
            Some(raw) => match raw.parse::<DirectoryType>() {
                Ok(overridden) => overridden,
                Err(reason) => {
                    diagnostics.warning(
                        DiagnosticKind::InvalidOverride,
                        format!("{}/typeOverride", location),
                        format!("{}; keeping inferred type '{}'", reason, inferred),
                    );
                    inferred
                }
            },
            None => inferred,
        };

        AttributeMapping {
            ldap_name: attribute.ldap_name.clone(),
            multi_valued: ty.is_list(),
            ty,
            directory_type,
            read_only: attribute.read_only.unwrap_or(default_read_only),
            required: attribute.required.unwrap_or(default_required),
            primary_key: is_pk,
            resolved,
            source,
            api_query_param: attribute.api_query_param.clone(),
        }
    }

    /// Walk `properties`/`items` from `root`, following schema references
    fn navigate<'s>(&self, root: &'s Schema, steps: &[PathStep]) -> Result<Located<'s>, LocateError>
    where
        'a: 's,
    {
        let mut located = Located {
            fragment: root,
            parent: None,
            property: None,
        };

        for step in steps {
            let current = self.dereference(located.fragment)?;
            located = match step {
                PathStep::Property(name) => match current.properties.get_key_value(name) {
                    Some((property, next)) => Located {
                        fragment: next,
                        parent: Some(current),
                        property: Some(property.as_str()),
                    },
                    None => return Err(LocateError::NotFound(format!("property '{}' not found", name))),
                },
                PathStep::Index(index) => match &current.items {
                    Some(items) => Located {
                        fragment: items,
                        parent: None,
                        property: None,
                    },
                    None => {
                        return Err(LocateError::NotFound(format!(
                            "index [{}] applied to a non-array schema",
                            index
                        )))
                    }
                },
            };
        }
        Ok(located)
    }

    /// Follow `$ref` aliases until a concrete schema, guarding against cycles
    fn dereference<'s>(&self, schema: &'s Schema) -> Result<&'s Schema, LocateError>
    where
        'a: 's,
    {
        let table = self.table();
        let mut seen = vec![false; table.len()];
        let mut current = schema;
        while let Some(reference) = &current.reference {
            let entry = table
                .lookup(reference)
                .map_err(|_| LocateError::NotFound(format!("reference '{}' cannot be followed", reference)))?;
            if std::mem::replace(&mut seen[entry.index], true) {
                return Err(LocateError::NotFound(format!("reference cycle through '{}'", entry.name)));
            }
            current = entry.schema;
        }
        Ok(current)
    }
}
