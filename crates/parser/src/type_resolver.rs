//! Schema fragment to `TypeDescriptor` resolution
//!
//! Resolution is pure: gaps are returned alongside the descriptor and only
//! turned into diagnostics by [`TypeResolver::resolve_into`].
//!
//! ## Mapping rules
//! - `string`/`integer`/`number`/`boolean` go through [`PRIMITIVE_TABLE`];
//!   an unknown format falls back to the bare type's default
//! - `array` → `List(items)`
//! - `object` with a value schema → `Map(value)`, otherwise `Map(Any)`
//! - `$ref` to a model → `Reference(name)`; to an alias → the alias's type
//! - anything unknown → `Map(Any)`

use crate::openapi::{AdditionalProperties, Schema, SchemaType};
use crate::schema_table::{LookupFailure, SchemaTable};
use dataconnector_generator_common::{
    DiagnosticKind, Diagnostics, PrimitiveKind, TypeDescriptor,
};

/// `(type, format, kind)` rows; a `None` format is the bare type's default
pub const PRIMITIVE_TABLE: &[(&str, Option<&str>, PrimitiveKind)] = &[
    ("string", None, PrimitiveKind::String),
    ("string", Some("date"), PrimitiveKind::Date),
    ("string", Some("date-time"), PrimitiveKind::DateTime),
    ("string", Some("byte"), PrimitiveKind::ByteSequence),
    ("string", Some("binary"), PrimitiveKind::ByteSequence),
    ("integer", None, PrimitiveKind::Integer32),
    ("integer", Some("int32"), PrimitiveKind::Integer32),
    ("integer", Some("int64"), PrimitiveKind::Integer64),
    ("number", None, PrimitiveKind::Double),
    ("number", Some("float"), PrimitiveKind::Float),
    ("number", Some("double"), PrimitiveKind::Double),
    ("boolean", None, PrimitiveKind::Boolean),
];

/// Look up a primitive kind, falling back to the bare type's default
pub fn primitive_kind(type_name: &str, format: Option<&str>) -> Option<PrimitiveKind> {
    let exact = format.and_then(|format| {
        PRIMITIVE_TABLE
            .iter()
            .find(|(t, f, _)| *t == type_name && *f == Some(format))
    });
    exact
        .or_else(|| {
            PRIMITIVE_TABLE
                .iter()
                .find(|(t, f, _)| *t == type_name && f.is_none())
        })
        .map(|(_, _, kind)| *kind)
}

/// Something the resolver had to degrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionGap {
    MissingSchema { reference: String },
    NonLocalReference { reference: String },
    UnsupportedComposition,
}

impl ResolutionGap {
    pub fn message(&self) -> String {
        match self {
            ResolutionGap::MissingSchema { reference } => {
                format!("reference '{}' does not resolve to a declared schema", reference)
            }
            ResolutionGap::NonLocalReference { reference } => {
                format!("reference '{}' is not a local schema reference", reference)
            }
            ResolutionGap::UnsupportedComposition => {
                "schema composition (allOf/oneOf/anyOf) is not supported".to_string()
            }
        }
    }

    fn kind(&self) -> DiagnosticKind {
        match self {
            ResolutionGap::UnsupportedComposition => DiagnosticKind::Unsupported,
            _ => DiagnosticKind::ResolutionGap,
        }
    }
}

/// Resolved descriptor and everything that degraded on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub descriptor: TypeDescriptor,
    pub gaps: Vec<ResolutionGap>,
}

/// Arena-index guard against reference cycles
///
/// Marks the named schemas on the current resolution path, indexed by their
/// declaration position in the schema table.
#[derive(Debug, Clone)]
pub struct Visited {
    on_path: Vec<bool>,
}

impl Visited {
    pub fn new(table: &SchemaTable<'_>) -> Self {
        Self {
            on_path: vec![false; table.len()],
        }
    }

    /// Mark `index` as entered; false if it was already on the path
    fn enter(&mut self, index: usize) -> bool {
        match self.on_path.get_mut(index) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        }
    }

    fn leave(&mut self, index: usize) {
        if let Some(slot) = self.on_path.get_mut(index) {
            *slot = false;
        }
    }
}

/// Resolves schema fragments against one schema table
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    table: SchemaTable<'a>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(table: SchemaTable<'a>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> SchemaTable<'a> {
        self.table
    }

    /// Resolve a fragment with a fresh visited set
    pub fn resolve(&self, fragment: &Schema) -> Resolution {
        let mut visited = Visited::new(&self.table);
        self.resolve_with(fragment, &mut visited)
    }

    /// Resolve a fragment, sharing the caller's visited set
    pub fn resolve_with(&self, fragment: &Schema, visited: &mut Visited) -> Resolution {
        let mut gaps = Vec::new();
        let descriptor = self.resolve_fragment(fragment, visited, &mut gaps);
        Resolution { descriptor, gaps }
    }

    /// Resolve and record any gaps as diagnostics at `location`
    pub fn resolve_into(
        &self,
        fragment: &Schema,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> TypeDescriptor {
        let resolution = self.resolve(fragment);
        for gap in &resolution.gaps {
            diagnostics.warning(gap.kind(), location, gap.message());
        }
        resolution.descriptor
    }

    fn resolve_fragment(
        &self,
        fragment: &Schema,
        visited: &mut Visited,
        gaps: &mut Vec<ResolutionGap>,
    ) -> TypeDescriptor {
        if let Some(reference) = &fragment.reference {
            return self.resolve_reference(reference, visited, gaps);
        }

        if fragment.is_composed() {
            return match single_branch(fragment) {
                Some(branch) => self.resolve_fragment(branch, visited, gaps),
                None => {
                    gaps.push(ResolutionGap::UnsupportedComposition);
                    TypeDescriptor::open_object()
                }
            };
        }

        match fragment.type_name() {
            Some("array") => self.resolve_items(fragment, visited, gaps),
            Some("object") => self.resolve_object(fragment, visited, gaps),
            Some("null") => TypeDescriptor::Any,
            Some(type_name) => match primitive_kind(type_name, fragment.format.as_deref()) {
                Some(kind) => TypeDescriptor::Primitive(kind),
                None => {
                    tracing::debug!(type_name, "Unknown schema type, using open object");
                    TypeDescriptor::open_object()
                }
            },
            None if !fragment.properties.is_empty() || fragment.additional_properties.is_some() => {
                self.resolve_object(fragment, visited, gaps)
            }
            None if fragment.items.is_some() => self.resolve_items(fragment, visited, gaps),
            None => TypeDescriptor::Any,
        }
    }

    fn resolve_reference(
        &self,
        reference: &str,
        visited: &mut Visited,
        gaps: &mut Vec<ResolutionGap>,
    ) -> TypeDescriptor {
        let entry = match self.table.lookup(reference) {
            Ok(entry) => entry,
            Err(LookupFailure::NonLocal) => {
                gaps.push(ResolutionGap::NonLocalReference {
                    reference: reference.to_string(),
                });
                return TypeDescriptor::open_object();
            }
            Err(LookupFailure::Missing(_)) => {
                gaps.push(ResolutionGap::MissingSchema {
                    reference: reference.to_string(),
                });
                return TypeDescriptor::open_object();
            }
        };

        if entry.schema.is_model() {
            return TypeDescriptor::Reference(entry.name.to_string());
        }

        // Aliases are inlined; re-entering one means a cycle
        if !visited.enter(entry.index) {
            tracing::debug!(schema = entry.name, "Reference cycle, keeping shallow reference");
            return TypeDescriptor::Reference(entry.name.to_string());
        }
        let descriptor = self.resolve_fragment(entry.schema, visited, gaps);
        visited.leave(entry.index);
        descriptor
    }

    fn resolve_items(
        &self,
        fragment: &Schema,
        visited: &mut Visited,
        gaps: &mut Vec<ResolutionGap>,
    ) -> TypeDescriptor {
        let element = match &fragment.items {
            Some(items) => self.resolve_fragment(items, visited, gaps),
            None => TypeDescriptor::Any,
        };
        TypeDescriptor::list_of(element)
    }

    fn resolve_object(
        &self,
        fragment: &Schema,
        visited: &mut Visited,
        gaps: &mut Vec<ResolutionGap>,
    ) -> TypeDescriptor {
        match &fragment.additional_properties {
            Some(AdditionalProperties::Schema(value)) => {
                TypeDescriptor::map_of(self.resolve_fragment(value, visited, gaps))
            }
            Some(AdditionalProperties::Flag(_)) | None => TypeDescriptor::open_object(),
        }
    }
}

/// The one meaningful branch of a composition, ignoring `null` branches
fn single_branch(fragment: &Schema) -> Option<&Schema> {
    if !fragment.properties.is_empty() {
        return None;
    }
    let branches: Vec<&Schema> = fragment
        .all_of
        .iter()
        .chain(&fragment.one_of)
        .chain(&fragment.any_of)
        .filter(|branch| branch.type_name() != Some("null") || branch.reference.is_some())
        .collect();
    match branches.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Canonical schema fragment for a descriptor
///
/// Resolving the returned fragment yields the same descriptor again.
pub fn fragment_for(descriptor: &TypeDescriptor) -> Schema {
    match descriptor {
        TypeDescriptor::Primitive(kind) => {
            let (type_name, format) = PRIMITIVE_TABLE
                .iter()
                .find(|(_, _, k)| k == kind)
                .map(|(t, f, _)| (*t, *f))
                .unwrap_or(("string", None));
            Schema {
                schema_type: Some(SchemaType::Single(type_name.to_string())),
                format: format.map(str::to_string),
                ..Schema::default()
            }
        }
        TypeDescriptor::List(element) => Schema {
            schema_type: Some(SchemaType::Single("array".to_string())),
            items: Some(Box::new(fragment_for(element))),
            ..Schema::default()
        },
        TypeDescriptor::Map(value) => Schema {
            schema_type: Some(SchemaType::Single("object".to_string())),
            additional_properties: Some(match value.as_ref() {
                TypeDescriptor::Any => AdditionalProperties::Flag(true),
                other => AdditionalProperties::Schema(Box::new(fragment_for(other))),
            }),
            ..Schema::default()
        },
        TypeDescriptor::Reference(name) => Schema {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Schema::default()
        },
        TypeDescriptor::Any => Schema::default(),
    }
}
