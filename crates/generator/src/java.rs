//! Java rendering of IR type descriptors

use dataconnector_generator_common::{ConnectorIr, PrimitiveKind, TypeDescriptor};
use std::collections::{BTreeSet, HashMap};

/// Root package of the connector SDK the generated sources build against
pub const SDK_PACKAGE: &str = "com.radiantlogic.iddm.connector.sdk";

pub const JSON_PROPERTY_ANNOTATION: &str = "com.fasterxml.jackson.annotation.JsonProperty";

/// Fully qualified SDK class name
pub fn sdk_class(relative: &str) -> String {
    format!("{}.{}", SDK_PACKAGE, relative)
}

/// Simple name of a fully qualified class
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Maps IR types to Java source types
///
/// References are rendered through the model class the assembler allocated
/// for the referenced schema.
#[derive(Debug, Clone, Default)]
pub struct JavaTypes {
    classes: HashMap<String, String>,
}

impl JavaTypes {
    pub fn new(ir: &ConnectorIr) -> Self {
        let classes = ir
            .models
            .iter()
            .map(|m| (m.schema_name.clone(), m.class_name.clone()))
            .collect();
        Self { classes }
    }

    /// Source type of a descriptor
    ///
    /// ```
    /// use dataconnector_generator_common::{PrimitiveKind, TypeDescriptor};
    /// use dataconnector_generator_generator::JavaTypes;
    ///
    /// let types = JavaTypes::default();
    /// let ty = TypeDescriptor::list_of(TypeDescriptor::Primitive(PrimitiveKind::DateTime));
    /// assert_eq!(types.render(&ty), "List<OffsetDateTime>");
    /// assert_eq!(types.render(&TypeDescriptor::open_object()), "Map<String, Object>");
    /// ```
    pub fn render(&self, ty: &TypeDescriptor) -> String {
        match ty {
            TypeDescriptor::Primitive(kind) => primitive(*kind).to_string(),
            TypeDescriptor::List(inner) => format!("List<{}>", self.render(inner)),
            TypeDescriptor::Map(inner) => format!("Map<String, {}>", self.render(inner)),
            TypeDescriptor::Reference(name) => self
                .classes
                .get(name)
                .cloned()
                .unwrap_or_else(|| "Object".to_string()),
            TypeDescriptor::Any => "Object".to_string(),
        }
    }

    /// Payload type for operation metadata; `Void` when there is no payload
    pub fn payload(&self, ty: Option<&TypeDescriptor>) -> String {
        ty.map(|t| self.render(t)).unwrap_or_else(|| "Void".to_string())
    }

    /// Add the imports `ty` needs outside the model package
    pub fn collect_imports(&self, ty: &TypeDescriptor, imports: &mut BTreeSet<String>) {
        match ty {
            TypeDescriptor::Primitive(PrimitiveKind::Date) => {
                imports.insert("java.time.LocalDate".to_string());
            }
            TypeDescriptor::Primitive(PrimitiveKind::DateTime) => {
                imports.insert("java.time.OffsetDateTime".to_string());
            }
            TypeDescriptor::List(inner) => {
                imports.insert("java.util.List".to_string());
                self.collect_imports(inner, imports);
            }
            TypeDescriptor::Map(inner) => {
                imports.insert("java.util.Map".to_string());
                self.collect_imports(inner, imports);
            }
            _ => {}
        }
    }
}

fn primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "String",
        PrimitiveKind::Integer32 => "Integer",
        PrimitiveKind::Integer64 => "Long",
        PrimitiveKind::Float => "Float",
        PrimitiveKind::Double => "Double",
        PrimitiveKind::Boolean => "Boolean",
        PrimitiveKind::ByteSequence => "byte[]",
        PrimitiveKind::Date => "LocalDate",
        PrimitiveKind::DateTime => "OffsetDateTime",
    }
}
