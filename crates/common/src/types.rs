//! Closed type algebra shared by every resolved artifact

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primitive kinds produced by the type resolver's format table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    String,
    Integer32,
    Integer64,
    Float,
    Double,
    Boolean,
    ByteSequence,
    Date,
    DateTime,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer32 => "integer32",
            PrimitiveKind::Integer64 => "integer64",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::ByteSequence => "byte-sequence",
            PrimitiveKind::Date => "date",
            PrimitiveKind::DateTime => "date-time",
        }
    }
}

/// Normalized type of a schema fragment
///
/// `Any` is the open-ended leaf for values of unknown shape. An open-ended
/// *object* is `Map(Any)`, see [`TypeDescriptor::open_object`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    List(Box<TypeDescriptor>),
    Map(Box<TypeDescriptor>),
    Reference(String),
    Any,
}

impl TypeDescriptor {
    /// `Map<string, Any>`, the degraded form of anything that could not be resolved
    pub fn open_object() -> Self {
        TypeDescriptor::Map(Box::new(TypeDescriptor::Any))
    }

    pub fn list_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(element))
    }

    pub fn map_of(value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(value))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TypeDescriptor::List(_))
    }

    /// Element type for lists, the type itself otherwise
    pub fn element(&self) -> &TypeDescriptor {
        match self {
            TypeDescriptor::List(inner) => inner,
            other => other,
        }
    }

    pub fn reference_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// All reference names reachable from this descriptor, in visit order
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeDescriptor::Reference(name) => out.push(name),
            TypeDescriptor::List(inner) | TypeDescriptor::Map(inner) => {
                inner.collect_references(out)
            }
            TypeDescriptor::Primitive(_) | TypeDescriptor::Any => {}
        }
    }

    /// Replace every reference rejected by `keep` with an open-ended object.
    ///
    /// Returns the names that were replaced.
    pub fn degrade_references<F>(&mut self, keep: &F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let mut degraded = Vec::new();
        self.degrade_into(keep, &mut degraded);
        degraded
    }

    fn degrade_into<F>(&mut self, keep: &F, degraded: &mut Vec<String>)
    where
        F: Fn(&str) -> bool,
    {
        match self {
            TypeDescriptor::Reference(name) if !keep(name) => {
                degraded.push(name.clone());
                *self = TypeDescriptor::open_object();
            }
            TypeDescriptor::List(inner) | TypeDescriptor::Map(inner) => {
                inner.degrade_into(keep, degraded)
            }
            _ => {}
        }
    }

    /// Directory attribute type for this descriptor.
    ///
    /// Lists map through their element because repetition is expressed by the
    /// multi-valued flag, not by a nested type.
    pub fn directory_type(&self) -> DirectoryType {
        match self.element() {
            TypeDescriptor::Primitive(kind) => match kind {
                PrimitiveKind::String => DirectoryType::String,
                PrimitiveKind::Integer32 => DirectoryType::Integer,
                PrimitiveKind::Integer64 => DirectoryType::Long,
                PrimitiveKind::Float | PrimitiveKind::Double => DirectoryType::Double,
                PrimitiveKind::Boolean => DirectoryType::Boolean,
                PrimitiveKind::ByteSequence => DirectoryType::Binary,
                PrimitiveKind::Date | PrimitiveKind::DateTime => DirectoryType::GeneralizedTime,
            },
            // Nested lists, maps, models and unknown shapes travel as strings
            _ => DirectoryType::String,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(kind) => write!(f, "{}", kind.as_str()),
            TypeDescriptor::List(inner) => write!(f, "list<{}>", inner),
            TypeDescriptor::Map(inner) => write!(f, "map<string, {}>", inner),
            TypeDescriptor::Reference(name) => write!(f, "ref:{}", name),
            TypeDescriptor::Any => write!(f, "any"),
        }
    }
}

/// Closed vocabulary of directory attribute types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectoryType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "double")]
    Double,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "generalizedTime")]
    GeneralizedTime,
    #[serde(rename = "binary")]
    Binary,
}

impl DirectoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectoryType::String => "string",
            DirectoryType::Integer => "integer",
            DirectoryType::Long => "long",
            DirectoryType::Double => "double",
            DirectoryType::Boolean => "boolean",
            DirectoryType::GeneralizedTime => "generalizedTime",
            DirectoryType::Binary => "binary",
        }
    }
}

impl fmt::Display for DirectoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectoryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "string" => Ok(DirectoryType::String),
            "integer" => Ok(DirectoryType::Integer),
            "long" => Ok(DirectoryType::Long),
            "double" => Ok(DirectoryType::Double),
            "boolean" => Ok(DirectoryType::Boolean),
            "generalizedTime" | "generalized-time" => Ok(DirectoryType::GeneralizedTime),
            "binary" => Ok(DirectoryType::Binary),
            other => Err(format!("unknown directory type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_type_uses_list_element() {
        let emails = TypeDescriptor::list_of(TypeDescriptor::Primitive(PrimitiveKind::String));
        assert_eq!(emails.directory_type(), DirectoryType::String);

        let stamps = TypeDescriptor::list_of(TypeDescriptor::Primitive(PrimitiveKind::DateTime));
        assert_eq!(stamps.directory_type(), DirectoryType::GeneralizedTime);

        let ids = TypeDescriptor::Primitive(PrimitiveKind::Integer64);
        assert_eq!(ids.directory_type(), DirectoryType::Long);
    }

    #[test]
    fn test_structured_types_map_to_string() {
        assert_eq!(TypeDescriptor::open_object().directory_type(), DirectoryType::String);
        assert_eq!(
            TypeDescriptor::Reference("Address".to_string()).directory_type(),
            DirectoryType::String
        );
        assert_eq!(TypeDescriptor::Any.directory_type(), DirectoryType::String);
    }

    #[test]
    fn test_degrade_references() {
        let mut ty = TypeDescriptor::list_of(TypeDescriptor::map_of(TypeDescriptor::Reference(
            "Ghost".to_string(),
        )));
        let degraded = ty.degrade_references(&|name: &str| name == "User");
        assert_eq!(degraded, vec!["Ghost".to_string()]);
        assert_eq!(
            ty,
            TypeDescriptor::list_of(TypeDescriptor::map_of(TypeDescriptor::open_object()))
        );
    }

    #[test]
    fn test_references_collects_nested_names() {
        let ty = TypeDescriptor::map_of(TypeDescriptor::list_of(TypeDescriptor::Reference(
            "Group".to_string(),
        )));
        assert_eq!(ty.references(), vec!["Group"]);
    }

    #[test]
    fn test_directory_type_parsing() {
        assert_eq!("generalizedTime".parse::<DirectoryType>(), Ok(DirectoryType::GeneralizedTime));
        assert_eq!("long".parse::<DirectoryType>(), Ok(DirectoryType::Long));
        assert!("uuid".parse::<DirectoryType>().is_err());
    }

    #[test]
    fn test_type_descriptor_serialization() {
        let ty = TypeDescriptor::list_of(TypeDescriptor::Reference("User".to_string()));
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, r#"{"kind":"list","of":{"kind":"reference","of":"User"}}"#);
        let back: TypeDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }
}
