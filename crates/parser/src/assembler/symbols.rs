//! The single table of derived names
//!
//! Every identifier a renderer will emit (class, method, field, parameter,
//! connection property) is defined here exactly once. Defining the same name
//! again for the same origin is a no-op; a different origin is a conflict.

use dataconnector_generator_common::{GeneratorError, Result};
use indexmap::IndexMap;
use std::fmt;

/// Namespace a derived name lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Top-level classes of the generated package
    Class,
    /// Client methods
    Method,
    /// Fields of one model class
    Field(String),
    /// Parameters of one client method
    Parameter(String),
    /// Directory object classes
    ObjectClass,
    /// Per-class methods shared by both converters
    ConverterMethod,
    ConnectionProperty,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Class => write!(f, "class"),
            Scope::Method => write!(f, "client method"),
            Scope::Field(class) => write!(f, "field of {}", class),
            Scope::Parameter(method) => write!(f, "parameter of {}", method),
            Scope::ObjectClass => write!(f, "object class"),
            Scope::ConverterMethod => write!(f, "converter method"),
            Scope::ConnectionProperty => write!(f, "connection property"),
        }
    }
}

/// Write-once map from (scope, name) to the origin that claimed it
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: IndexMap<(Scope, String), String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` in `scope` for `origin`
    ///
    /// # Example
    ///
    /// ```
    /// use dataconnector_generator_parser::{Scope, SymbolTable};
    ///
    /// let mut symbols = SymbolTable::new();
    /// symbols.define(Scope::Class, "User", "schema 'User'").unwrap();
    /// symbols.define(Scope::Class, "User", "schema 'User'").unwrap();
    /// assert!(symbols.define(Scope::Class, "User", "schema 'user'").is_err());
    /// ```
    pub fn define(
        &mut self,
        scope: Scope,
        name: impl Into<String>,
        origin: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        let origin = origin.into();
        match self.entries.get(&(scope.clone(), name.clone())) {
            Some(existing) if *existing == origin => Ok(()),
            Some(existing) => Err(GeneratorError::SymbolConflict {
                scope: scope.to_string(),
                name,
                existing: existing.clone(),
                incoming: origin,
            }),
            None => {
                tracing::debug!(%scope, name = name.as_str(), origin = origin.as_str(), "Symbol defined");
                self.entries.insert((scope, name), origin);
                Ok(())
            }
        }
    }

    /// Origin that claimed `name`, if any
    pub fn origin(&self, scope: &Scope, name: &str) -> Option<&str> {
        self.entries
            .get(&(scope.clone(), name.to_string()))
            .map(String::as_str)
    }

    pub fn contains(&self, scope: &Scope, name: &str) -> bool {
        self.origin(scope, name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names defined in one scope, in definition order
    pub fn names<'s>(&'s self, scope: &'s Scope) -> impl Iterator<Item = &'s str> + 's {
        self.entries
            .keys()
            .filter(move |(s, _)| s == scope)
            .map(|(_, name)| name.as_str())
    }
}
