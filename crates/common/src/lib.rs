//! Common types and utilities for the Dataconnector Generator
//!
//! This crate contains the connector intermediate representation (IR),
//! the diagnostics collector, generator options and error types shared by
//! the parser, generator, and CLI components.

mod config;
mod diagnostics;
mod ir;
pub mod naming;
mod types;

pub use config::{GeneratorOptions, DEFAULT_PACKAGE_NAME};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use ir::*;
pub use types::{DirectoryType, PrimitiveKind, TypeDescriptor};

use thiserror::Error;

/// Errors that can occur during connector generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    /// An input document failed structural validation
    #[error("Invalid {document} document at '{path}': {message}")]
    Structural {
        document: String,
        path: String,
        message: String,
    },

    /// Two components derived the same name with different meanings
    #[error("Conflicting definitions for {scope} name '{name}': {existing} vs {incoming}")]
    SymbolConflict {
        scope: String,
        name: String,
        existing: String,
        incoming: String,
    },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GeneratorError {
    /// Build a structural validation error for the named document
    pub fn structural(
        document: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        GeneratorError::Structural {
            document: document.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;
