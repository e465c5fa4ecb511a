//! Generator options, loadable from a YAML file

use crate::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default Java package for generated sources
pub const DEFAULT_PACKAGE_NAME: &str = "com.example.generated.connector";

/// Options that influence naming and the capability set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    /// Dotted package for generated sources
    pub package_name: String,
    /// Connector display name; derived from the API title when absent
    pub connector_name: Option<String>,
    /// Advertise the SchemaExtraction capability
    pub schema_extraction: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            connector_name: None,
            schema_extraction: false,
        }
    }
}

impl GeneratorOptions {
    /// Load options from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Parse(format!("Failed to read options file {:?}: {}", path, e))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to parse options YAML from {:?}: {}",
                path, e
            ))
        })
    }

    /// Package path with dots replaced by slashes
    pub fn package_path(&self) -> String {
        self.package_name.replace('.', "/")
    }
}
