//! Artifact rendering for generated data connectors
//!
//! This crate turns an assembled [`ConnectorIr`] into a Maven source tree:
//! model classes, the API client, request and response converters, the
//! connector class, the directory schema, the connector descriptor and a
//! verbatim copy of the mapping document.

mod contexts;
mod java;
mod templates;
#[cfg(test)]
mod test_support;

pub use contexts::{
    operation_metadata, ClientContext, ConnectorContext, ContextBuilder, ConverterContext,
    ConverterKind, MetaContext, ModelContext, OperationMetadata, SchemaContext, META_JSON_PATH,
    SCHEMA_PATH,
};
pub use java::{sdk_class, simple_name, JavaTypes, SDK_PACKAGE};

use dataconnector_generator_common::{ConnectorIr, GeneratorError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;

/// Resource path of the raw mapping copy
pub const MAPPING_COPY_PATH: &str = "src/main/resources/mapping_config.json";

/// Destination for rendered artifacts
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactSink {
    /// Store `contents` at `path`, relative to the output root
    fn write(&mut self, path: &str, contents: &str) -> Result<()>;
}

/// Writes artifacts below a root directory, creating parents as needed
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for FsSink {
    fn write(&mut self, path: &str, contents: &str) -> Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GeneratorError::Generation(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        fs::write(&target, contents)
            .map_err(|e| GeneratorError::Generation(format!("Failed to write {}: {}", path, e)))?;
        tracing::debug!(path, bytes = contents.len(), "Artifact written");
        Ok(())
    }
}

/// Connector generator
///
/// Transforms a ConnectorIr into a complete connector source tree:
/// - `src/main/java/<package>/model/*.java` (models and request/response wrappers)
/// - `src/main/java/<package>/client/<Client>.java`
/// - `src/main/java/<package>/converter/*.java`
/// - `src/main/java/<package>/<Connector>.java`
/// - `src/main/resources/META-INF/connector/{schema.orx,meta.json}`
/// - `src/main/resources/mapping_config.json`
pub struct ConnectorGenerator {
    ir: ConnectorIr,
    tera: Tera,
}

impl ConnectorGenerator {
    /// Create a new connector generator from an assembled IR
    pub fn new(ir: ConnectorIr) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self { ir, tera })
    }

    pub fn ir(&self) -> &ConnectorIr {
        &self.ir
    }

    /// Generate all connector artifacts to a directory
    pub fn generate_to_directory(&self, output_dir: &Path) -> Result<Vec<String>> {
        fs::create_dir_all(output_dir).map_err(|e| {
            GeneratorError::Generation(format!("Failed to create output directory: {}", e))
        })?;

        let mut sink = FsSink::new(output_dir);
        self.generate(&mut sink)
    }

    /// Render every artifact into `sink`, returning the written paths in order
    pub fn generate(&self, sink: &mut dyn ArtifactSink) -> Result<Vec<String>> {
        let contexts = ContextBuilder::new(&self.ir)?;
        let java_root = format!("src/main/java/{}", self.ir.names.package_name.replace('.', "/"));
        let resources = "src/main/resources";
        let mut written = Vec::new();

        let mut emit = |path: String, contents: String| -> Result<()> {
            sink.write(&path, &contents)?;
            written.push(path);
            Ok(())
        };

        emit(
            format!("{}/{}", resources, META_JSON_PATH),
            self.render("meta.json", &contexts.meta())?,
        )?;
        emit(
            format!("{}/{}", resources, SCHEMA_PATH),
            self.render("schema.orx", &contexts.schema())?,
        )?;

        let wrappers = [contexts.backend_request(), contexts.backend_response()];
        for model in contexts.models().iter().chain(wrappers.iter()) {
            emit(
                format!("{}/model/{}.java", java_root, model.class_name),
                self.render("model.java", model)?,
            )?;
        }

        let client = contexts.client();
        emit(
            format!("{}/client/{}.java", java_root, client.class_name),
            self.render("client.java", &client)?,
        )?;

        for converter in [contexts.request_converter(), contexts.response_converter()] {
            emit(
                format!("{}/converter/{}.java", java_root, converter.class_name),
                self.render("converter.java", &converter)?,
            )?;
        }

        let connector = contexts.connector();
        emit(
            format!("{}/{}.java", java_root, connector.class_name),
            self.render("connector.java", &connector)?,
        )?;

        let mapping = serde_json::to_string_pretty(&self.ir.mapping_source)?;
        emit(MAPPING_COPY_PATH.to_string(), mapping)?;

        tracing::info!(
            connector = self.ir.names.connector_class.as_str(),
            artifacts = written.len(),
            "Connector artifacts generated"
        );
        Ok(written)
    }

    /// Render one template from a serializable context
    fn render<C: Serialize>(&self, template: &str, context: &C) -> Result<String> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| GeneratorError::Generation(format!("Template context error: {}", e)))?;
        self.tera
            .render(template, &context)
            .map_err(|e| GeneratorError::Generation(format!("Template error: {}", e)))
    }
}

/// Generate connector artifacts (convenience function)
pub fn generate_connector(ir: ConnectorIr, output_path: &str) -> Result<Vec<String>> {
    let generator = ConnectorGenerator::new(ir)?;
    generator.generate_to_directory(Path::new(output_path))
}
