//! Input loading and the connector IR resolution core
//!
//! This crate reads an OpenAPI (or Swagger 2) document and a directory
//! attribute mapping, validates both structurally, and assembles them into a
//! [`ConnectorIr`](dataconnector_generator_common::ConnectorIr).
//!
//! ## Resolution Pipeline
//!
//! Leaves first:
//! - [`TypeResolver`]: schema fragment → `TypeDescriptor`
//! - [`OperationExtractor`]: one operation per method × path
//! - [`MappingResolver`]: object class attributes → schema fields
//! - [`AuthBuilder`]: globally required security schemes → credentials
//! - [`IrAssembler`]: combines the above and allocates every derived name
//!
//! Structural errors and naming conflicts fail the run. Everything else is
//! recorded in the diagnostics of the returned [`Assembly`] and the run
//! continues.

mod assembler;
mod auth;
pub mod mapping;
mod mapping_resolver;
pub mod openapi;
mod operation_extractor;
mod schema_table;
mod source;
mod type_resolver;
pub mod validation;

pub use assembler::{
    auth_properties, base_url_property, bind_by_endpoint, bind_by_model, collection_path,
    is_item_path, model_class_name, Assembly, IrAssembler, Scope, SymbolTable,
    BACKEND_REQUEST_CLASS, BACKEND_RESPONSE_CLASS, BASE_URL_PROPERTY, DEFAULT_CONNECTOR_NAME,
    REQUEST_CONVERTER_CLASS, RESPONSE_CONVERTER_CLASS,
};
pub use auth::{oauth_flow_kind, AuthBuilder};
pub use mapping::MappingDocument;
pub use mapping_resolver::{parse_path_expression, MappingResolver, PathStep, ResolvedObjectClass};
pub use openapi::ApiDocument;
pub use operation_extractor::{
    derive_capabilities, is_json_media_type, synthesize_operation_id, template_parameters,
    ExtractedOperation, ExtractedParameter, OperationExtractor, BODY_PARAMETER,
};
pub use schema_table::{reference_simple_name, LookupFailure, SchemaEntry, SchemaTable};
pub use type_resolver::{
    fragment_for, primitive_kind, Resolution, ResolutionGap, TypeResolver, Visited,
    PRIMITIVE_TABLE,
};

use dataconnector_generator_common::{GeneratorOptions, Result};
use std::path::Path;

/// Assemble the connector IR from loaded documents
pub fn build_connector_ir(
    api: &ApiDocument,
    mapping: &MappingDocument,
    options: &GeneratorOptions,
) -> Result<Assembly> {
    IrAssembler::new(api, mapping, options).assemble()
}

/// Load both documents from disk and assemble the connector IR
///
/// # Arguments
/// * `openapi_path` - OpenAPI or Swagger 2 document, JSON or YAML
/// * `mapping_path` - Directory attribute mapping, JSON or YAML
/// * `options` - Naming and capability options
pub fn load_connector_ir<P, Q>(
    openapi_path: P,
    mapping_path: Q,
    options: &GeneratorOptions,
) -> Result<Assembly>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let api = ApiDocument::load(openapi_path)?;
    let mapping = MappingDocument::load(mapping_path)?;
    tracing::info!(
        title = api.info().title.as_str(),
        object_classes = mapping.object_classes().len(),
        "Documents loaded"
    );
    build_connector_ir(&api, &mapping, options)
}

/// Structural validation of both documents without resolution
pub fn validate_documents<P, Q>(openapi_path: P, mapping_path: Q) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    ApiDocument::load(openapi_path)?;
    MappingDocument::load(mapping_path)?;
    Ok(())
}
