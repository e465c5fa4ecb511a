//! Composition of the resolved pieces into one [`ConnectorIr`]
//!
//! The assembler is the only place derived names are allocated. Every name
//! goes through the [`SymbolTable`], so renderers read identifiers from the
//! IR instead of deriving them again.

mod bindings;
mod properties;
mod symbols;

pub use bindings::{bind_by_endpoint, bind_by_model, collection_path, is_item_path};
pub use properties::{auth_properties, base_url_property, BASE_URL_PROPERTY};
pub use symbols::{Scope, SymbolTable};

use crate::auth::AuthBuilder;
use crate::mapping::MappingDocument;
use crate::mapping_resolver::MappingResolver;
use crate::openapi::{ApiDocument, Schema};
use crate::operation_extractor::{derive_capabilities, OperationExtractor};
use crate::schema_table::SchemaTable;
use crate::type_resolver::TypeResolver;
use crate::validation::json_pointer;
use dataconnector_generator_common::naming::{to_pascal_case, to_variable_name};
use dataconnector_generator_common::{
    ApiMetadata, AuthRequirement, ConnectionProperty, ConnectorIr, ConnectorNames, DiagnosticKind,
    Diagnostics, DnStructure, FieldDescriptor, GeneratorOptions, HttpMethod, ModelDescriptor,
    ObjectClassMapping, OperationDescriptor, ParameterDescriptor, ResponsePayload, Result,
    Severity, TestConnectionTarget, TypeDescriptor,
};

/// Display name when neither the options nor the API title provide one
pub const DEFAULT_CONNECTOR_NAME: &str = "Generated REST Connector";

/// Class-name stem when the API has no title
const DEFAULT_TITLE: &str = "GenericApi";

/// Class name for a schema whose name has no identifier characters
const UNNAMED_MODEL: &str = "UnnamedModel";

/// Public method of both converters, never reused for a per-class handler
const CONVERTER_ENTRY_POINT: &str = "convert";

pub const REQUEST_CONVERTER_CLASS: &str = "LdapToBackendRequestConverter";
pub const RESPONSE_CONVERTER_CLASS: &str = "BackendToLdapResponseConverter";
pub const BACKEND_REQUEST_CLASS: &str = "BackendRequest";
pub const BACKEND_RESPONSE_CLASS: &str = "BackendResponse";

/// An assembled IR with everything noticed along the way
#[derive(Debug)]
pub struct Assembly {
    pub ir: ConnectorIr,
    pub diagnostics: Diagnostics,
    pub symbols: SymbolTable,
}

impl Assembly {
    /// True when some object class was excluded or another error was recorded
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Class name allocated for a named schema
pub fn model_class_name(schema_name: &str) -> String {
    let name = to_pascal_case(schema_name);
    if name.is_empty() {
        UNNAMED_MODEL.to_string()
    } else {
        name
    }
}

/// Composes loaded documents into a [`ConnectorIr`]
///
/// # Example
///
/// ```
/// use dataconnector_generator_common::{Capability, GeneratorOptions};
/// use dataconnector_generator_parser::{ApiDocument, IrAssembler, MappingDocument};
///
/// let api = ApiDocument::from_json(r#"{
///     "openapi": "3.0.0",
///     "info": { "title": "Directory", "version": "1.0" },
///     "paths": { "/users": { "get": { "operationId": "listUsers" } } }
/// }"#).unwrap();
/// let mapping = MappingDocument::from_json(r#"{
///     "dnStructure": { "baseDnSuffix": "o=rest", "rdnAttribute": "uid" },
///     "objectClasses": {}
/// }"#).unwrap();
///
/// let options = GeneratorOptions::default();
/// let assembly = IrAssembler::new(&api, &mapping, &options).assemble().unwrap();
/// assert_eq!(assembly.ir.names.client_class, "DirectoryClient");
/// assert!(assembly.ir.has_capability(Capability::Search));
/// ```
pub struct IrAssembler<'a> {
    api: &'a ApiDocument,
    mapping: &'a MappingDocument,
    options: &'a GeneratorOptions,
    symbols: SymbolTable,
    diagnostics: Diagnostics,
}

impl<'a> IrAssembler<'a> {
    pub fn new(
        api: &'a ApiDocument,
        mapping: &'a MappingDocument,
        options: &'a GeneratorOptions,
    ) -> Self {
        Self {
            api,
            mapping,
            options,
            symbols: SymbolTable::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Run every resolution step; fails only on a naming conflict
    pub fn assemble(mut self) -> Result<Assembly> {
        let api = self.api;
        let table = SchemaTable::new(api.schemas());
        let resolver = TypeResolver::new(table);

        let metadata = self.metadata();
        let names = self.names()?;
        let models = self.models(resolver)?;
        let operations = self.operations(resolver)?;
        let capabilities = derive_capabilities(
            operations.iter().map(|op| op.method),
            self.options.schema_extraction,
        );
        let auth = AuthBuilder::new(api).build(&mut self.diagnostics);
        let object_classes = self.object_classes(resolver, &models, &operations)?;
        let connection_properties = self.connection_properties(&metadata, &auth)?;
        let test_connection = self.test_connection(&operations);
        let dn_structure = self.mapping.dn_structure();
        self.check_dn_components(&dn_structure, &operations);

        tracing::info!(
            models = models.len(),
            operations = operations.len(),
            object_classes = object_classes.len(),
            diagnostics = self.diagnostics.len(),
            "Connector IR assembled"
        );

        let ir = ConnectorIr {
            metadata,
            names,
            models,
            operations,
            capabilities,
            auth,
            object_classes,
            dn_structure,
            connection_properties,
            test_connection,
            mapping_source: self.mapping.raw().clone(),
        };

        Ok(Assembly {
            ir,
            diagnostics: self.diagnostics,
            symbols: self.symbols,
        })
    }

    fn metadata(&self) -> ApiMetadata {
        let info = self.api.info();
        ApiMetadata {
            title: info.title.clone(),
            version: info.version.clone(),
            description: info.description.clone(),
            base_url: self.api.base_url(),
            base_url_example: self.api.base_url_example(),
            server_variables: self.api.server_variables(),
        }
    }

    fn names(&mut self) -> Result<ConnectorNames> {
        let api = self.api;
        let title = api.info().title.trim();
        let display_name = self
            .options
            .connector_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(if title.is_empty() { DEFAULT_CONNECTOR_NAME } else { title })
            .to_string();

        let stem = match to_pascal_case(title) {
            stem if stem.is_empty() => DEFAULT_TITLE.to_string(),
            stem => stem,
        };

        let names = ConnectorNames {
            display_name,
            package_name: self.options.package_name.clone(),
            client_class: format!("{}Client", stem),
            connector_class: format!("{}Connector", stem),
            request_converter_class: REQUEST_CONVERTER_CLASS.to_string(),
            response_converter_class: RESPONSE_CONVERTER_CLASS.to_string(),
            backend_request_class: BACKEND_REQUEST_CLASS.to_string(),
            backend_response_class: BACKEND_RESPONSE_CLASS.to_string(),
            client_var: to_variable_name(&format!("{}Client", stem)),
            response_converter_var: to_variable_name(RESPONSE_CONVERTER_CLASS),
        };

        for (class, origin) in [
            (&names.client_class, "API client"),
            (&names.connector_class, "connector"),
            (&names.request_converter_class, "request converter"),
            (&names.response_converter_class, "response converter"),
            (&names.backend_request_class, "backend request base"),
            (&names.backend_response_class, "backend response base"),
        ] {
            self.symbols.define(Scope::Class, class, origin)?;
        }
        Ok(names)
    }

    /// Resolve a fragment and degrade references that do not name a model
    fn resolve_type(
        &mut self,
        resolver: TypeResolver<'a>,
        fragment: &Schema,
        location: &str,
    ) -> TypeDescriptor {
        let mut ty = resolver.resolve_into(fragment, location, &mut self.diagnostics);
        self.degrade(resolver, &mut ty, location);
        ty
    }

    fn degrade(&mut self, resolver: TypeResolver<'a>, ty: &mut TypeDescriptor, location: &str) {
        let table = resolver.table();
        for name in ty.degrade_references(&|name| table.is_model(name)) {
            self.diagnostics.warning(
                DiagnosticKind::ResolutionGap,
                location,
                format!(
                    "reference to '{}' does not name an object schema; using an open object",
                    name
                ),
            );
        }
    }

    fn schema_section(&self) -> &'static str {
        if self.api.is_swagger2() {
            "definitions"
        } else {
            "components/schemas"
        }
    }

    fn models(&mut self, resolver: TypeResolver<'a>) -> Result<Vec<ModelDescriptor>> {
        let section = self.schema_section();
        let mut models = Vec::new();

        for (schema_name, schema) in resolver.table().iter().filter(|(_, s)| s.is_model()) {
            let class_name = model_class_name(schema_name);
            self.symbols
                .define(Scope::Class, &class_name, format!("schema '{}'", schema_name))?;

            let mut fields = Vec::with_capacity(schema.properties.len());
            for (i, (property, fragment)) in schema.properties.iter().enumerate() {
                let field_name = match to_variable_name(property) {
                    name if name.is_empty() => format!("field{}", i + 1),
                    name => name,
                };
                self.symbols.define(
                    Scope::Field(class_name.clone()),
                    &field_name,
                    format!("property '{}'", property),
                )?;

                let location = format!(
                    "{}/{}",
                    section,
                    json_pointer(&[schema_name, "properties", String::as_str(property)])
                );
                let ty = self.resolve_type(resolver, fragment, &location);
                fields.push(FieldDescriptor {
                    property_name: property.clone(),
                    field_name,
                    ty,
                    required: schema.is_required(property),
                    read_only: fragment.read_only,
                    description: fragment.description.clone(),
                });
            }

            tracing::debug!(schema = schema_name, class = class_name.as_str(), "Model allocated");
            models.push(ModelDescriptor {
                schema_name: schema_name.to_string(),
                class_name,
                description: schema.description.clone(),
                fields,
            });
        }
        Ok(models)
    }

    fn operations(&mut self, resolver: TypeResolver<'a>) -> Result<Vec<OperationDescriptor>> {
        let extracted = OperationExtractor::new(self.api, resolver).extract(&mut self.diagnostics)?;
        let mut operations = Vec::with_capacity(extracted.len());

        for op in extracted {
            let location = json_pointer(&["paths", String::as_str(&op.path), op.method.key()]);
            let name = to_variable_name(&op.operation_id);
            self.symbols.define(
                Scope::Method,
                &name,
                format!("operation '{}' ({} {})", op.operation_id, op.method, op.path),
            )?;

            let mut parameters = Vec::with_capacity(op.parameters.len());
            for (i, parameter) in op.parameters.into_iter().enumerate() {
                let variable_name = match to_variable_name(&parameter.name) {
                    variable if variable.is_empty() => format!("param{}", i + 1),
                    variable => variable,
                };
                self.symbols.define(
                    Scope::Parameter(name.clone()),
                    &variable_name,
                    format!("{} parameter '{}'", parameter.location, parameter.name),
                )?;

                let mut ty = parameter.ty;
                self.degrade(resolver, &mut ty, &location);
                parameters.push(ParameterDescriptor {
                    name: parameter.name,
                    variable_name,
                    location: parameter.location,
                    ty,
                    required: parameter.required,
                    description: parameter.description,
                });
            }

            let response = match op.response {
                Some(ResponsePayload::Typed(mut ty)) => {
                    self.degrade(resolver, &mut ty, &location);
                    Some(ResponsePayload::Typed(ty))
                }
                other => other,
            };

            operations.push(OperationDescriptor {
                operation_id: op.operation_id,
                id_synthesized: op.id_synthesized,
                name,
                method: op.method,
                path: op.path,
                summary: op.summary,
                parameters,
                response,
            });
        }
        Ok(operations)
    }

    fn object_classes(
        &mut self,
        resolver: TypeResolver<'a>,
        models: &[ModelDescriptor],
        operations: &[OperationDescriptor],
    ) -> Result<Vec<ObjectClassMapping>> {
        let mapping = self.mapping;
        let mapping_resolver = MappingResolver::new(resolver);
        let mut classes = Vec::new();
        self.symbols
            .define(Scope::ConverterMethod, CONVERTER_ENTRY_POINT, "converter entry point")?;

        for (key, def) in mapping.object_classes() {
            let Some(resolved) = mapping_resolver.resolve(key, def, &mut self.diagnostics) else {
                continue;
            };
            let location = json_pointer(&["objectClasses", String::as_str(key)]);
            self.symbols.define(
                Scope::ObjectClass,
                &resolved.ldap_name,
                format!("mapping entry '{}'", key),
            )?;
            let handler = self.converter_handler(&resolved.ldap_name)?;

            let model_class = models
                .iter()
                .find(|m| m.schema_name == resolved.schema_name)
                .map(|m| m.class_name.clone())
                .unwrap_or_else(|| model_class_name(&resolved.schema_name));

            let mut attributes = resolved.attributes;
            for attribute in &mut attributes {
                self.degrade(resolver, &mut attribute.ty, &location);
            }

            let bindings = match &resolved.api_endpoint {
                Some(endpoint) => bind_by_endpoint(endpoint, operations),
                None => bind_by_model(&resolved.schema_name, operations),
            };
            if bindings.is_empty() {
                self.diagnostics.warning(
                    DiagnosticKind::MappingIntegrity,
                    &location,
                    "no operation serves this object class",
                );
            }

            classes.push(ObjectClassMapping {
                ldap_name: resolved.ldap_name,
                schema_name: resolved.schema_name,
                model_class,
                handler,
                api_endpoint: resolved.api_endpoint,
                attributes,
                primary_key: resolved.primary_key,
                bindings,
            });
        }
        Ok(classes)
    }

    /// `convert<Class>`, suffixed when two object classes collapse to one name
    fn converter_handler(&mut self, ldap_name: &str) -> Result<String> {
        let stem = format!("convert{}", to_pascal_case(ldap_name));
        let mut handler = stem.clone();
        let mut suffix = 2;
        while self.symbols.contains(&Scope::ConverterMethod, &handler) {
            handler = format!("{}{}", stem, suffix);
            suffix += 1;
        }
        self.symbols.define(
            Scope::ConverterMethod,
            &handler,
            format!("object class '{}'", ldap_name),
        )?;
        Ok(handler)
    }

    fn connection_properties(
        &mut self,
        metadata: &ApiMetadata,
        auth: &[AuthRequirement],
    ) -> Result<Vec<ConnectionProperty>> {
        let mut properties = vec![base_url_property(metadata)];
        self.symbols
            .define(Scope::ConnectionProperty, BASE_URL_PROPERTY, "server URL")?;

        for requirement in auth {
            let origin = match requirement {
                AuthRequirement::ApiKey { scheme, .. }
                | AuthRequirement::BearerToken { scheme, .. }
                | AuthRequirement::OAuthPartial { scheme, .. } => {
                    format!("security scheme '{}'", scheme)
                }
                AuthRequirement::HttpBasic => "HTTP basic authentication".to_string(),
            };
            for property in auth_properties(requirement) {
                self.symbols
                    .define(Scope::ConnectionProperty, &property.name, origin.as_str())?;
                properties.push(property);
            }
        }
        Ok(properties)
    }

    /// First GET without parameters, else the first GET
    fn test_connection(&mut self, operations: &[OperationDescriptor]) -> Option<TestConnectionTarget> {
        let gets = || operations.iter().filter(|op| op.method == HttpMethod::Get);
        let target = gets()
            .find(|op| op.parameters.is_empty())
            .or_else(|| gets().next());

        match target {
            Some(op) => Some(TestConnectionTarget {
                operation_id: op.operation_id.clone(),
                name: op.name.clone(),
                path: op.path.clone(),
                has_parameters: !op.parameters.is_empty(),
            }),
            None => {
                self.diagnostics.warning(
                    DiagnosticKind::Unsupported,
                    "paths",
                    "no GET operation; the connector has no connectivity check",
                );
                None
            }
        }
    }

    /// DN components must name a path parameter some operation takes
    fn check_dn_components(&mut self, dn: &DnStructure, operations: &[OperationDescriptor]) {
        for (i, component) in dn.components.iter().enumerate() {
            let used = operations.iter().any(|op| {
                op.path_parameters()
                    .any(|p| p.name == component.parameter_name)
            });
            if !used {
                self.diagnostics.warning(
                    DiagnosticKind::ParameterMismatch,
                    format!("dnStructure/components/{}/openApiParameterName", i),
                    format!(
                        "no operation takes a path parameter named '{}'",
                        component.parameter_name
                    ),
                );
            }
        }
    }
}
