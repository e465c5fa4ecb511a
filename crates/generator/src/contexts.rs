//! Flat per-artifact rendering contexts
//!
//! Each context carries every identifier its template prints, copied from the
//! names the IR assembler allocated. Templates never derive names on their own.

use crate::java::{sdk_class, simple_name, JavaTypes, JSON_PROPERTY_ANNOTATION};
use dataconnector_generator_common::{
    ApiKeyLocation, AttributeSource, AuthRequirement, Capability, ConnectorIr, OAuthFlowKind,
    OperationDescriptor, ParameterDescriptor, ParameterLocation, PropertyKind, PropertyRole,
    Result,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;

/// Classpath location of the connector descriptor
pub const META_JSON_PATH: &str = "META-INF/connector/meta.json";
/// Classpath location of the directory schema
pub const SCHEMA_PATH: &str = "META-INF/connector/schema.orx";

const CONNECTOR_CATEGORY: &str = "Custom";
const BASE_URL_FALLBACK: &str = "baseUrl";

#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    pub name: String,
    pub json_property: String,
    pub java_type: String,
    pub required: bool,
    pub read_only: bool,
    pub description: Option<String>,
}

/// Data class: a resolved model or one of the fixed request/response wrappers
#[derive(Debug, Clone, Serialize)]
pub struct ModelContext {
    pub package_name: String,
    pub class_name: String,
    pub description: Option<String>,
    pub imports: Vec<String>,
    pub fields: Vec<FieldContext>,
}

/// Entry of the operation metadata map shared by client, converters and connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    pub name: String,
    /// `(type, name)` pairs in call order
    pub signature: Vec<(String, String)>,
    pub return_type: String,
    pub payload_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamContext {
    /// Method parameter name
    pub name: String,
    /// Name on the wire
    pub wire_name: String,
    /// `{wireName}` as it appears in the path template
    pub placeholder: String,
    pub location: String,
    pub java_type: String,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientMethodContext {
    pub name: String,
    pub operation_id: String,
    pub summary: Option<String>,
    pub http_method: String,
    pub path: String,
    pub parameters: Vec<ParamContext>,
    pub path_parameters: Vec<ParamContext>,
    pub query_parameters: Vec<ParamContext>,
    pub body: Option<ParamContext>,
    pub payload_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestConnectionContext {
    pub method: String,
    /// Placeholder arguments, one per declared parameter
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyContext {
    pub key_name: String,
    pub location: String,
    pub property: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BasicContext {
    pub username_property: String,
    pub password_property: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BearerContext {
    pub scheme: String,
    pub property: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OAuthContext {
    pub scheme: String,
    pub flow: String,
    pub client_id_property: Option<String>,
    pub client_secret_property: Option<String>,
}

/// Credential handling the client applies to every request
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthContext {
    pub api_keys: Vec<ApiKeyContext>,
    pub basic: Option<BasicContext>,
    pub bearer: Vec<BearerContext>,
    pub oauth: Vec<OAuthContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientContext {
    pub package_name: String,
    pub class_name: String,
    pub imports: Vec<String>,
    pub backend_response_class: String,
    pub base_url_property: String,
    pub methods: Vec<ClientMethodContext>,
    pub test_connection: Option<TestConnectionContext>,
    pub auth: AuthContext,
    pub operation_metadata_json: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    Request,
    Response,
}

/// An operation binding with the client method it dispatches to
#[derive(Debug, Clone, Serialize)]
pub struct BoundOperation {
    pub operation_id: String,
    pub method_name: String,
    pub http_method: String,
    pub path: String,
    pub path_parameters: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BindingsContext {
    pub search: Option<BoundOperation>,
    pub lookup: Option<BoundOperation>,
    pub insert: Option<BoundOperation>,
    pub modify: Option<BoundOperation>,
    pub delete: Option<BoundOperation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeContext {
    pub ldap_name: String,
    /// Property name or path expression
    pub source: String,
    pub from_path: bool,
    pub java_type: String,
    pub directory_type: String,
    pub multi_valued: bool,
    pub read_only: bool,
    pub required: bool,
    pub primary_key: bool,
    pub api_query_param: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectClassContext {
    pub ldap_name: String,
    /// Converter method handling this object class
    pub handler: String,
    pub model_class: String,
    pub primary_key: Option<String>,
    pub attributes: Vec<AttributeContext>,
    pub bindings: BindingsContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct DnComponentContext {
    pub ldap_name: String,
    pub parameter_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DnContext {
    pub base_dn_suffix: String,
    pub rdn_attribute: String,
    pub components: Vec<DnComponentContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConverterContext {
    pub package_name: String,
    pub class_name: String,
    pub kind: ConverterKind,
    pub input_type: String,
    pub output_type: String,
    pub imports: Vec<String>,
    pub backend_request_class: String,
    pub backend_response_class: String,
    pub object_classes: Vec<ObjectClassContext>,
    pub dn: DnContext,
    pub uses_path_expressions: bool,
    pub operation_metadata_json: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CapabilityFlags {
    pub search: bool,
    pub insertion: bool,
    pub modification: bool,
    pub deletion: bool,
    pub test_connect: bool,
    pub schema_extraction: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchArgument {
    pub location: String,
    pub wire_name: String,
    pub java_type: String,
}

/// Client call the connector makes for one operation
#[derive(Debug, Clone, Serialize)]
pub struct DispatchContext {
    pub name: String,
    pub operation_id: String,
    pub arguments: Vec<DispatchArgument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectorContext {
    pub package_name: String,
    pub class_name: String,
    pub display_name: String,
    pub imports: Vec<String>,
    pub interfaces: Vec<String>,
    pub capabilities: CapabilityFlags,
    pub client_class: String,
    pub client_var: String,
    pub response_converter_class: String,
    pub response_converter_var: String,
    pub backend_request_class: String,
    pub backend_response_class: String,
    pub meta_json_path: String,
    pub schema_path: String,
    pub operations: Vec<DispatchContext>,
    pub operation_metadata_json: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaAttribute {
    pub ldap_name: String,
    pub attribute_type: String,
    pub primary_key: bool,
    pub multi_valued: bool,
    pub read_only: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaObjectClass {
    pub ldap_name: String,
    pub primary_key: Option<String>,
    pub attributes: Vec<SchemaAttribute>,
}

/// Directory schema (`schema.orx`)
#[derive(Debug, Clone, Serialize)]
pub struct SchemaContext {
    pub connector_name: String,
    pub base_dn_suffix: String,
    pub rdn_attribute: String,
    pub object_classes: Vec<SchemaObjectClass>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetaProperty {
    pub name: String,
    pub label: String,
    pub property_type: String,
    pub required: bool,
    pub description: String,
    pub default: Option<String>,
}

/// Connector descriptor (`meta.json`)
#[derive(Debug, Clone, Serialize)]
pub struct MetaContext {
    pub connector_name: String,
    pub description: Option<String>,
    pub version: String,
    pub category: String,
    pub schema_extractable: bool,
    pub multiple_accounts_supported: bool,
    pub properties: Vec<MetaProperty>,
}

/// Builds every rendering context from one IR
pub struct ContextBuilder<'a> {
    ir: &'a ConnectorIr,
    types: JavaTypes,
    operation_metadata_json: String,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(ir: &'a ConnectorIr) -> Result<Self> {
        let types = JavaTypes::new(ir);
        let metadata = operation_metadata(ir, &types);
        let operation_metadata_json = serde_json::to_string(&metadata)?;
        Ok(Self {
            ir,
            types,
            operation_metadata_json,
        })
    }

    pub fn operation_metadata_json(&self) -> &str {
        &self.operation_metadata_json
    }

    pub fn model_package(&self) -> String {
        format!("{}.model", self.ir.names.package_name)
    }

    pub fn client_package(&self) -> String {
        format!("{}.client", self.ir.names.package_name)
    }

    pub fn converter_package(&self) -> String {
        format!("{}.converter", self.ir.names.package_name)
    }

    pub fn models(&self) -> Vec<ModelContext> {
        self.ir
            .models
            .iter()
            .map(|model| {
                let mut imports = BTreeSet::new();
                imports.insert(JSON_PROPERTY_ANNOTATION.to_string());
                let fields = model
                    .fields
                    .iter()
                    .map(|field| {
                        self.types.collect_imports(&field.ty, &mut imports);
                        FieldContext {
                            name: field.field_name.clone(),
                            json_property: field.property_name.clone(),
                            java_type: self.types.render(&field.ty),
                            required: field.required,
                            read_only: field.read_only,
                            description: field.description.clone(),
                        }
                    })
                    .collect();
                ModelContext {
                    package_name: self.model_package(),
                    class_name: model.class_name.clone(),
                    description: model.description.clone(),
                    imports: imports.into_iter().collect(),
                    fields,
                }
            })
            .collect()
    }

    /// Wrapper the request converter produces and the connector dispatches on
    pub fn backend_request(&self) -> ModelContext {
        let fields = [
            ("httpMethod", "String", "HTTP method of the target operation"),
            ("pathTemplate", "String", "Path template of the target operation"),
            ("pathParams", "Map<String, String>", "Resolved path parameters"),
            ("queryParams", "Map<String, String>", "Query parameters"),
            ("requestBody", "Object", "Payload sent as the request body"),
            ("headers", "Map<String, String>", "Additional request headers"),
            ("targetObjectClass", "String", "Directory object class being processed"),
            ("resourceId", "String", "Primary key value of the addressed entry"),
            ("fieldsToRetrieve", "List<String>", "Fields requested by the directory"),
            ("targetClientMethodName", "String", "Client method to invoke"),
        ];
        self.wrapper(
            &self.ir.names.backend_request_class,
            "Backend call derived from a directory request.",
            &fields,
        )
    }

    pub fn backend_response(&self) -> ModelContext {
        let fields = [
            ("statusCode", "int", "HTTP status code"),
            ("payload", "Object", "Deserialized response payload"),
            ("headers", "Map<String, List<String>>", "Response headers"),
        ];
        self.wrapper(
            &self.ir.names.backend_response_class,
            "Outcome of a backend call.",
            &fields,
        )
    }

    fn wrapper(&self, class_name: &str, description: &str, fields: &[(&str, &str, &str)]) -> ModelContext {
        ModelContext {
            package_name: self.model_package(),
            class_name: class_name.to_string(),
            description: Some(description.to_string()),
            imports: vec![
                JSON_PROPERTY_ANNOTATION.to_string(),
                "java.util.List".to_string(),
                "java.util.Map".to_string(),
            ],
            fields: fields
                .iter()
                .map(|(name, ty, doc)| FieldContext {
                    name: name.to_string(),
                    json_property: name.to_string(),
                    java_type: ty.to_string(),
                    required: false,
                    read_only: false,
                    description: Some(doc.to_string()),
                })
                .collect(),
        }
    }

    fn param(&self, param: &ParameterDescriptor) -> ParamContext {
        ParamContext {
            name: param.variable_name.clone(),
            wire_name: param.name.clone(),
            placeholder: format!("{{{}}}", param.name),
            location: param.location.to_string(),
            java_type: self.types.render(&param.ty),
            required: param.required,
        }
    }

    pub fn client(&self) -> ClientContext {
        let mut imports: BTreeSet<String> = [
            "com.fasterxml.jackson.core.type.TypeReference",
            "com.fasterxml.jackson.databind.ObjectMapper",
            "java.io.IOException",
            "java.util.Map",
            "okhttp3.HttpUrl",
            "okhttp3.MediaType",
            "okhttp3.OkHttpClient",
            "okhttp3.Request",
            "okhttp3.RequestBody",
            "okhttp3.Response",
            "okhttp3.ResponseBody",
            "org.slf4j.Logger",
            "org.slf4j.LoggerFactory",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        imports.insert(sdk_class("annotation.ManagedComponent"));
        imports.insert(sdk_class("annotation.Inject"));
        imports.insert(sdk_class("annotation.Properties"));
        imports.insert(sdk_class("core.InjectableProperties"));
        imports.insert(format!("{}.*", self.model_package()));

        let methods = self
            .ir
            .operations
            .iter()
            .map(|op| {
                for param in &op.parameters {
                    self.types.collect_imports(&param.ty, &mut imports);
                }
                if let Some(ty) = op.response_type() {
                    self.types.collect_imports(ty, &mut imports);
                }
                let of = |location: ParameterLocation| -> Vec<ParamContext> {
                    op.parameters
                        .iter()
                        .filter(|p| p.location == location)
                        .map(|p| self.param(p))
                        .collect()
                };
                ClientMethodContext {
                    name: op.name.clone(),
                    operation_id: op.operation_id.clone(),
                    summary: op.summary.clone(),
                    http_method: op.method.to_string(),
                    path: op.path.clone(),
                    parameters: op.parameters.iter().map(|p| self.param(p)).collect(),
                    path_parameters: of(ParameterLocation::Path),
                    query_parameters: of(ParameterLocation::Query),
                    body: op.body_parameter().map(|p| self.param(p)),
                    payload_type: self.types.payload(op.response_type()),
                }
            })
            .collect();

        let test_connection = self.ir.test_connection.as_ref().and_then(|target| {
            let op = self.ir.operation(&target.operation_id)?;
            Some(TestConnectionContext {
                method: target.name.clone(),
                arguments: op.parameters.iter().map(|_| "null".to_string()).collect(),
            })
        });

        let auth = self.auth();
        if auth.basic.is_some() {
            imports.insert("okhttp3.Credentials".to_string());
        }

        ClientContext {
            package_name: self.client_package(),
            class_name: self.ir.names.client_class.clone(),
            imports: imports.into_iter().collect(),
            backend_response_class: self.ir.names.backend_response_class.clone(),
            base_url_property: self
                .property_name(PropertyRole::BaseUrl, None)
                .unwrap_or_else(|| BASE_URL_FALLBACK.to_string()),
            methods,
            test_connection,
            auth,
            operation_metadata_json: self.operation_metadata_json.clone(),
        }
    }

    fn property_name(&self, role: PropertyRole, scheme: Option<&str>) -> Option<String> {
        self.ir.property(role, scheme).map(|p| p.name.clone())
    }

    fn auth(&self) -> AuthContext {
        let mut auth = AuthContext::default();
        for requirement in &self.ir.auth {
            match requirement {
                AuthRequirement::ApiKey {
                    scheme,
                    name,
                    location,
                } => {
                    if let Some(property) = self.property_name(PropertyRole::ApiKey, Some(scheme)) {
                        auth.api_keys.push(ApiKeyContext {
                            key_name: name.clone(),
                            location: location_name(*location).to_string(),
                            property,
                        });
                    }
                }
                AuthRequirement::HttpBasic => {
                    let username = self.property_name(PropertyRole::Username, None);
                    let password = self.property_name(PropertyRole::Password, None);
                    if let (Some(username_property), Some(password_property)) = (username, password) {
                        auth.basic = Some(BasicContext {
                            username_property,
                            password_property,
                        });
                    }
                }
                AuthRequirement::BearerToken { scheme, .. } => {
                    if let Some(property) =
                        self.property_name(PropertyRole::BearerToken, Some(scheme))
                    {
                        auth.bearer.push(BearerContext {
                            scheme: scheme.clone(),
                            property,
                        });
                    }
                }
                AuthRequirement::OAuthPartial { scheme, flow, .. } => {
                    auth.oauth.push(OAuthContext {
                        scheme: scheme.clone(),
                        flow: flow_name(*flow).to_string(),
                        client_id_property: self.property_name(PropertyRole::ClientId, Some(scheme)),
                        client_secret_property: self
                            .property_name(PropertyRole::ClientSecret, Some(scheme)),
                    });
                }
            }
        }
        auth
    }

    fn bound(&self, operation_id: Option<&String>) -> Option<BoundOperation> {
        let op = self.ir.operation(operation_id?)?;
        Some(BoundOperation {
            operation_id: op.operation_id.clone(),
            method_name: op.name.clone(),
            http_method: op.method.to_string(),
            path: op.path.clone(),
            path_parameters: op.path_parameters().map(|p| p.name.clone()).collect(),
        })
    }

    fn object_classes(&self) -> Vec<ObjectClassContext> {
        self.ir
            .object_classes
            .iter()
            .map(|class| {
                let bindings = &class.bindings;
                ObjectClassContext {
                    ldap_name: class.ldap_name.clone(),
                    handler: class.handler.clone(),
                    model_class: class.model_class.clone(),
                    primary_key: class.primary_key.clone(),
                    attributes: class
                        .attributes
                        .iter()
                        .map(|attr| AttributeContext {
                            ldap_name: attr.ldap_name.clone(),
                            source: attr.source.as_str().to_string(),
                            from_path: matches!(attr.source, AttributeSource::PathExpression(_)),
                            java_type: self.types.render(&attr.ty),
                            directory_type: attr.directory_type.to_string(),
                            multi_valued: attr.multi_valued,
                            read_only: attr.read_only,
                            required: attr.required,
                            primary_key: attr.primary_key,
                            api_query_param: attr.api_query_param.clone(),
                        })
                        .collect(),
                    bindings: BindingsContext {
                        search: self.bound(bindings.search.as_ref()),
                        lookup: self.bound(bindings.lookup.as_ref()),
                        insert: self.bound(bindings.insert.as_ref()),
                        modify: self.bound(bindings.modify.as_ref()),
                        delete: self.bound(bindings.delete.as_ref()),
                    },
                }
            })
            .collect()
    }

    fn dn(&self) -> DnContext {
        let dn = &self.ir.dn_structure;
        DnContext {
            base_dn_suffix: dn.base_dn_suffix.clone(),
            rdn_attribute: dn.rdn_attribute.clone(),
            components: dn
                .components
                .iter()
                .map(|c| DnComponentContext {
                    ldap_name: c.ldap_name.clone(),
                    parameter_name: c.parameter_name.clone(),
                })
                .collect(),
        }
    }

    pub fn request_converter(&self) -> ConverterContext {
        let imports = vec![
            sdk_class("converter.TypeConverter"),
            sdk_class("request.AddRequest"),
            sdk_class("request.DeleteRequest"),
            sdk_class("request.LdapRequest"),
            sdk_class("request.ModifyRequest"),
            sdk_class("request.SearchRequest"),
            format!("{}.*", self.model_package()),
            "java.util.ArrayList".to_string(),
            "java.util.LinkedHashMap".to_string(),
            "java.util.List".to_string(),
            "java.util.Map".to_string(),
            "org.slf4j.Logger".to_string(),
            "org.slf4j.LoggerFactory".to_string(),
        ];
        self.converter(
            &self.ir.names.request_converter_class,
            ConverterKind::Request,
            simple_name(&sdk_class("request.LdapRequest")).to_string(),
            self.ir.names.backend_request_class.clone(),
            imports,
        )
    }

    pub fn response_converter(&self) -> ConverterContext {
        let imports = vec![
            "com.fasterxml.jackson.databind.JsonNode".to_string(),
            "com.fasterxml.jackson.databind.ObjectMapper".to_string(),
            sdk_class("converter.TypeConverter"),
            sdk_class("response.ResponseEntity"),
            sdk_class("response.ResponseStatus"),
            sdk_class("response.SearchResultEntry"),
            format!("{}.*", self.model_package()),
            "java.util.ArrayList".to_string(),
            "java.util.LinkedHashMap".to_string(),
            "java.util.List".to_string(),
            "java.util.Map".to_string(),
            "org.slf4j.Logger".to_string(),
            "org.slf4j.LoggerFactory".to_string(),
        ];
        self.converter(
            &self.ir.names.response_converter_class,
            ConverterKind::Response,
            self.ir.names.backend_response_class.clone(),
            "Object".to_string(),
            imports,
        )
    }

    fn converter(
        &self,
        class_name: &str,
        kind: ConverterKind,
        input_type: String,
        output_type: String,
        mut imports: Vec<String>,
    ) -> ConverterContext {
        let object_classes = self.object_classes();
        let uses_path_expressions = object_classes
            .iter()
            .flat_map(|c| &c.attributes)
            .any(|a| a.from_path);
        if kind == ConverterKind::Response && uses_path_expressions {
            imports.insert(0, "com.jayway.jsonpath.JsonPath".to_string());
        }
        ConverterContext {
            package_name: self.converter_package(),
            class_name: class_name.to_string(),
            kind,
            input_type,
            output_type,
            imports,
            backend_request_class: self.ir.names.backend_request_class.clone(),
            backend_response_class: self.ir.names.backend_response_class.clone(),
            object_classes,
            dn: self.dn(),
            uses_path_expressions,
            operation_metadata_json: self.operation_metadata_json.clone(),
        }
    }

    pub fn connector(&self) -> ConnectorContext {
        let names = &self.ir.names;
        let capabilities = CapabilityFlags {
            search: self.ir.has_capability(Capability::Search),
            insertion: self.ir.has_capability(Capability::Insertion),
            modification: self.ir.has_capability(Capability::Modification),
            deletion: self.ir.has_capability(Capability::Deletion),
            test_connect: self.ir.has_capability(Capability::TestConnect),
            schema_extraction: self.ir.has_capability(Capability::SchemaExtraction),
        };

        let mut imports: BTreeSet<String> = [
            "com.fasterxml.jackson.core.type.TypeReference",
            "com.fasterxml.jackson.databind.ObjectMapper",
            "java.io.IOException",
            "java.util.Collections",
            "java.util.List",
            "java.util.Map",
            "org.slf4j.Logger",
            "org.slf4j.LoggerFactory",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        imports.insert(sdk_class("annotation.CustomConnector"));
        imports.insert(sdk_class("annotation.ManagedComponent"));
        imports.insert(sdk_class("annotation.Inject"));
        imports.insert(sdk_class("response.ResponseEntity"));
        imports.insert(sdk_class("response.ResponseStatus"));
        imports.insert(sdk_class("response.SearchResultEntry"));
        imports.insert(format!("{}.*", self.model_package()));
        imports.insert(format!("{}.{}", self.client_package(), names.client_class));
        imports.insert(format!(
            "{}.{}",
            self.converter_package(),
            names.response_converter_class
        ));

        let request = &names.backend_request_class;
        let response = &names.backend_response_class;
        let mut interfaces = Vec::new();
        let mut implement = |interface: &str, generics: String| {
            let qualified = sdk_class(interface);
            interfaces.push(format!("{}{}", simple_name(&qualified), generics));
            imports.insert(qualified);
        };
        if capabilities.search {
            implement("op.ReadOperations", format!("<{}, List<SearchResultEntry>>", request));
        }
        if capabilities.insertion {
            implement(
                "op.CreateOperations",
                format!("<{}, ResponseEntity<{}>>", request, response),
            );
        }
        if capabilities.modification {
            implement(
                "op.ModifyOperations",
                format!("<{}, ResponseEntity<{}>>", request, response),
            );
        }
        if capabilities.deletion {
            implement("op.DeleteOperations", format!("<{}, ResponseEntity<?>>", request));
        }
        if capabilities.test_connect {
            implement("op.TestConnectionOperations", "<?>".to_string());
        }
        if capabilities.schema_extraction {
            implement("op.SchemaExtractionOperations", String::new());
            imports.insert("java.io.InputStream".to_string());
            imports.insert("java.nio.charset.StandardCharsets".to_string());
        }

        let operations = self
            .ir
            .operations
            .iter()
            .map(|op| {
                for param in &op.parameters {
                    self.types.collect_imports(&param.ty, &mut imports);
                }
                dispatch(op, &self.types)
            })
            .collect();

        ConnectorContext {
            package_name: names.package_name.clone(),
            class_name: names.connector_class.clone(),
            display_name: names.display_name.clone(),
            imports: imports.into_iter().collect(),
            interfaces,
            capabilities,
            client_class: names.client_class.clone(),
            client_var: names.client_var.clone(),
            response_converter_class: names.response_converter_class.clone(),
            response_converter_var: names.response_converter_var.clone(),
            backend_request_class: request.clone(),
            backend_response_class: response.clone(),
            meta_json_path: META_JSON_PATH.to_string(),
            schema_path: SCHEMA_PATH.to_string(),
            operations,
            operation_metadata_json: self.operation_metadata_json.clone(),
        }
    }

    pub fn schema(&self) -> SchemaContext {
        SchemaContext {
            connector_name: self.ir.names.display_name.clone(),
            base_dn_suffix: self.ir.dn_structure.base_dn_suffix.clone(),
            rdn_attribute: self.ir.dn_structure.rdn_attribute.clone(),
            object_classes: self
                .ir
                .object_classes
                .iter()
                .map(|class| SchemaObjectClass {
                    ldap_name: class.ldap_name.clone(),
                    primary_key: class.primary_key.clone(),
                    attributes: class
                        .attributes
                        .iter()
                        .map(|attr| SchemaAttribute {
                            ldap_name: attr.ldap_name.clone(),
                            attribute_type: attr.directory_type.to_string(),
                            primary_key: attr.primary_key,
                            multi_valued: attr.multi_valued,
                            read_only: attr.read_only,
                            required: attr.required,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn meta(&self) -> MetaContext {
        MetaContext {
            connector_name: self.ir.names.display_name.clone(),
            description: self.ir.metadata.description.clone(),
            version: self.ir.metadata.version.clone(),
            category: CONNECTOR_CATEGORY.to_string(),
            schema_extractable: self.ir.has_capability(Capability::SchemaExtraction),
            multiple_accounts_supported: false,
            properties: self
                .ir
                .connection_properties
                .iter()
                .map(|p| MetaProperty {
                    name: p.name.clone(),
                    label: p.label.clone(),
                    property_type: match p.kind {
                        PropertyKind::Password => "password",
                        PropertyKind::String | PropertyKind::Url => "text",
                    }
                    .to_string(),
                    required: p.required,
                    description: p.description.clone(),
                    default: p.default.clone(),
                })
                .collect(),
        }
    }
}

/// Operation identity → client method metadata, in operation order
pub fn operation_metadata(
    ir: &ConnectorIr,
    types: &JavaTypes,
) -> IndexMap<String, OperationMetadata> {
    ir.operations
        .iter()
        .map(|op| {
            let metadata = OperationMetadata {
                name: op.name.clone(),
                signature: op
                    .parameters
                    .iter()
                    .map(|p| (types.render(&p.ty), p.variable_name.clone()))
                    .collect(),
                return_type: ir.names.backend_response_class.clone(),
                payload_type: types.payload(op.response_type()),
            };
            (op.operation_id.clone(), metadata)
        })
        .collect()
}

fn dispatch(op: &OperationDescriptor, types: &JavaTypes) -> DispatchContext {
    DispatchContext {
        name: op.name.clone(),
        operation_id: op.operation_id.clone(),
        arguments: op
            .parameters
            .iter()
            .map(|p| DispatchArgument {
                location: p.location.to_string(),
                wire_name: p.name.clone(),
                java_type: types.render(&p.ty),
            })
            .collect(),
    }
}

fn location_name(location: ApiKeyLocation) -> &'static str {
    match location {
        ApiKeyLocation::Header => "header",
        ApiKeyLocation::Query => "query",
        ApiKeyLocation::Cookie => "cookie",
    }
}

fn flow_name(flow: OAuthFlowKind) -> &'static str {
    match flow {
        OAuthFlowKind::AuthorizationCode => "authorizationCode",
        OAuthFlowKind::ClientCredentials => "clientCredentials",
        OAuthFlowKind::Implicit => "implicit",
        OAuthFlowKind::Password => "password",
        OAuthFlowKind::OpenIdConnect => "openIdConnect",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::directory_ir;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operation_metadata_signature() {
        let ir = directory_ir();
        let types = JavaTypes::new(&ir);
        let metadata = operation_metadata(&ir, &types);

        let keys: Vec<&str> = metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["listUsers", "createUser", "getUser", "updateUser", "deleteUser"]);

        let list = &metadata["listUsers"];
        assert_eq!(list.name, "listUsers");
        assert_eq!(list.signature, vec![("Integer".to_string(), "limit".to_string())]);
        assert_eq!(list.return_type, "BackendResponse");
        assert_eq!(list.payload_type, "List<User>");

        let create = &metadata["createUser"];
        assert_eq!(create.signature, vec![("User".to_string(), "body".to_string())]);
        assert_eq!(metadata["deleteUser"].payload_type, "Void");
    }

    #[test]
    fn test_metadata_json_uses_camel_case_keys() {
        let ir = directory_ir();
        let builder = ContextBuilder::new(&ir).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(builder.operation_metadata_json()).unwrap();
        assert_eq!(json["getUser"]["payloadType"], "User");
        assert_eq!(json["getUser"]["signature"][0][0], "String");
        assert_eq!(json["getUser"]["signature"][0][1], "userId");
    }

    #[test]
    fn test_model_context() {
        let ir = directory_ir();
        let builder = ContextBuilder::new(&ir).unwrap();
        let models = builder.models();
        assert_eq!(models.len(), 1);

        let user = &models[0];
        assert_eq!(user.package_name, "org.acme.users.model");
        assert_eq!(user.class_name, "User");
        assert!(user.imports.contains(&"java.time.OffsetDateTime".to_string()));
        let created = user.fields.iter().find(|f| f.json_property == "created_at").unwrap();
        assert_eq!(created.name, "createdAt");
        assert_eq!(created.java_type, "OffsetDateTime");
    }

    #[test]
    fn test_client_context_auth_uses_allocated_properties() {
        let ir = directory_ir();
        let client = ContextBuilder::new(&ir).unwrap().client();
        assert_eq!(client.class_name, "UserDirectoryClient");
        assert_eq!(client.base_url_property, "baseUrl");
        assert_eq!(client.auth.api_keys.len(), 1);
        assert_eq!(client.auth.api_keys[0].key_name, "X-API-Key");
        assert_eq!(client.auth.api_keys[0].property, "xAPIKeyApiKey");
        assert!(client.auth.basic.is_none());

        let get = client.methods.iter().find(|m| m.name == "getUser").unwrap();
        assert_eq!(get.path_parameters[0].placeholder, "{userId}");
        assert_eq!(get.payload_type, "User");

        let target = client.test_connection.unwrap();
        assert_eq!(target.method, "listUsers");
        assert_eq!(target.arguments, vec!["null"]);
    }

    #[test]
    fn test_converter_bindings_resolve_method_names() {
        let ir = directory_ir();
        let converter = ContextBuilder::new(&ir).unwrap().request_converter();
        assert_eq!(converter.kind, ConverterKind::Request);
        assert_eq!(converter.input_type, "LdapRequest");
        assert_eq!(converter.output_type, "BackendRequest");

        let person = &converter.object_classes[0];
        assert_eq!(person.handler, "convertInetOrgPerson");
        let lookup = person.bindings.lookup.as_ref().unwrap();
        assert_eq!(lookup.method_name, "getUser");
        assert_eq!(lookup.path_parameters, vec!["userId"]);
        assert_eq!(person.bindings.search.as_ref().unwrap().method_name, "listUsers");
        assert!(converter.uses_path_expressions);
    }

    #[test]
    fn test_connector_interfaces_follow_capabilities() {
        let ir = directory_ir();
        let connector = ContextBuilder::new(&ir).unwrap().connector();
        assert_eq!(
            connector.interfaces,
            vec![
                "ReadOperations<BackendRequest, List<SearchResultEntry>>",
                "CreateOperations<BackendRequest, ResponseEntity<BackendResponse>>",
                "ModifyOperations<BackendRequest, ResponseEntity<BackendResponse>>",
                "DeleteOperations<BackendRequest, ResponseEntity<?>>",
                "TestConnectionOperations<?>",
            ]
        );
        assert_eq!(connector.client_var, "userDirectoryClient");
        assert!(connector
            .imports
            .contains(&"com.radiantlogic.iddm.connector.sdk.op.ReadOperations".to_string()));
        assert!(!connector.capabilities.schema_extraction);
    }

    #[test]
    fn test_schema_and_meta_contexts() {
        let ir = directory_ir();
        let builder = ContextBuilder::new(&ir).unwrap();

        let schema = builder.schema();
        let person = &schema.object_classes[0];
        assert_eq!(person.ldap_name, "inetOrgPerson");
        let mail = person.attributes.iter().find(|a| a.ldap_name == "mail").unwrap();
        assert!(mail.multi_valued);
        assert_eq!(mail.attribute_type, "string");

        let meta = builder.meta();
        assert_eq!(meta.category, "Custom");
        assert!(!meta.multiple_accounts_supported);
        let types: Vec<&str> = meta.properties.iter().map(|p| p.property_type.as_str()).collect();
        assert_eq!(types, vec!["text", "password"]);
    }
}
