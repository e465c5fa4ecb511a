//! Integration tests for connector IR assembly

use dataconnector_generator_common::{
    ApiKeyLocation, AuthRequirement, Capability, DiagnosticKind, DirectoryType, GeneratorError,
    GeneratorOptions, HttpMethod, ParameterLocation, PrimitiveKind, PropertyRole, ResponsePayload,
    Severity, TypeDescriptor,
};
use dataconnector_generator_parser::{
    build_connector_ir, ApiDocument, Assembly, MappingDocument, Scope,
};
use pretty_assertions::assert_eq;

const DIRECTORY_API: &str = r##"{
    "openapi": "3.0.1",
    "info": { "title": "User Directory", "version": "2.1.0", "description": "Users and groups" },
    "servers": [
        {
            "url": "https://{tenant}.example.com/api/v2",
            "variables": { "tenant": { "default": "acme" } }
        }
    ],
    "security": [ { "apiKeyAuth": [] } ],
    "paths": {
        "/users": {
            "get": {
                "operationId": "listUsers",
                "parameters": [
                    { "name": "filter", "in": "query", "schema": { "type": "string" } },
                    { "name": "limit", "in": "query", "schema": { "type": "integer", "format": "int32" } }
                ],
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "application/json": {
                                "schema": { "type": "array", "items": { "$ref": "#/components/schemas/User" } }
                            }
                        }
                    }
                }
            },
            "post": {
                "operationId": "createUser",
                "requestBody": {
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/User" } } }
                },
                "responses": {
                    "201": {
                        "description": "Created",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/User" } } }
                    }
                }
            }
        },
        "/users/{userId}": {
            "parameters": [
                { "name": "userId", "in": "path", "required": true, "schema": { "type": "string" } }
            ],
            "get": {
                "operationId": "getUser",
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/User" } } }
                    }
                }
            },
            "put": {
                "operationId": "updateUser",
                "requestBody": {
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/User" } } }
                },
                "responses": { "200": { "description": "OK" } }
            },
            "delete": {
                "operationId": "deleteUser",
                "responses": { "204": { "description": "Deleted" } }
            }
        },
        "/status": {
            "get": {
                "operationId": "getStatus",
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": { "application/json": { "schema": { "type": "object" } } }
                    }
                }
            }
        }
    },
    "components": {
        "securitySchemes": {
            "apiKeyAuth": { "type": "apiKey", "name": "X-API-Key", "in": "header" },
            "unused": { "type": "http", "scheme": "basic" }
        },
        "schemas": {
            "User": {
                "type": "object",
                "required": ["id", "userName"],
                "properties": {
                    "id": { "type": "string", "readOnly": true },
                    "userName": { "type": "string" },
                    "displayName": { "type": "string" },
                    "age": { "type": "integer", "format": "int64" },
                    "active": { "type": "boolean" },
                    "emails": { "type": "array", "items": { "type": "string" } },
                    "createdAt": { "type": "string", "format": "date-time" },
                    "manager": { "$ref": "#/components/schemas/User" },
                    "attributes": { "type": "object", "additionalProperties": { "type": "string" } }
                }
            }
        }
    }
}"##;

const DIRECTORY_MAPPING: &str = r##"{
    "dnStructure": {
        "baseDnSuffix": "ou=users,o=rest",
        "rdnAttribute": "uid",
        "components": [ { "ldapName": "uid", "openApiParameterName": "userId" } ]
    },
    "objectClasses": {
        "person": {
            "ldapName": "inetOrgPerson",
            "openApiSchemaRef": "#/components/schemas/User",
            "apiEndpoint": "/users/{userId}",
            "primaryKeyLdapAttribute": "uid",
            "attributes": [
                { "ldapName": "uid", "openApiPropertyName": "id" },
                { "ldapName": "cn", "openApiPropertyName": "userName", "apiQueryParam": "filter" },
                { "ldapName": "displayName", "openApiPropertyName": "displayName", "required": true },
                { "ldapName": "employeeNumber", "openApiPropertyName": "age" },
                { "ldapName": "mail", "openApiPropertyName": "emails" },
                { "ldapName": "createTimestamp", "openApiPropertyName": "createdAt" },
                { "ldapName": "telephoneNumber", "jsonPath": "$.contact.email" }
            ]
        }
    }
}"##;

fn assemble(api: &str, mapping: &str, options: &GeneratorOptions) -> Assembly {
    let api = ApiDocument::from_json(api).unwrap();
    let mapping = MappingDocument::from_json(mapping).unwrap();
    build_connector_ir(&api, &mapping, options).unwrap()
}

fn directory() -> Assembly {
    assemble(DIRECTORY_API, DIRECTORY_MAPPING, &GeneratorOptions::default())
}

#[test]
fn test_metadata_and_names() {
    let assembly = directory();
    let ir = &assembly.ir;

    assert_eq!(ir.metadata.title, "User Directory");
    assert_eq!(ir.metadata.version, "2.1.0");
    assert_eq!(
        ir.metadata.base_url.as_deref(),
        Some("https://{tenant}.example.com/api/v2")
    );
    assert_eq!(
        ir.metadata.base_url_example.as_deref(),
        Some("https://acme.example.com/api/v2")
    );

    assert_eq!(ir.names.display_name, "User Directory");
    assert_eq!(ir.names.client_class, "UserDirectoryClient");
    assert_eq!(ir.names.connector_class, "UserDirectoryConnector");
    assert_eq!(ir.names.request_converter_class, "LdapToBackendRequestConverter");
    assert_eq!(ir.names.response_converter_class, "BackendToLdapResponseConverter");
    assert_eq!(ir.names.client_var, "userDirectoryClient");
    assert_eq!(ir.names.response_converter_var, "backendToLdapResponseConverter");
}

#[test]
fn test_connector_name_option_wins() {
    let options = GeneratorOptions {
        connector_name: Some("Acme Users".to_string()),
        schema_extraction: true,
        ..GeneratorOptions::default()
    };
    let assembly = assemble(DIRECTORY_API, DIRECTORY_MAPPING, &options);
    assert_eq!(assembly.ir.names.display_name, "Acme Users");
    assert_eq!(assembly.ir.names.client_class, "UserDirectoryClient");
    assert!(assembly.ir.has_capability(Capability::SchemaExtraction));
}

#[test]
fn test_models() {
    let assembly = directory();
    let user = assembly.ir.model("User").unwrap();
    assert_eq!(user.class_name, "User");

    let field = |name: &str| user.fields.iter().find(|f| f.property_name == name).unwrap();
    assert!(field("id").required);
    assert!(field("id").read_only);
    assert!(!field("displayName").required);
    assert_eq!(field("age").ty, TypeDescriptor::Primitive(PrimitiveKind::Integer64));
    assert_eq!(
        field("emails").ty,
        TypeDescriptor::list_of(TypeDescriptor::Primitive(PrimitiveKind::String))
    );
    assert_eq!(field("manager").ty, TypeDescriptor::Reference("User".to_string()));
    assert_eq!(
        field("attributes").ty,
        TypeDescriptor::map_of(TypeDescriptor::Primitive(PrimitiveKind::String))
    );
}

#[test]
fn test_operations() {
    let assembly = directory();
    let ir = &assembly.ir;

    let ids: Vec<&str> = ir.operations.iter().map(|op| op.operation_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["listUsers", "createUser", "getUser", "updateUser", "deleteUser", "getStatus"]
    );

    let list = ir.operation("listUsers").unwrap();
    assert_eq!(list.method, HttpMethod::Get);
    assert_eq!(list.parameters.len(), 2);
    assert!(list.parameters.iter().all(|p| p.location == ParameterLocation::Query));
    assert_eq!(
        list.response_type(),
        Some(&TypeDescriptor::list_of(TypeDescriptor::Reference("User".to_string())))
    );

    let update = ir.operation("updateUser").unwrap();
    let locations: Vec<ParameterLocation> = update.parameters.iter().map(|p| p.location).collect();
    assert_eq!(locations, vec![ParameterLocation::Path, ParameterLocation::Body]);
    assert_eq!(update.response, Some(ResponsePayload::Empty));

    let delete = ir.operation("deleteUser").unwrap();
    assert_eq!(delete.response, Some(ResponsePayload::Empty));
    assert_eq!(delete.path_parameters().count(), 1);

    let status = ir.operation("getStatus").unwrap();
    assert_eq!(status.response_type(), Some(&TypeDescriptor::open_object()));
}

#[test]
fn test_capabilities() {
    let assembly = directory();
    let capabilities: Vec<Capability> = assembly.ir.capabilities.iter().copied().collect();
    assert_eq!(
        capabilities,
        vec![
            Capability::Search,
            Capability::Insertion,
            Capability::Modification,
            Capability::Deletion,
            Capability::TestConnect,
        ]
    );
}

#[test]
fn test_object_class_mapping() {
    let assembly = directory();
    let person = assembly.ir.object_class("inetOrgPerson").unwrap();

    assert_eq!(person.schema_name, "User");
    assert_eq!(person.model_class, "User");
    assert_eq!(person.handler, "convertInetOrgPerson");
    assert_eq!(person.primary_key.as_deref(), Some("uid"));

    let pks: Vec<&str> = person
        .attributes
        .iter()
        .filter(|a| a.primary_key)
        .map(|a| a.ldap_name.as_str())
        .collect();
    assert_eq!(pks, vec!["uid"]);

    let attribute = |name: &str| person.attributes.iter().find(|a| a.ldap_name == name).unwrap();
    assert!(attribute("uid").read_only);
    assert!(attribute("cn").required);
    assert_eq!(attribute("cn").api_query_param.as_deref(), Some("filter"));
    assert!(attribute("displayName").required);
    assert_eq!(attribute("employeeNumber").directory_type, DirectoryType::Long);
    assert!(attribute("mail").multi_valued);
    assert_eq!(attribute("mail").directory_type, DirectoryType::String);
    assert_eq!(
        attribute("createTimestamp").directory_type,
        DirectoryType::GeneralizedTime
    );

    let bindings = &person.bindings;
    assert_eq!(bindings.search.as_deref(), Some("listUsers"));
    assert_eq!(bindings.lookup.as_deref(), Some("getUser"));
    assert_eq!(bindings.insert.as_deref(), Some("createUser"));
    assert_eq!(bindings.modify.as_deref(), Some("updateUser"));
    assert_eq!(bindings.delete.as_deref(), Some("deleteUser"));
}

#[test]
fn test_missing_path_expression_is_a_gap() {
    let assembly = directory();
    let person = assembly.ir.object_class("inetOrgPerson").unwrap();
    let phone = person
        .attributes
        .iter()
        .find(|a| a.ldap_name == "telephoneNumber")
        .unwrap();

    assert!(!phone.resolved);
    assert_eq!(phone.ty, TypeDescriptor::Any);

    let gap = assembly
        .diagnostics
        .of_kind(DiagnosticKind::ResolutionGap)
        .find(|d| d.location == "objectClasses/person/attributes/6")
        .unwrap();
    assert_eq!(gap.severity, Severity::Warning);
    assert!(!assembly.has_errors());
}

#[test]
fn test_auth_and_connection_properties() {
    let assembly = directory();
    let ir = &assembly.ir;

    assert_eq!(
        ir.auth,
        vec![AuthRequirement::ApiKey {
            scheme: "apiKeyAuth".to_string(),
            name: "X-API-Key".to_string(),
            location: ApiKeyLocation::Header,
        }]
    );

    let names: Vec<&str> = ir.connection_properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["baseUrl", "xAPIKeyApiKey"]);
    assert_eq!(
        ir.connection_properties[0].default.as_deref(),
        Some("https://{tenant}.example.com/api/v2")
    );
    let key = ir.property(PropertyRole::ApiKey, Some("apiKeyAuth")).unwrap();
    assert_eq!(key.name, "xAPIKeyApiKey");
    assert!(ir.property(PropertyRole::Username, None).is_none());
}

#[test]
fn test_test_connection_target() {
    let assembly = directory();
    let target = assembly.ir.test_connection.as_ref().unwrap();
    assert_eq!(target.operation_id, "getStatus");
    assert!(!target.has_parameters);
}

#[test]
fn test_mapping_source_is_verbatim() {
    let assembly = directory();
    let raw: serde_json::Value = serde_json::from_str(DIRECTORY_MAPPING).unwrap();
    assert_eq!(assembly.ir.mapping_source, raw);
    assert_eq!(assembly.ir.dn_structure.components[0].parameter_name, "userId");
}

#[test]
fn test_repeated_runs_are_identical() {
    let first = serde_json::to_string(&directory().ir).unwrap();
    let second = serde_json::to_string(&directory().ir).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unresolvable_primary_key_excludes_only_that_class() {
    let mapping = r##"{
        "dnStructure": { "baseDnSuffix": "o=rest", "rdnAttribute": "uid" },
        "objectClasses": {
            "person": {
                "ldapName": "inetOrgPerson",
                "openApiSchemaName": "User",
                "attributes": [ { "ldapName": "uid", "openApiPropertyName": "id", "primaryKey": true } ]
            },
            "broken": {
                "ldapName": "brokenClass",
                "openApiSchemaName": "User",
                "primaryKeyLdapAttribute": "uid",
                "attributes": [ { "ldapName": "uid", "jsonPath": "$.identity.id" } ]
            }
        }
    }"##;
    let assembly = assemble(DIRECTORY_API, mapping, &GeneratorOptions::default());

    assert!(assembly.ir.object_class("inetOrgPerson").is_some());
    assert!(assembly.ir.object_class("brokenClass").is_none());
    assert!(assembly.has_errors());
    assert!(assembly.diagnostics.has_kind(DiagnosticKind::MappingIntegrity));
}

#[test]
fn test_duplicate_object_class_name_is_fatal() {
    let mapping = r##"{
        "dnStructure": { "baseDnSuffix": "o=rest", "rdnAttribute": "uid" },
        "objectClasses": {
            "person": {
                "ldapName": "inetOrgPerson",
                "openApiSchemaName": "User",
                "attributes": [ { "ldapName": "uid", "openApiPropertyName": "id", "primaryKey": true } ]
            },
            "people": {
                "ldapName": "inetOrgPerson",
                "openApiSchemaName": "User",
                "attributes": [ { "ldapName": "uid", "openApiPropertyName": "id", "primaryKey": true } ]
            }
        }
    }"##;
    let api = ApiDocument::from_json(DIRECTORY_API).unwrap();
    let mapping = MappingDocument::from_json(mapping).unwrap();
    let err = build_connector_ir(&api, &mapping, &GeneratorOptions::default()).unwrap_err();
    match err {
        GeneratorError::SymbolConflict { scope, name, .. } => {
            assert_eq!(scope, "object class");
            assert_eq!(name, "inetOrgPerson");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_colliding_handlers_are_suffixed() {
    let mapping = r##"{
        "dnStructure": { "baseDnSuffix": "o=rest", "rdnAttribute": "uid" },
        "objectClasses": {
            "person": {
                "ldapName": "inetOrgPerson",
                "openApiSchemaName": "User",
                "attributes": [ { "ldapName": "uid", "openApiPropertyName": "id", "primaryKey": true } ]
            },
            "legacy": {
                "ldapName": "inet-org-person",
                "openApiSchemaName": "User",
                "attributes": [ { "ldapName": "uid", "openApiPropertyName": "id", "primaryKey": true } ]
            }
        }
    }"##;
    let assembly = assemble(DIRECTORY_API, mapping, &GeneratorOptions::default());
    let handlers: Vec<&str> = assembly
        .ir
        .object_classes
        .iter()
        .map(|class| class.handler.as_str())
        .collect();
    assert_eq!(handlers, vec!["convertInetOrgPerson", "convertInetOrgPerson2"]);
    assert_eq!(
        assembly
            .symbols
            .origin(&Scope::ConverterMethod, "convertInetOrgPerson2"),
        Some("object class 'inet-org-person'")
    );
    assert!(assembly.symbols.contains(&Scope::ConverterMethod, "convert"));
}

#[test]
fn test_duplicate_operation_id_is_fatal() {
    let api = r##"{
        "openapi": "3.0.0",
        "info": { "title": "Things", "version": "1" },
        "paths": {
            "/users": { "get": { "operationId": "listThings", "responses": { "200": { "description": "OK" } } } },
            "/groups": { "get": { "operationId": "listThings", "responses": { "200": { "description": "OK" } } } }
        }
    }"##;
    let mapping = r##"{
        "dnStructure": { "baseDnSuffix": "o=things", "rdnAttribute": "cn" },
        "objectClasses": {}
    }"##;
    let api = ApiDocument::from_json(api).unwrap();
    let mapping = MappingDocument::from_json(mapping).unwrap();
    let err = build_connector_ir(&api, &mapping, &GeneratorOptions::default()).unwrap_err();
    match err {
        GeneratorError::SymbolConflict { name, incoming, .. } => {
            assert_eq!(name, "listThings");
            assert!(incoming.contains("/groups"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_items_without_identifiers() {
    let api = r##"{
        "openapi": "3.0.0",
        "info": { "title": "Items", "version": "1" },
        "paths": {
            "/items": {
                "get": { "responses": { "200": { "description": "OK" } } },
                "post": { "responses": { "201": { "description": "Created" } } }
            }
        }
    }"##;
    let mapping = r##"{
        "dnStructure": { "baseDnSuffix": "o=items", "rdnAttribute": "cn" },
        "objectClasses": {}
    }"##;
    let assembly = assemble(api, mapping, &GeneratorOptions::default());
    let ir = &assembly.ir;

    assert_eq!(ir.operations.len(), 2);
    assert_ne!(ir.operations[0].operation_id, ir.operations[1].operation_id);
    assert!(ir.operations.iter().all(|op| op.id_synthesized));
    assert_eq!(
        ir.capabilities.iter().copied().collect::<Vec<_>>(),
        vec![Capability::Search, Capability::Insertion, Capability::TestConnect]
    );
    assert_eq!(
        assembly
            .diagnostics
            .of_kind(DiagnosticKind::SynthesizedIdentifier)
            .count(),
        2
    );
}

#[test]
fn test_search_capability_tracks_get() {
    let without_get = r##"{
        "openapi": "3.0.0",
        "info": { "title": "Writes", "version": "1" },
        "paths": { "/items": { "post": { "operationId": "createItem" } } }
    }"##;
    let mapping = r##"{
        "dnStructure": { "baseDnSuffix": "o=items", "rdnAttribute": "cn" },
        "objectClasses": {}
    }"##;
    let assembly = assemble(without_get, mapping, &GeneratorOptions::default());
    assert!(!assembly.ir.has_capability(Capability::Search));
    assert!(assembly.ir.test_connection.is_none());

    assert!(directory().ir.has_capability(Capability::Search));
}

#[test]
fn test_structural_error_names_location() {
    let mapping = r##"{
        "dnStructure": { "baseDnSuffix": "o=rest", "rdnAttribute": "uid" },
        "objectClasses": {
            "person": {
                "ldapName": "inetOrgPerson",
                "openApiSchemaName": "User",
                "attributes": [
                    { "ldapName": "uid", "openApiPropertyName": "id", "jsonPath": "$.id" }
                ]
            }
        }
    }"##;
    let err = MappingDocument::from_json(mapping).unwrap_err();
    match err {
        GeneratorError::Structural { path, .. } => {
            assert_eq!(path, "objectClasses/person/attributes/0");
        }
        other => panic!("unexpected error {:?}", other),
    }
}
