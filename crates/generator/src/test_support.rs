//! Shared IR fixture for unit tests

use dataconnector_generator_common::{ConnectorIr, GeneratorOptions};
use dataconnector_generator_parser::{build_connector_ir, ApiDocument, MappingDocument};

pub const DIRECTORY_API: &str = r##"{
    "openapi": "3.0.3",
    "info": { "title": "User Directory", "version": "1.4.0", "description": "Directory of users" },
    "servers": [ { "url": "https://directory.example.com/v1" } ],
    "security": [ { "apiKeyAuth": [] } ],
    "paths": {
        "/users": {
            "get": {
                "operationId": "listUsers",
                "parameters": [
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
                "responses": { "201": { "description": "Created" } }
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
                "responses": { "204": { "description": "Updated" } }
            },
            "delete": {
                "operationId": "deleteUser",
                "responses": { "204": { "description": "Deleted" } }
            }
        }
    },
    "components": {
        "securitySchemes": {
            "apiKeyAuth": { "type": "apiKey", "name": "X-API-Key", "in": "header" }
        },
        "schemas": {
            "User": {
                "type": "object",
                "required": ["id", "userName"],
                "properties": {
                    "id": { "type": "string", "readOnly": true },
                    "userName": { "type": "string", "description": "Login name" },
                    "created_at": { "type": "string", "format": "date-time" },
                    "emails": { "type": "array", "items": { "type": "string" } },
                    "contact": {
                        "type": "object",
                        "properties": { "email": { "type": "string" } }
                    }
                }
            }
        }
    }
}"##;

pub const DIRECTORY_MAPPING: &str = r##"{
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
                { "ldapName": "mail", "openApiPropertyName": "emails" },
                { "ldapName": "contactMail", "jsonPath": "$.contact.email" }
            ]
        }
    }
}"##;

pub fn directory_ir() -> ConnectorIr {
    let api = ApiDocument::from_json(DIRECTORY_API).unwrap();
    let mapping = MappingDocument::from_json(DIRECTORY_MAPPING).unwrap();
    let options = GeneratorOptions {
        package_name: "org.acme.users".to_string(),
        ..GeneratorOptions::default()
    };
    build_connector_ir(&api, &mapping, &options).unwrap().ir
}
