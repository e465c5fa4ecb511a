//! Integration test for connector generation

use dataconnector_generator_common::GeneratorOptions;
use dataconnector_generator_generator::{generate_connector, ConnectorGenerator, FsSink};
use dataconnector_generator_parser::{build_connector_ir, ApiDocument, MappingDocument};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GROUPS_API: &str = r##"
openapi: 3.0.1
info:
  title: Team Groups
  version: 2.0.0
servers:
  - url: https://groups.example.org/api
security:
  - basicAuth: []
paths:
  /groups:
    get:
      operationId: listGroups
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Group"
    post:
      operationId: createGroup
      requestBody:
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/Group"
      responses:
        "201":
          description: Created
  /groups/{groupId}:
    get:
      operationId: getGroup
      parameters:
        - name: groupId
          in: path
          required: true
          schema:
            type: string
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Group"
components:
  securitySchemes:
    basicAuth:
      type: http
      scheme: basic
  schemas:
    Group:
      type: object
      properties:
        id:
          type: string
        name:
          type: string
        members:
          type: array
          items:
            type: string
"##;

const GROUPS_MAPPING: &str = r##"{
    "dnStructure": {
        "baseDnSuffix": "ou=groups,o=rest",
        "rdnAttribute": "cn",
        "components": [ { "ldapName": "cn", "openApiParameterName": "groupId" } ]
    },
    "objectClasses": {
        "group": {
            "ldapName": "groupOfNames",
            "openApiSchemaRef": "#/components/schemas/Group",
            "apiEndpoint": "/groups/{groupId}",
            "primaryKeyLdapAttribute": "cn",
            "attributes": [
                { "ldapName": "cn", "openApiPropertyName": "id" },
                { "ldapName": "description", "openApiPropertyName": "name" },
                { "ldapName": "member", "openApiPropertyName": "members" }
            ]
        }
    }
}"##;

fn groups_options() -> GeneratorOptions {
    GeneratorOptions {
        package_name: "org.example.groups".to_string(),
        schema_extraction: true,
        ..GeneratorOptions::default()
    }
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
}

#[test]
fn test_generate_groups_connector() {
    let api = ApiDocument::from_yaml(GROUPS_API).unwrap();
    let mapping = MappingDocument::from_json(GROUPS_MAPPING).unwrap();
    let assembly = build_connector_ir(&api, &mapping, &groups_options()).unwrap();
    assert!(!assembly.has_errors(), "{:?}", assembly.diagnostics);

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().to_str().unwrap();
    let result = generate_connector(assembly.ir, output);
    assert!(result.is_ok(), "Generation failed: {:?}", result);

    let root = temp_dir.path();
    let java = "src/main/java/org/example/groups";
    for path in [
        "src/main/resources/META-INF/connector/meta.json",
        "src/main/resources/META-INF/connector/schema.orx",
        "src/main/resources/mapping_config.json",
    ] {
        assert!(root.join(path).exists(), "{} should exist", path);
    }
    for class in [
        "model/Group.java",
        "model/BackendRequest.java",
        "model/BackendResponse.java",
        "client/TeamGroupsClient.java",
        "converter/LdapToBackendRequestConverter.java",
        "converter/BackendToLdapResponseConverter.java",
        "TeamGroupsConnector.java",
    ] {
        let path = format!("{}/{}", java, class);
        assert!(root.join(&path).exists(), "{} should exist", path);
    }

    let meta: serde_json::Value =
        serde_json::from_str(&read(root, "src/main/resources/META-INF/connector/meta.json"))
            .unwrap();
    assert_eq!(meta["name"], "Team Groups");
    assert_eq!(meta["version"], "2.0.0");
    assert_eq!(meta["schemaExtractable"], true);
    let names: Vec<&str> = meta["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["baseUrl", "httpUsername", "httpPassword"]);
    assert_eq!(
        meta["properties"][0]["default"],
        "https://groups.example.org/api"
    );
    assert_eq!(meta["properties"][2]["type"], "password");

    let schema = read(root, "src/main/resources/META-INF/connector/schema.orx");
    assert!(schema.contains("baseDn=\"ou=groups,o=rest\""));
    assert!(schema.contains("<objectClass ldapName=\"groupOfNames\" primaryKey=\"cn\">"));
    assert!(schema.contains("ldapName=\"member\" type=\"string\" primaryKey=\"false\" multiValued=\"true\""));

    let client = read(root, &format!("{}/client/TeamGroupsClient.java", java));
    assert!(client.contains("public class TeamGroupsClient {"));
    assert!(client.contains("Credentials.basic(property(\"httpUsername\"), property(\"httpPassword\"))"));
    assert!(client.contains("public BackendResponse getGroup(String groupId) throws IOException"));

    let connector = read(root, &format!("{}/TeamGroupsConnector.java", java));
    assert!(connector.contains("public class TeamGroupsConnector implements"));
    assert!(connector.contains("SchemaExtractionOperations"));
    assert!(connector.contains("case \"createGroup\":"));
    assert!(connector.contains("OPERATION_METADATA"));

    let model = read(root, &format!("{}/model/Group.java", java));
    assert!(model.contains("package org.example.groups.model;"));
    assert!(model.contains("private List<String> members;"));

    let copied: serde_json::Value =
        serde_json::from_str(&read(root, "src/main/resources/mapping_config.json")).unwrap();
    let original: serde_json::Value = serde_json::from_str(GROUPS_MAPPING).unwrap();
    assert_eq!(copied, original);
}

#[test]
fn test_generate_into_nested_directory() {
    let api = ApiDocument::from_yaml(GROUPS_API).unwrap();
    let mapping = MappingDocument::from_json(GROUPS_MAPPING).unwrap();
    let assembly = build_connector_ir(&api, &mapping, &groups_options()).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("out").join("connector");
    let generator = ConnectorGenerator::new(assembly.ir).unwrap();
    let written = generator.generate_to_directory(&target).unwrap();

    assert_eq!(written.len(), 10);
    assert!(written.iter().all(|path| target.join(path).is_file()));
}

#[test]
fn test_fs_sink_creates_parents() {
    use dataconnector_generator_generator::ArtifactSink;

    let temp_dir = TempDir::new().unwrap();
    let mut sink = FsSink::new(temp_dir.path());
    sink.write("a/b/c.txt", "hello").unwrap();

    assert_eq!(sink.root(), temp_dir.path());
    assert_eq!(read(temp_dir.path(), "a/b/c.txt"), "hello");
}
