//! Operation extraction and capability derivation
//!
//! Walks the path table and produces one operation per method × path with
//! classified parameters and resolved request/response payload types.

use crate::openapi::{ApiDocument, Operation, Parameter, PathItem, Response, Schema};
use crate::type_resolver::TypeResolver;
use crate::validation::json_pointer;
use dataconnector_generator_common::naming::{to_snake_case, to_variable_name};
use dataconnector_generator_common::{
    Capability, DiagnosticKind, Diagnostics, GeneratorError, HttpMethod, ParameterLocation,
    PrimitiveKind, ResponsePayload, Result, TypeDescriptor,
};
use indexmap::IndexMap;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Success status codes checked for a response payload, in priority order
const SUCCESS_CODES: [&str; 4] = ["200", "201", "202", "2XX"];

/// Name given to request body parameters
pub const BODY_PARAMETER: &str = "body";

/// An operation as found in the document, before names are allocated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedOperation {
    pub operation_id: String,
    pub id_synthesized: bool,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub parameters: Vec<ExtractedParameter>,
    pub response: Option<ResponsePayload>,
}

impl ExtractedOperation {
    pub fn body(&self) -> Option<&ExtractedParameter> {
        self.parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub ty: TypeDescriptor,
    pub required: bool,
    pub description: Option<String>,
}

/// Derive a stable identifier from method and path
///
/// # Examples
/// ```
/// use dataconnector_generator_common::HttpMethod;
/// use dataconnector_generator_parser::synthesize_operation_id;
///
/// assert_eq!(synthesize_operation_id(HttpMethod::Get, "/items"), "get_items");
/// assert_eq!(
///     synthesize_operation_id(HttpMethod::Delete, "/items/{itemId}"),
///     "delete_items_by_item_id"
/// );
/// ```
pub fn synthesize_operation_id(method: HttpMethod, path: &str) -> String {
    let mut parts = vec![method.key().to_string()];
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let part = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => format!("by_{}", to_snake_case(param)),
            None => to_snake_case(segment),
        };
        if !part.is_empty() {
            parts.push(part);
        }
    }
    if parts.len() == 1 {
        parts.push("root".to_string());
    }
    parts.join("_")
}

/// Capability set implied by the methods present
///
/// # Examples
/// ```
/// use dataconnector_generator_common::{Capability, HttpMethod};
/// use dataconnector_generator_parser::derive_capabilities;
///
/// let caps = derive_capabilities([HttpMethod::Get, HttpMethod::Post], false);
/// assert!(caps.contains(&Capability::Search));
/// assert!(caps.contains(&Capability::Insertion));
/// assert!(caps.contains(&Capability::TestConnect));
/// assert!(!caps.contains(&Capability::SchemaExtraction));
/// ```
pub fn derive_capabilities<I>(methods: I, schema_extraction: bool) -> BTreeSet<Capability>
where
    I: IntoIterator<Item = HttpMethod>,
{
    let mut capabilities = BTreeSet::new();
    for method in methods {
        let capability = match method {
            HttpMethod::Get => Capability::Search,
            HttpMethod::Post => Capability::Insertion,
            HttpMethod::Put | HttpMethod::Patch => Capability::Modification,
            HttpMethod::Delete => Capability::Deletion,
        };
        capabilities.insert(capability);
    }
    capabilities.insert(Capability::TestConnect);
    if schema_extraction {
        capabilities.insert(Capability::SchemaExtraction);
    }
    capabilities
}

/// Names of `{param}` placeholders in a path template, in order
pub fn template_parameters(path: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}

/// Whether a media type carries JSON (`application/json`, `+json` suffixes, parameters allowed)
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn operation_for(item: &PathItem, method: HttpMethod) -> Option<&Operation> {
    match method {
        HttpMethod::Get => item.get.as_ref(),
        HttpMethod::Post => item.post.as_ref(),
        HttpMethod::Put => item.put.as_ref(),
        HttpMethod::Patch => item.patch.as_ref(),
        HttpMethod::Delete => item.delete.as_ref(),
    }
}

/// Walks a document's path table
pub struct OperationExtractor<'a> {
    api: &'a ApiDocument,
    resolver: TypeResolver<'a>,
}

impl<'a> OperationExtractor<'a> {
    pub fn new(api: &'a ApiDocument, resolver: TypeResolver<'a>) -> Self {
        Self { api, resolver }
    }

    /// Extract every operation in path order, then method order
    ///
    /// Two operations declaring ids that produce the same method name are a
    /// `SymbolConflict`.
    pub fn extract(&self, diagnostics: &mut Diagnostics) -> Result<Vec<ExtractedOperation>> {
        // Declared ids are reserved up front, compared by the method name they
        // produce, so synthesized ones never take them
        let mut declared: HashMap<String, String> = HashMap::new();
        for (path, item) in self.api.paths() {
            for method in HttpMethod::ALL {
                let Some(id) = operation_for(item, method).and_then(declared_id) else {
                    continue;
                };
                let origin = format!("operation '{}' ({} {})", id, method, path);
                match declared.entry(to_variable_name(id)) {
                    Entry::Occupied(existing) => {
                        return Err(GeneratorError::SymbolConflict {
                            scope: "operation".to_string(),
                            name: id.to_string(),
                            existing: existing.get().clone(),
                            incoming: origin,
                        });
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(origin);
                    }
                }
            }
        }
        let mut used: HashSet<String> = declared.into_keys().collect();

        let mut operations = Vec::new();
        for (path, item) in self.api.paths() {
            for method in HttpMethod::ALL {
                if let Some(operation) = operation_for(item, method) {
                    let extracted =
                        self.extract_operation(path, item, method, operation, &mut used, diagnostics);
                    operations.push(extracted);
                }
            }
        }

        tracing::debug!(count = operations.len(), "Extracted operations");
        Ok(operations)
    }

    fn extract_operation(
        &self,
        path: &str,
        item: &PathItem,
        method: HttpMethod,
        operation: &Operation,
        used: &mut HashSet<String>,
        diagnostics: &mut Diagnostics,
    ) -> ExtractedOperation {
        let location = json_pointer(&["paths", path, method.key()]);

        let (operation_id, id_synthesized) = match declared_id(operation) {
            Some(id) => (id.to_string(), false),
            None => {
                let base = synthesize_operation_id(method, path);
                let mut candidate = base.clone();
                let mut suffix = 2;
                while used.contains(&to_variable_name(&candidate)) {
                    candidate = format!("{}_{}", base, suffix);
                    suffix += 1;
                }
                used.insert(to_variable_name(&candidate));
                diagnostics.info(
                    DiagnosticKind::SynthesizedIdentifier,
                    &location,
                    format!("operationId missing, using '{}'", candidate),
                );
                (candidate, true)
            }
        };

        let mut parameters = self.collect_parameters(path, item, operation, &location, diagnostics);
        if let Some(body) = self.request_body(operation, &location, diagnostics) {
            if !parameters.iter().any(|p| p.location == ParameterLocation::Body) {
                parameters.push(body);
            }
        }

        let response = self.response_payload(method, operation, &location, diagnostics);

        ExtractedOperation {
            operation_id,
            id_synthesized,
            method,
            path: path.to_string(),
            summary: operation.summary.clone(),
            parameters,
            response,
        }
    }

    /// Merge path-level and operation-level parameters and check them against the template
    fn collect_parameters(
        &self,
        path: &str,
        item: &PathItem,
        operation: &Operation,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> Vec<ExtractedParameter> {
        let mut merged: IndexMap<(String, String), &Parameter> = IndexMap::new();
        for (i, raw) in item.parameters.iter().chain(&operation.parameters).enumerate() {
            match self.api.resolve_parameter(raw) {
                Some(parameter) => {
                    // Operation-level entries come second and replace path-level ones
                    merged.insert((parameter.name.clone(), parameter.location.clone()), parameter);
                }
                None => diagnostics.warning(
                    DiagnosticKind::ResolutionGap,
                    format!("{}/parameters/{}", location, i),
                    format!(
                        "parameter reference '{}' cannot be followed",
                        raw.reference.as_deref().unwrap_or_default()
                    ),
                ),
            }
        }

        let template = template_parameters(path);
        let mut path_params: Vec<ExtractedParameter> = Vec::new();
        let mut query_params = Vec::new();
        let mut body = None;

        for ((name, kind), parameter) in &merged {
            match kind.as_str() {
                "path" => {
                    if !template.contains(&name.as_str()) {
                        diagnostics.warning(
                            DiagnosticKind::ParameterMismatch,
                            location,
                            format!("path parameter '{}' does not appear in the path template", name),
                        );
                        continue;
                    }
                    let mut param = self.parameter(parameter, ParameterLocation::Path, location, diagnostics);
                    param.required = true;
                    path_params.push(param);
                }
                "query" => {
                    query_params.push(self.parameter(parameter, ParameterLocation::Query, location, diagnostics))
                }
                "body" => {
                    let mut param = self.parameter(parameter, ParameterLocation::Body, location, diagnostics);
                    param.name = BODY_PARAMETER.to_string();
                    body.get_or_insert(param);
                }
                "header" | "cookie" => {
                    tracing::debug!(parameter = %name, location = %kind, "Skipping non-signature parameter");
                }
                other => diagnostics.warning(
                    DiagnosticKind::Unsupported,
                    location,
                    format!("parameter '{}' in '{}' is not supported", name, other),
                ),
            }
        }

        // Every template placeholder appears exactly once, in template order
        let mut ordered = Vec::with_capacity(template.len());
        for name in &template {
            match path_params.iter().position(|p| p.name == *name) {
                Some(index) => ordered.push(path_params.remove(index)),
                None => {
                    diagnostics.warning(
                        DiagnosticKind::ParameterMismatch,
                        location,
                        format!("path parameter '{}' is not declared, assuming string", name),
                    );
                    ordered.push(ExtractedParameter {
                        name: name.to_string(),
                        location: ParameterLocation::Path,
                        ty: TypeDescriptor::Primitive(PrimitiveKind::String),
                        required: true,
                        description: None,
                    });
                }
            }
        }

        ordered.extend(query_params);
        ordered.extend(body);
        ordered
    }

    fn parameter(
        &self,
        parameter: &Parameter,
        location: ParameterLocation,
        at: &str,
        diagnostics: &mut Diagnostics,
    ) -> ExtractedParameter {
        let param_at = format!("{}/{}", at, parameter.name);
        ExtractedParameter {
            name: parameter.name.clone(),
            location,
            ty: self.resolver.resolve_into(&parameter.value_schema(), &param_at, diagnostics),
            required: parameter.required,
            description: parameter.description.clone(),
        }
    }

    /// OpenAPI 3 request body as a body parameter
    fn request_body(
        &self,
        operation: &Operation,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<ExtractedParameter> {
        let raw = operation.request_body.as_ref()?;
        let body_at = format!("{}/requestBody", location);
        let Some(body) = self.api.resolve_request_body(raw) else {
            diagnostics.warning(
                DiagnosticKind::ResolutionGap,
                &body_at,
                format!(
                    "request body reference '{}' cannot be followed",
                    raw.reference.as_deref().unwrap_or_default()
                ),
            );
            return None;
        };

        let Some((_, media)) = body.content.iter().find(|(media_type, _)| is_json_media_type(media_type)) else {
            diagnostics.warning(
                DiagnosticKind::Unsupported,
                &body_at,
                "request body has no JSON content; no body parameter generated",
            );
            return None;
        };

        let ty = match &media.schema {
            Some(schema) => self.resolver.resolve_into(schema, &body_at, diagnostics),
            None => TypeDescriptor::Any,
        };
        Some(ExtractedParameter {
            name: BODY_PARAMETER.to_string(),
            location: ParameterLocation::Body,
            ty,
            required: body.required,
            description: body.description.clone(),
        })
    }

    fn response_payload(
        &self,
        method: HttpMethod,
        operation: &Operation,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<ResponsePayload> {
        let success = SUCCESS_CODES
            .iter()
            .find_map(|code| operation.responses.get(*code).map(|r| (*code, r)));

        if let Some((code, raw)) = success {
            let response_at = format!("{}/responses/{}", location, code);
            let payload = match self.api.resolve_response(raw) {
                Some(response) => self.payload_of(response, &response_at, diagnostics),
                None => {
                    diagnostics.warning(
                        DiagnosticKind::ResolutionGap,
                        &response_at,
                        "response reference cannot be followed",
                    );
                    ResponsePayload::Empty
                }
            };
            // A DELETE that also declares 204 has no body to read
            if method == HttpMethod::Delete && operation.responses.contains_key("204") {
                return Some(ResponsePayload::Empty);
            }
            return Some(payload);
        }

        if operation.responses.contains_key("204") {
            return Some(ResponsePayload::Empty);
        }
        None
    }

    fn payload_of(
        &self,
        response: &Response,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> ResponsePayload {
        // Swagger 2 puts the schema on the response itself
        if let Some(schema) = &response.schema {
            return self.typed(schema, location, diagnostics);
        }
        match response.content.iter().find(|(media_type, _)| is_json_media_type(media_type)) {
            Some((_, media)) => match &media.schema {
                Some(schema) => self.typed(schema, location, diagnostics),
                None => ResponsePayload::Typed(TypeDescriptor::Any),
            },
            None => ResponsePayload::Empty,
        }
    }

    fn typed(&self, schema: &Schema, location: &str, diagnostics: &mut Diagnostics) -> ResponsePayload {
        ResponsePayload::Typed(self.resolver.resolve_into(schema, location, diagnostics))
    }
}

fn declared_id(operation: &Operation) -> Option<&str> {
    operation
        .operation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_table::SchemaTable;
    use pretty_assertions::assert_eq;

    fn extract(api: &str) -> (Result<Vec<ExtractedOperation>>, Diagnostics) {
        let api = ApiDocument::from_json(api).unwrap();
        let resolver = TypeResolver::new(SchemaTable::new(api.schemas()));
        let mut diagnostics = Diagnostics::new();
        let operations = OperationExtractor::new(&api, resolver).extract(&mut diagnostics);
        (operations, diagnostics)
    }

    const TAGS_API: &str = r##"{
        "openapi": "3.0.0",
        "info": { "title": "Tags", "version": "1" },
        "paths": {
            "/users/{userId}/tags/{tag}": {
                "parameters": [
                    { "name": "userId", "in": "path", "required": true, "schema": { "type": "string" } },
                    { "name": "limit", "in": "query", "schema": { "type": "string" } }
                ],
                "put": {
                    "operationId": "tagUser",
                    "parameters": [
                        { "name": "limit", "in": "query", "schema": { "type": "integer", "format": "int32" } },
                        { "name": "ghost", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "requestBody": {
                        "content": { "application/xml": { "schema": { "type": "string" } } }
                    },
                    "responses": { "204": { "description": "Tagged" } }
                }
            }
        }
    }"##;

    #[test]
    fn test_parameters_follow_the_path_template() {
        let (operations, diagnostics) = extract(TAGS_API);
        let operations = operations.unwrap();
        let params: Vec<(&str, ParameterLocation)> = operations[0]
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.location))
            .collect();

        assert_eq!(
            params,
            vec![
                ("userId", ParameterLocation::Path),
                ("tag", ParameterLocation::Path),
                ("limit", ParameterLocation::Query),
            ]
        );
        assert_eq!(
            operations[0].parameters[1].ty,
            TypeDescriptor::Primitive(PrimitiveKind::String)
        );
        assert!(operations[0].parameters[1].required);

        let mismatches: Vec<_> = diagnostics
            .of_kind(DiagnosticKind::ParameterMismatch)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(mismatches.len(), 2);
        assert!(mismatches[0].contains("'ghost'"));
        assert!(mismatches[1].contains("'tag'"));
    }

    #[test]
    fn test_operation_parameters_override_path_level() {
        let (operations, _) = extract(TAGS_API);
        let operations = operations.unwrap();
        let limit = operations[0]
            .parameters
            .iter()
            .find(|p| p.name == "limit")
            .unwrap();
        assert_eq!(limit.ty, TypeDescriptor::Primitive(PrimitiveKind::Integer32));
        assert_eq!(
            operations[0].parameters.iter().filter(|p| p.name == "limit").count(),
            1
        );
    }

    #[test]
    fn test_non_json_body_is_dropped_with_warning() {
        let (operations, diagnostics) = extract(TAGS_API);
        let operations = operations.unwrap();
        assert!(operations[0]
            .parameters
            .iter()
            .all(|p| p.location != ParameterLocation::Body));

        let unsupported: Vec<_> = diagnostics.of_kind(DiagnosticKind::Unsupported).collect();
        assert_eq!(unsupported.len(), 1);
        assert_eq!(unsupported[0].location, "paths/~1users~1{userId}~1tags~1{tag}/put/requestBody");
        assert!(unsupported[0].message.contains("no JSON content"));
    }

    #[test]
    fn test_duplicate_declared_ids_conflict() {
        let (operations, _) = extract(
            r##"{
                "openapi": "3.0.0",
                "info": { "title": "Things", "version": "1" },
                "paths": {
                    "/users": { "get": { "operationId": "listThings", "responses": {} } },
                    "/groups": { "get": { "operationId": "listThings", "responses": {} } }
                }
            }"##,
        );

        match operations {
            Err(GeneratorError::SymbolConflict {
                name,
                existing,
                incoming,
                ..
            }) => {
                assert_eq!(name, "listThings");
                assert_eq!(existing, "operation 'listThings' (GET /users)");
                assert_eq!(incoming, "operation 'listThings' (GET /groups)");
            }
            other => panic!("expected a symbol conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_template_parameters() {
        assert_eq!(template_parameters("/orgs/{org}/users/{userId}"), vec!["org", "userId"]);
        assert!(template_parameters("/items").is_empty());
        assert_eq!(template_parameters("/a/{x}/{x}"), vec!["x"]);
    }

    #[test]
    fn test_json_media_types() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("application/json; charset=utf-8"));
        assert!(is_json_media_type("application/merge-patch+json"));
        assert!(!is_json_media_type("application/xml"));
        assert!(!is_json_media_type("multipart/form-data"));
    }

    #[test]
    fn test_synthesized_ids() {
        assert_eq!(synthesize_operation_id(HttpMethod::Get, "/"), "get_root");
        assert_eq!(
            synthesize_operation_id(HttpMethod::Patch, "/user-groups/{groupId}/members"),
            "patch_user_groups_by_group_id_members"
        );
    }

    #[test]
    fn test_capabilities_are_monotone_in_get() {
        let with_get = derive_capabilities([HttpMethod::Get, HttpMethod::Delete], false);
        let without_get = derive_capabilities([HttpMethod::Delete], false);
        assert!(with_get.contains(&Capability::Search));
        assert!(!without_get.contains(&Capability::Search));
        assert!(without_get.contains(&Capability::TestConnect));
        assert!(derive_capabilities([], true).contains(&Capability::SchemaExtraction));
    }

    #[test]
    fn test_put_and_patch_both_modify() {
        let caps = derive_capabilities([HttpMethod::Put, HttpMethod::Patch], false);
        let expected: BTreeSet<_> = [Capability::Modification, Capability::TestConnect]
            .into_iter()
            .collect();
        assert_eq!(caps, expected);
    }
}
