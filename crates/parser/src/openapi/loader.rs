//! OpenAPI document loader and accessor views

use super::types::{
    Info, OpenApiSpec, Parameter, PathItem, RequestBody, Response, Schema, SecurityScheme, Server,
};
use crate::source;
use crate::validation;
use dataconnector_generator_common::Result;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

const DOCUMENT: &str = "OpenAPI";

/// A validated OpenAPI 3 or Swagger 2 document
///
/// No inference happens here; the accessors only pick the right section for
/// the document's version.
#[derive(Debug, Clone)]
pub struct ApiDocument {
    spec: OpenApiSpec,
}

impl ApiDocument {
    /// Load a document from a JSON or YAML file
    ///
    /// # Example
    /// ```rust,ignore
    /// let api = ApiDocument::load("petstore.yaml")?;
    /// println!("{} {}", api.info().title, api.info().version);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let value = source::read_document(path.as_ref(), DOCUMENT)?;
        Self::from_value(value)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(source::parse_json(json, DOCUMENT)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_value(source::parse_yaml(yaml, DOCUMENT)?)
    }

    /// Validate and type a parsed tree
    pub fn from_value(value: Value) -> Result<Self> {
        validation::validate_openapi(&value)?;
        let spec: OpenApiSpec = source::into_typed(value, DOCUMENT)?;
        tracing::debug!(
            title = %spec.info.title,
            paths = spec.paths.len(),
            "Loaded OpenAPI document"
        );
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }

    pub fn is_swagger2(&self) -> bool {
        self.spec.swagger.is_some()
    }

    pub fn info(&self) -> &Info {
        &self.spec.info
    }

    pub fn servers(&self) -> &[Server] {
        &self.spec.servers
    }

    /// Base URL template of the first server
    ///
    /// Swagger 2 documents build it from `schemes`, `host` and `basePath`.
    pub fn base_url(&self) -> Option<String> {
        if let Some(server) = self.spec.servers.first() {
            return Some(server.url.clone());
        }
        let host = self.spec.host.as_ref()?;
        let scheme = self
            .spec
            .schemes
            .first()
            .map(String::as_str)
            .unwrap_or("https");
        let base_path = self.spec.base_path.as_deref().unwrap_or("");
        Some(format!("{}://{}{}", scheme, host, base_path))
    }

    /// Default values of the first server's variables
    pub fn server_variables(&self) -> IndexMap<String, String> {
        self.spec
            .servers
            .first()
            .map(|server| {
                server
                    .variables
                    .iter()
                    .map(|(name, var)| {
                        let value = var
                            .default
                            .clone()
                            .unwrap_or_else(|| format!("<{}>", name));
                        (name.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Base URL with server-variable defaults substituted
    pub fn base_url_example(&self) -> Option<String> {
        let mut url = self.base_url()?;
        for (name, value) in self.server_variables() {
            url = url.replace(&format!("{{{}}}", name), &value);
        }
        Some(url)
    }

    /// Declared security schemes; `components.securitySchemes` wins over Swagger 2
    pub fn security_schemes(&self) -> &IndexMap<String, SecurityScheme> {
        match &self.spec.components {
            Some(components) if !components.security_schemes.is_empty() => {
                &components.security_schemes
            }
            _ => &self.spec.security_definitions,
        }
    }

    /// Scheme names referenced by the global `security` list, in first-reference order
    pub fn global_security(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for requirement in &self.spec.security {
            for name in requirement.keys() {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        &self.spec.paths
    }

    /// Named schemas; `components.schemas` wins over Swagger 2 `definitions`
    pub fn schemas(&self) -> &IndexMap<String, Schema> {
        match &self.spec.components {
            Some(components) if !components.schemas.is_empty() => &components.schemas,
            _ => &self.spec.definitions,
        }
    }

    pub fn component_parameters(&self) -> &IndexMap<String, Parameter> {
        match &self.spec.components {
            Some(components) if !components.parameters.is_empty() => &components.parameters,
            _ => &self.spec.parameters,
        }
    }

    /// Follow a parameter `$ref` once
    ///
    /// Returns the parameter itself when it is inline, `None` when the
    /// reference cannot be followed.
    pub fn resolve_parameter<'a>(&'a self, parameter: &'a Parameter) -> Option<&'a Parameter> {
        match &parameter.reference {
            None => Some(parameter),
            Some(reference) => {
                let name = local_name(
                    reference,
                    &["#/components/parameters/", "#/parameters/"],
                )?;
                self.component_parameters()
                    .get(name.as_str())
                    .filter(|p| p.reference.is_none())
            }
        }
    }

    /// Follow a request body `$ref` once
    pub fn resolve_request_body<'a>(&'a self, body: &'a RequestBody) -> Option<&'a RequestBody> {
        match &body.reference {
            None => Some(body),
            Some(reference) => {
                let name = local_name(reference, &["#/components/requestBodies/"])?;
                self.spec
                    .components
                    .as_ref()?
                    .request_bodies
                    .get(name.as_str())
                    .filter(|b| b.reference.is_none())
            }
        }
    }

    /// Follow a response `$ref` once
    pub fn resolve_response<'a>(&'a self, response: &'a Response) -> Option<&'a Response> {
        match &response.reference {
            None => Some(response),
            Some(reference) => {
                let name = local_name(reference, &["#/components/responses/"])?;
                self.spec
                    .components
                    .as_ref()?
                    .responses
                    .get(name.as_str())
                    .filter(|r| r.reference.is_none())
            }
        }
    }
}

/// Name at the end of a local reference with one of the given prefixes
///
/// JSON pointer escapes (`~1`, `~0`) are decoded.
pub(crate) fn local_name(reference: &str, prefixes: &[&str]) -> Option<String> {
    prefixes
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .map(|name| name.replace("~1", "/").replace("~0", "~"))
}
