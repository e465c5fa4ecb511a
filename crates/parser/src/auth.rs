//! Credential requirements from the declared security schemes
//!
//! Only schemes named by the document-level `security` list are kept.
//! Each one reduces to an [`AuthRequirement`]; OAuth flows are described but
//! never executed.

use crate::openapi::{ApiDocument, SecurityScheme};
use crate::validation::json_pointer;
use dataconnector_generator_common::{
    ApiKeyLocation, AuthRequirement, DiagnosticKind, Diagnostics, OAuthFlowKind,
};

/// Map an OpenAPI 3 flow key or a Swagger 2 `flow` value
pub fn oauth_flow_kind(name: &str) -> Option<OAuthFlowKind> {
    match name {
        "authorizationCode" | "accessCode" => Some(OAuthFlowKind::AuthorizationCode),
        "clientCredentials" | "application" => Some(OAuthFlowKind::ClientCredentials),
        "implicit" => Some(OAuthFlowKind::Implicit),
        "password" => Some(OAuthFlowKind::Password),
        _ => None,
    }
}

pub struct AuthBuilder<'a> {
    api: &'a ApiDocument,
}

impl<'a> AuthBuilder<'a> {
    pub fn new(api: &'a ApiDocument) -> Self {
        Self { api }
    }

    /// Requirements in first-reference order, without duplicates
    pub fn build(&self, diagnostics: &mut Diagnostics) -> Vec<AuthRequirement> {
        let schemes = self.api.security_schemes();
        let section = if self.api.is_swagger2() {
            "securityDefinitions"
        } else {
            "components/securitySchemes"
        };

        let mut requirements: Vec<AuthRequirement> = Vec::new();
        for name in self.api.global_security() {
            let Some(scheme) = schemes.get(name) else {
                diagnostics.warning(
                    DiagnosticKind::Auth,
                    "security",
                    format!("security requirement references undeclared scheme '{}'", name),
                );
                continue;
            };

            let location = format!("{}/{}", section, json_pointer(&[name]));
            if let Some(requirement) = self.requirement(name, scheme, &location, diagnostics) {
                if !requirements.contains(&requirement) {
                    tracing::debug!(scheme = name, "Auth requirement detected");
                    requirements.push(requirement);
                }
            }
        }

        let ignored = schemes
            .keys()
            .filter(|name| !self.api.global_security().contains(&name.as_str()))
            .count();
        if ignored > 0 {
            tracing::debug!(ignored, "Skipping security schemes not referenced globally");
        }

        requirements
    }

    fn requirement(
        &self,
        name: &str,
        scheme: &SecurityScheme,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<AuthRequirement> {
        match scheme.scheme_type.as_str() {
            "apiKey" => {
                let Some(key_name) = scheme.name.clone() else {
                    diagnostics.warning(
                        DiagnosticKind::Auth,
                        location,
                        "apiKey scheme has no 'name'; skipped",
                    );
                    return None;
                };
                let key_location = match scheme.location.as_deref() {
                    Some("query") => ApiKeyLocation::Query,
                    Some("cookie") => ApiKeyLocation::Cookie,
                    Some("header") => ApiKeyLocation::Header,
                    other => {
                        diagnostics.warning(
                            DiagnosticKind::Auth,
                            location,
                            format!(
                                "apiKey location '{}' is not recognized; assuming header",
                                other.unwrap_or_default()
                            ),
                        );
                        ApiKeyLocation::Header
                    }
                };
                Some(AuthRequirement::ApiKey {
                    scheme: name.to_string(),
                    name: key_name,
                    location: key_location,
                })
            }
            "basic" => Some(AuthRequirement::HttpBasic),
            "http" => match scheme.scheme.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("basic") => Some(AuthRequirement::HttpBasic),
                Some("bearer") => Some(AuthRequirement::BearerToken {
                    scheme: name.to_string(),
                    bearer_format: scheme.bearer_format.clone(),
                }),
                other => {
                    diagnostics.warning(
                        DiagnosticKind::Auth,
                        location,
                        format!(
                            "http scheme '{}' is not supported; skipped",
                            other.unwrap_or_default()
                        ),
                    );
                    None
                }
            },
            "oauth2" => self.oauth(name, scheme, location, diagnostics),
            "openIdConnect" => Some(AuthRequirement::OAuthPartial {
                scheme: name.to_string(),
                flow: OAuthFlowKind::OpenIdConnect,
                authorization_url: None,
                token_url: None,
                discovery_url: scheme.open_id_connect_url.clone(),
                scopes: Vec::new(),
            }),
            other => {
                diagnostics.warning(
                    DiagnosticKind::Auth,
                    location,
                    format!("security scheme type '{}' is not supported; skipped", other),
                );
                None
            }
        }
    }

    fn oauth(
        &self,
        name: &str,
        scheme: &SecurityScheme,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<AuthRequirement> {
        // OpenAPI 3 nests flows; Swagger 2 flattens a single flow onto the scheme
        let (flow_name, authorization_url, token_url, scopes) =
            match scheme.flows.first() {
                Some((flow_name, flow)) => {
                    if scheme.flows.len() > 1 {
                        diagnostics.info(
                            DiagnosticKind::Auth,
                            location,
                            format!("multiple OAuth flows declared; using '{}'", flow_name),
                        );
                    }
                    (
                        Some(flow_name.as_str()),
                        flow.authorization_url.clone(),
                        flow.token_url.clone(),
                        flow.scopes.keys().cloned().collect::<Vec<_>>(),
                    )
                }
                None => (
                    scheme.flow.as_deref(),
                    scheme.authorization_url.clone(),
                    scheme.token_url.clone(),
                    scheme.scopes.keys().cloned().collect(),
                ),
            };

        let Some(flow) = flow_name.and_then(oauth_flow_kind) else {
            diagnostics.warning(
                DiagnosticKind::Auth,
                location,
                format!(
                    "OAuth2 flow '{}' is not recognized; skipped",
                    flow_name.unwrap_or_default()
                ),
            );
            return None;
        };

        diagnostics.info(
            DiagnosticKind::Auth,
            location,
            "OAuth2 detected; the connector receives flow settings but does not run the flow",
        );
        Some(AuthRequirement::OAuthPartial {
            scheme: name.to_string(),
            flow,
            authorization_url,
            token_url,
            discovery_url: None,
            scopes,
        })
    }
}
