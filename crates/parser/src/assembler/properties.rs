//! Connection properties the operator fills in
//!
//! One base URL property plus the credential settings each auth requirement
//! needs. Names are claimed in the symbol table by the caller.

use dataconnector_generator_common::naming::{format_label, to_camel_case};
use dataconnector_generator_common::{
    ApiKeyLocation, ApiMetadata, AuthRequirement, ConnectionProperty, OAuthFlowKind, PropertyKind,
    PropertyRole,
};

pub const BASE_URL_PROPERTY: &str = "baseUrl";

fn property(
    role: PropertyRole,
    name: String,
    label: String,
    kind: PropertyKind,
    required: bool,
    description: String,
) -> ConnectionProperty {
    ConnectionProperty {
        name,
        label,
        description,
        kind,
        required,
        default: None,
        role,
        scheme: None,
    }
}

fn scoped(scheme: &str, property: ConnectionProperty) -> ConnectionProperty {
    ConnectionProperty {
        scheme: Some(scheme.to_string()),
        ..property
    }
}

pub fn base_url_property(metadata: &ApiMetadata) -> ConnectionProperty {
    let description = match (&metadata.base_url, &metadata.base_url_example) {
        (Some(_), Some(example)) => format!("Base URL of the target API. Example: {}", example),
        _ => "Base URL of the target API (e.g., https://api.example.com/v1).".to_string(),
    };
    ConnectionProperty {
        default: metadata.base_url.clone(),
        ..property(
            PropertyRole::BaseUrl,
            BASE_URL_PROPERTY.to_string(),
            "API Base URL".to_string(),
            PropertyKind::Url,
            true,
            description,
        )
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
        OAuthFlowKind::AuthorizationCode => "authorization code",
        OAuthFlowKind::ClientCredentials => "client credentials",
        OAuthFlowKind::Implicit => "implicit",
        OAuthFlowKind::Password => "password",
        OAuthFlowKind::OpenIdConnect => "OpenID Connect",
    }
}

/// Settings one credential requirement adds, in display order
pub fn auth_properties(requirement: &AuthRequirement) -> Vec<ConnectionProperty> {
    match requirement {
        AuthRequirement::ApiKey {
            scheme,
            name,
            location,
        } => vec![scoped(
            scheme,
            property(
                PropertyRole::ApiKey,
                format!("{}ApiKey", to_camel_case(name)),
                format!("{} API Key", format_label(name)),
                PropertyKind::Password,
                true,
                format!(
                    "API Key for authentication (sent as '{}' in {}).",
                    name,
                    location_name(*location)
                ),
            ),
        )],
        AuthRequirement::HttpBasic => vec![
            property(
                PropertyRole::Username,
                "httpUsername".to_string(),
                "HTTP Basic Username".to_string(),
                PropertyKind::String,
                true,
                "Username for HTTP Basic authentication.".to_string(),
            ),
            property(
                PropertyRole::Password,
                "httpPassword".to_string(),
                "HTTP Basic Password".to_string(),
                PropertyKind::Password,
                true,
                "Password for HTTP Basic authentication.".to_string(),
            ),
        ],
        AuthRequirement::BearerToken { scheme, bearer_format } => {
            let mut description = "Bearer token for authentication.".to_string();
            if let Some(format) = bearer_format {
                description.push_str(&format!(" Format: {}.", format));
            }
            vec![scoped(
                scheme,
                property(
                    PropertyRole::BearerToken,
                    format!("{}BearerToken", to_camel_case(scheme)),
                    format!("{} Bearer Token", format_label(scheme)),
                    PropertyKind::Password,
                    true,
                    description,
                ),
            )]
        }
        AuthRequirement::OAuthPartial {
            scheme,
            flow,
            authorization_url,
            token_url,
            discovery_url,
            scopes,
        } => {
            let base = to_camel_case(scheme);
            let label = format_label(scheme);
            let mut properties = vec![
                property(
                    PropertyRole::ClientId,
                    format!("{}ClientId", base),
                    format!("{} OAuth Client ID", label),
                    PropertyKind::String,
                    true,
                    format!("Client ID for the OAuth2 {} flow.", flow_name(*flow)),
                ),
                property(
                    PropertyRole::ClientSecret,
                    format!("{}ClientSecret", base),
                    format!("{} OAuth Client Secret", label),
                    PropertyKind::Password,
                    *flow != OAuthFlowKind::Implicit,
                    "Client Secret for the OAuth2 flow.".to_string(),
                ),
            ];
            if let Some(url) = authorization_url {
                properties.push(ConnectionProperty {
                    default: Some(url.clone()),
                    ..property(
                        PropertyRole::AuthorizationUrl,
                        format!("{}AuthorizationUrl", base),
                        format!("{} OAuth Authorization URL", label),
                        PropertyKind::Url,
                        matches!(flow, OAuthFlowKind::AuthorizationCode | OAuthFlowKind::Implicit),
                        "OAuth2 Authorization Endpoint URL.".to_string(),
                    )
                });
            }
            if let Some(url) = token_url {
                properties.push(ConnectionProperty {
                    default: Some(url.clone()),
                    ..property(
                        PropertyRole::TokenUrl,
                        format!("{}TokenUrl", base),
                        format!("{} OAuth Token URL", label),
                        PropertyKind::Url,
                        matches!(
                            flow,
                            OAuthFlowKind::AuthorizationCode
                                | OAuthFlowKind::ClientCredentials
                                | OAuthFlowKind::Password
                        ),
                        "OAuth2 Token Endpoint URL.".to_string(),
                    )
                });
            }
            if let Some(url) = discovery_url {
                properties.push(ConnectionProperty {
                    default: Some(url.clone()),
                    ..property(
                        PropertyRole::DiscoveryUrl,
                        format!("{}DiscoveryUrl", base),
                        format!("{} OpenID Discovery URL", label),
                        PropertyKind::Url,
                        true,
                        "OpenID Connect discovery document URL.".to_string(),
                    )
                });
            }
            if !scopes.is_empty() {
                properties.push(property(
                    PropertyRole::Scopes,
                    format!("{}Scopes", base),
                    format!("{} OAuth Scopes", label),
                    PropertyKind::String,
                    false,
                    format!(
                        "OAuth2 scopes required (comma-separated). Available: {}",
                        scopes.join(", ")
                    ),
                ));
            }
            properties
                .into_iter()
                .map(|p| scoped(scheme, p))
                .collect()
        }
    }
}
