//! OIDC discovery document.

use serde::Serialize;

/// The `.well-known/openid-configuration` document.
///
/// The platform supports exactly one flow: authorization-code with
/// `client_secret_post` and RS256 id tokens.
#[derive(Debug, Clone, Serialize)]
pub struct OidcConfiguration {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub jwks_uri: String,
    pub scopes_supported: Vec<String>,
    pub response_types_supported: Vec<String>,
    pub grant_types_supported: Vec<String>,
    pub subject_types_supported: Vec<String>,
    pub id_token_signing_alg_values_supported: Vec<String>,
    pub token_endpoint_auth_methods_supported: Vec<String>,
    pub claims_supported: Vec<String>,
}

impl OidcConfiguration {
    /// Derive the fixed document from the configured external origin.
    #[must_use]
    pub fn new(external_url: &str) -> Self {
        let ext = external_url.trim_end_matches('/');
        Self {
            issuer: ext.to_string(),
            authorization_endpoint: format!("{ext}/login"),
            token_endpoint: format!("{ext}/api/v1/sso/oauth/token"),
            userinfo_endpoint: format!("{ext}/api/v1/sso/oauth/userinfo"),
            jwks_uri: format!("{ext}/api/v1/sso/oidc/jwks"),
            scopes_supported: vec!["openid".to_string()],
            response_types_supported: vec!["code".to_string()],
            grant_types_supported: vec!["authorization_code".to_string()],
            subject_types_supported: vec!["public".to_string()],
            id_token_signing_alg_values_supported: vec!["RS256".to_string()],
            token_endpoint_auth_methods_supported: vec!["client_secret_post".to_string()],
            claims_supported: [
                "id",
                "name",
                "username",
                "preferred_username",
                "sub",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_derive_from_external_url() {
        let config = OidcConfiguration::new("https://sso.example.com");
        assert_eq!(config.issuer, "https://sso.example.com");
        assert_eq!(
            config.authorization_endpoint,
            "https://sso.example.com/login"
        );
        assert_eq!(
            config.token_endpoint,
            "https://sso.example.com/api/v1/sso/oauth/token"
        );
        assert_eq!(
            config.userinfo_endpoint,
            "https://sso.example.com/api/v1/sso/oauth/userinfo"
        );
        assert_eq!(
            config.jwks_uri,
            "https://sso.example.com/api/v1/sso/oidc/jwks"
        );
    }

    #[test]
    fn advertises_the_single_supported_flow() {
        let config = OidcConfiguration::new("https://sso.example.com");
        assert_eq!(config.scopes_supported, vec!["openid"]);
        assert_eq!(config.response_types_supported, vec!["code"]);
        assert_eq!(config.grant_types_supported, vec!["authorization_code"]);
        assert_eq!(
            config.id_token_signing_alg_values_supported,
            vec!["RS256"]
        );
        assert_eq!(
            config.token_endpoint_auth_methods_supported,
            vec!["client_secret_post"]
        );
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let config = OidcConfiguration::new("https://sso.example.com/");
        assert_eq!(config.issuer, "https://sso.example.com");
    }
}
