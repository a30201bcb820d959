//! The authorize-parameter bag.
//!
//! Deep-link query or form fields travel with the login flow untyped; the
//! protocol dispatcher and the engines project only the keys they need.
//! The bag is read-only once built — missing keys read as the empty
//! string, matching how the original deep links omit fields freely.

use std::collections::HashMap;

/// Read-only string-keyed view of the inbound authorize parameters.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeParams {
    values: HashMap<String, String>,
}

impl AuthorizeParams {
    /// Build a bag from raw key/value pairs.
    #[must_use]
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Raw access for keys without a dedicated accessor.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    /// OAuth `response_type`.
    #[must_use]
    pub fn response_type(&self) -> &str {
        self.get("response_type")
    }

    /// OAuth `client_id`.
    #[must_use]
    pub fn client_id(&self) -> &str {
        self.get("client_id")
    }

    /// OAuth `redirect_uri`.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        self.get("redirect_uri")
    }

    /// OAuth `state`, echoed verbatim and never validated here.
    #[must_use]
    pub fn state(&self) -> &str {
        self.get("state")
    }

    /// OAuth `scope`.
    #[must_use]
    pub fn scope(&self) -> &str {
        self.get("scope")
    }

    /// OIDC `nonce`.
    #[must_use]
    pub fn nonce(&self) -> &str {
        self.get("nonce")
    }

    /// CAS `service` URL.
    #[must_use]
    pub fn service(&self) -> &str {
        self.get("service")
    }

    /// SAML `SAMLRequest` (base64, usually deflated).
    #[must_use]
    pub fn saml_request(&self) -> &str {
        self.get("SAMLRequest")
    }

    /// SAML `RelayState`.
    #[must_use]
    pub fn relay_state(&self) -> &str {
        self.get("RelayState")
    }

    /// SAML `SigAlg` for the redirect binding.
    #[must_use]
    pub fn sig_alg(&self) -> &str {
        self.get("SigAlg")
    }

    /// SAML `Signature` for the redirect binding.
    #[must_use]
    pub fn signature(&self) -> &str {
        self.get("Signature")
    }

    /// Nginx reverse-proxy `callback_url`.
    #[must_use]
    pub fn callback_url(&self) -> &str {
        self.get("callback_url")
    }
}

impl From<HashMap<String, String>> for AuthorizeParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<(String, String)> for AuthorizeParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(pairs: &[(&str, &str)]) -> AuthorizeParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn missing_keys_read_as_empty() {
        let params = bag(&[("client_id", "demo")]);
        assert_eq!(params.client_id(), "demo");
        assert_eq!(params.service(), "");
        assert_eq!(params.saml_request(), "");
    }

    #[test]
    fn accessors_project_named_keys() {
        let params = bag(&[
            ("response_type", "code"),
            ("client_id", "demo"),
            ("redirect_uri", "https://app/cb"),
            ("state", "x"),
            ("nonce", "n1"),
            ("SAMLRequest", "ZmFrZQ=="),
            ("RelayState", "rs"),
            ("callback_url", "https://grafana/cb"),
        ]);
        assert_eq!(params.response_type(), "code");
        assert_eq!(params.redirect_uri(), "https://app/cb");
        assert_eq!(params.state(), "x");
        assert_eq!(params.nonce(), "n1");
        assert_eq!(params.saml_request(), "ZmFrZQ==");
        assert_eq!(params.relay_state(), "rs");
        assert_eq!(params.callback_url(), "https://grafana/cb");
    }
}
