//! Token endpoint models.

use serde::{Deserialize, Serialize};

/// Form-encoded token exchange request (`client_secret_post`).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub grant_type: String,
    pub code: String,
    pub client_id: String,
    pub client_secret: String,
    /// Accepted for RFC shape; the redirect is pinned at authorize time.
    #[serde(default)]
    pub redirect_uri: String,
}

/// Token response returned to the relying party.
///
/// `id_token` and `access_token` carry the same JWT; downstream clients
/// depend on that, so the two fields are never bifurcated.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseToken {
    pub id_token: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub scope: String,
}

impl ResponseToken {
    /// Wrap a freshly signed JWT in the fixed response envelope.
    #[must_use]
    pub fn bearer(jwt: String) -> Self {
        Self {
            id_token: jwt.clone(),
            access_token: jwt,
            token_type: "bearer".to_string(),
            expires_in: idsphere_auth::TOKEN_TTL_SECONDS,
            refresh_token: String::new(),
            scope: "openid".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_envelope_is_fixed() {
        let token = ResponseToken::bearer("a.b.c".to_string());
        assert_eq!(token.id_token, token.access_token);
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.scope, "openid");
    }

    #[test]
    fn serializes_all_fields() {
        let json = serde_json::to_string(&ResponseToken::bearer("a.b.c".to_string())).unwrap();
        assert!(json.contains("\"id_token\":\"a.b.c\""));
        assert!(json.contains("\"access_token\":\"a.b.c\""));
        assert!(json.contains("\"refresh_token\":\"\""));
    }
}
