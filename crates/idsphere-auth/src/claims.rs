//! JWT claims issued by the platform.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Issued tokens live for one hour.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Claims carried by every platform token.
///
/// The same shape serves the OIDC `id_token` and the bearer used against
/// userinfo: the subject's numeric id plus display identity, the relying
/// party as `aud`, and the round-tripped `nonce`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthClaims {
    /// Subject's numeric id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique username.
    pub username: String,
    /// Relying party `client_id`.
    pub aud: String,
    /// Granted scope.
    pub scope: String,
    /// OIDC nonce echoed from the authorization request.
    #[serde(default)]
    pub nonce: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl OAuthClaims {
    /// Build claims expiring [`TOKEN_TTL_SECONDS`] from now.
    #[must_use]
    pub fn new(
        id: i64,
        name: impl Into<String>,
        username: impl Into<String>,
        aud: impl Into<String>,
        scope: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id,
            name: name.into(),
            username: username.into(),
            aud: aud.into(),
            scope: scope.into(),
            nonce: nonce.into(),
            iat: now,
            exp: now + TOKEN_TTL_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_claims_expire_in_one_hour() {
        let claims = OAuthClaims::new(7, "Alice", "alice", "demo", "readwrite", "n1");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECONDS);
        assert_eq!(claims.aud, "demo");
        assert_eq!(claims.nonce, "n1");
    }

    #[test]
    fn nonce_defaults_to_empty_on_deserialize() {
        let json = r#"{"id":7,"name":"Alice","username":"alice","aud":"demo","scope":"readwrite","iat":1,"exp":2}"#;
        let claims: OAuthClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.nonce, "");
    }
}
