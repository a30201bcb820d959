//! Bearer-authenticated userinfo.

use sqlx::PgPool;

use idsphere_auth::{decode_token, AuthError, RevocationCache};
use idsphere_db::SubjectStore;

use crate::error::{OAuthError, OAuthResult};
use crate::models::ResponseUserinfo;

/// Service resolving a bearer JWT to subject claims.
#[derive(Debug, Clone)]
pub struct UserinfoService {
    subjects: SubjectStore,
    public_key_pem: Vec<u8>,
    revocation: RevocationCache,
}

impl UserinfoService {
    /// Create a new service over the shared pool and verification key.
    #[must_use]
    pub fn new(pool: PgPool, public_key_pem: Vec<u8>, revocation: RevocationCache) -> Self {
        Self {
            subjects: SubjectStore::new(pool),
            public_key_pem,
            revocation,
        }
    }

    /// Validate the bearer and return the subject's claims.
    ///
    /// Revocation is checked before the signature so a logged-out bearer
    /// fails fast regardless of its remaining lifetime.
    pub async fn userinfo(&self, token: &str) -> OAuthResult<ResponseUserinfo> {
        if self.revocation.is_revoked(token).await.map_err(OAuthError::Auth)? {
            return Err(OAuthError::Auth(AuthError::Revoked));
        }

        let claims = decode_token(token, &self.public_key_pem)?;

        let subject = self
            .subjects
            .get_by_id(claims.id)
            .await?
            .ok_or_else(|| OAuthError::Internal(format!("subject {} not found", claims.id)))?;

        Ok(ResponseUserinfo::from(&subject))
    }
}
