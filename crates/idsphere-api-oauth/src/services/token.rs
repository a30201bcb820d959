//! Token exchange.

use sqlx::PgPool;
use subtle::ConstantTimeEq;

use idsphere_auth::{encode_token, OAuthClaims};
use idsphere_db::{SiteRegistry, SubjectStore, TicketStore};
use idsphere_secrets::TicketCipher;

use crate::error::{OAuthError, OAuthResult};
use crate::models::{ResponseToken, TokenRequest};

/// Service exchanging authorization codes for tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    registry: SiteRegistry,
    tickets: TicketStore,
    subjects: SubjectStore,
    cipher: TicketCipher,
    private_key_pem: Vec<u8>,
    key_id: String,
}

impl TokenService {
    /// Create a new service over the shared pool and signing key.
    #[must_use]
    pub fn new(
        pool: PgPool,
        cipher: TicketCipher,
        private_key_pem: Vec<u8>,
        key_id: String,
    ) -> Self {
        Self {
            registry: SiteRegistry::new(pool.clone()),
            tickets: TicketStore::new(pool.clone()),
            subjects: SubjectStore::new(pool),
            cipher,
            private_key_pem,
            key_id,
        }
    }

    /// Validate the client, redeem the code (single-use), and emit the
    /// shared id/access JWT.
    pub async fn exchange(&self, request: &TokenRequest) -> OAuthResult<ResponseToken> {
        let site = self
            .registry
            .find_oauth_site(&request.client_id)
            .await?
            .ok_or(OAuthError::InvalidClientId)?;

        let secret = site.client_secret.as_deref().unwrap_or("");
        let matches: bool = secret
            .as_bytes()
            .ct_eq(request.client_secret.as_bytes())
            .into();
        if !matches {
            return Err(OAuthError::InvalidClientSecret);
        }

        // The client presents ciphertext; the stored row holds the
        // plaintext the cipher wrapped at authorize time.
        let code = self
            .cipher
            .decrypt(&request.code)
            .map_err(|_| OAuthError::InvalidCode)?;
        let ticket = self
            .tickets
            .consume_oauth_code(&code)
            .await?
            .ok_or(OAuthError::InvalidCode)?;

        let subject = self
            .subjects
            .get_by_id(ticket.user_id)
            .await?
            .ok_or_else(|| OAuthError::Internal(format!("subject {} not found", ticket.user_id)))?;

        let claims = OAuthClaims::new(
            subject.id,
            &subject.name,
            &subject.username,
            &request.client_id,
            "readwrite",
            ticket.nonce.unwrap_or_default(),
        );
        let jwt = encode_token(&claims, &self.private_key_pem, &self.key_id)?;

        tracing::info!(
            site = %site.name,
            user_id = subject.id,
            client_id = %request.client_id,
            "exchanged authorization code for tokens"
        );

        Ok(ResponseToken::bearer(jwt))
    }
}
