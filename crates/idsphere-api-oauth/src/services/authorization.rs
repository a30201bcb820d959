//! Authorization-code minting.

use sqlx::PgPool;

use idsphere_core::append_query;
use idsphere_db::models::NewOAuthTicket;
use idsphere_db::{SiteRegistry, TicketStore};
use idsphere_secrets::TicketCipher;

use crate::error::{OAuthError, OAuthResult};
use crate::models::AuthorizeRequest;

/// Authorization codes are 32-character random strings.
const CODE_LENGTH: usize = 32;

/// Result of a successful authorize call.
#[derive(Debug, Clone)]
pub struct OAuthGrant {
    /// Full redirect URL carrying the encrypted code and echoed state.
    pub redirect_uri: String,
    /// Resolved site name, for the audit log.
    pub site_name: String,
}

/// Service minting authorization codes after login.
#[derive(Debug, Clone)]
pub struct AuthorizationService {
    registry: SiteRegistry,
    tickets: TicketStore,
    cipher: TicketCipher,
}

impl AuthorizationService {
    /// Create a new service over the shared pool.
    #[must_use]
    pub fn new(pool: PgPool, cipher: TicketCipher) -> Self {
        Self {
            registry: SiteRegistry::new(pool.clone()),
            tickets: TicketStore::new(pool),
            cipher,
        }
    }

    /// Generate a cryptographically secure 32-char alphanumeric code.
    fn generate_code() -> String {
        use rand::distributions::Alphanumeric;
        use rand::rngs::OsRng;
        use rand::Rng;
        OsRng
            .sample_iter(&Alphanumeric)
            .take(CODE_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Resolve the site, enforce access, mint and persist a code, and
    /// build the callback redirect.
    ///
    /// The stored code is the plaintext; the redirect carries the
    /// encrypted form. `state` is echoed verbatim and never validated.
    pub async fn authorize(
        &self,
        request: &AuthorizeRequest,
        user_id: i64,
    ) -> OAuthResult<OAuthGrant> {
        let site = self
            .registry
            .find_oauth_site(&request.client_id)
            .await?
            .ok_or(OAuthError::AppUnregistered)?;

        if !self.registry.user_can_access(user_id, &site).await? {
            return Err(OAuthError::AccessDenied { site: site.name });
        }

        let code = Self::generate_code();
        let encrypted = self
            .cipher
            .encrypt(&code)
            .map_err(|e| OAuthError::Internal(e.to_string()))?;

        let nonce = (!request.nonce.is_empty()).then(|| request.nonce.clone());
        self.tickets
            .create_oauth_code(&NewOAuthTicket::new(
                code,
                site.callback_url.clone(),
                user_id,
                nonce,
            ))
            .await?;

        let redirect_uri = format!(
            "{}&state={}",
            append_query(&site.callback_url, "code", &encrypted),
            request.state
        );

        tracing::info!(
            site = %site.name,
            user_id,
            client_id = %request.client_id,
            "issued OAuth authorization code"
        );

        Ok(OAuthGrant {
            redirect_uri,
            site_name: site.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_32_alphanumeric_chars() {
        let code = AuthorizationService::generate_code();
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_codes_are_unique() {
        let a = AuthorizationService::generate_code();
        let b = AuthorizationService::generate_code();
        assert_ne!(a, b);
    }
}
