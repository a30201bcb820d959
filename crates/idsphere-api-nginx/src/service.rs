//! Cookie-token issuance and proxy-side validation.

use sqlx::PgPool;

use idsphere_core::append_query;
use idsphere_db::models::{NewNginxTicket, Subject};
use idsphere_db::{SiteRegistry, SubjectStore, TicketStore};
use idsphere_secrets::TicketCipher;

use crate::error::{NginxError, NginxResult};

/// Cookie tokens are 32-character random strings.
const TOKEN_LENGTH: usize = 32;

/// Result of a successful cookie-auth authorize call.
#[derive(Debug, Clone)]
pub struct NginxGrant {
    /// Full redirect URL carrying the encrypted token.
    pub redirect_uri: String,
    /// Resolved site name, for the audit log.
    pub site_name: String,
}

/// Service minting and redeeming proxy cookie tokens.
#[derive(Debug, Clone)]
pub struct NginxAuthService {
    registry: SiteRegistry,
    tickets: TicketStore,
    subjects: SubjectStore,
    cipher: TicketCipher,
}

impl NginxAuthService {
    /// Create a new service over the shared pool.
    #[must_use]
    pub fn new(pool: PgPool, cipher: TicketCipher) -> Self {
        Self {
            registry: SiteRegistry::new(pool.clone()),
            tickets: TicketStore::new(pool.clone()),
            subjects: SubjectStore::new(pool),
            cipher,
        }
    }

    fn generate_token() -> String {
        use rand::distributions::Alphanumeric;
        use rand::rngs::OsRng;
        use rand::Rng;
        OsRng
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Resolve the site, enforce access, mint and persist a token, and
    /// build the callback redirect.
    pub async fn authorize(&self, callback_url: &str, user_id: i64) -> NginxResult<NginxGrant> {
        let site = self
            .registry
            .find_nginx_site(callback_url)
            .await?
            .ok_or(NginxError::AppUnregistered)?;

        if !self.registry.user_can_access(user_id, &site).await? {
            return Err(NginxError::AccessDenied { site: site.name });
        }

        let token = Self::generate_token();
        let encrypted = self
            .cipher
            .encrypt(&token)
            .map_err(|e| NginxError::Internal(e.to_string()))?;

        self.tickets
            .create_nginx_token(&NewNginxTicket::new(token, user_id))
            .await?;

        let redirect_uri = append_query(&site.callback_url, "token", &encrypted);

        tracing::info!(
            site = %site.name,
            user_id,
            "issued proxy cookie token"
        );

        Ok(NginxGrant {
            redirect_uri,
            site_name: site.name,
        })
    }

    /// Redeem a presented token for the owning subject. No consumption;
    /// the proxy revalidates on every subrequest until expiry.
    pub async fn validate(&self, presented: &str) -> NginxResult<Subject> {
        let token = self
            .cipher
            .decrypt(presented)
            .map_err(|_| NginxError::InvalidToken)?;

        let row = self
            .tickets
            .get_nginx_token(&token)
            .await?
            .ok_or(NginxError::InvalidToken)?;

        if row.is_expired() {
            return Err(NginxError::ExpiredToken);
        }

        self.subjects
            .get_by_id(row.user_id)
            .await?
            .ok_or_else(|| NginxError::Internal(format!("subject {} not found", row.user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_32_alphanumeric_chars() {
        let token = NginxAuthService::generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
