//! Relying-party lookups and the per-site access policy.

use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::{Site, SSO_TYPE_CAS, SSO_TYPE_NGINX, SSO_TYPE_OAUTH, SSO_TYPE_SAML};

const SITE_COLUMNS: &str = "id, name, sso_type, all_open, callback_url, client_id, \
     client_secret, entity_id, certificate, domain_id, redirect_url, idp_name, address";

/// Registry of relying parties, keyed per protocol.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    pool: PgPool,
}

impl SiteRegistry {
    /// Create a new registry over the shared pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// OAuth site by `client_id`.
    pub async fn find_oauth_site(&self, client_id: &str) -> DbResult<Option<Site>> {
        let site = sqlx::query_as::<_, Site>(&format!(
            "SELECT {SITE_COLUMNS} FROM sites WHERE sso_type = $1 AND client_id = $2"
        ))
        .bind(SSO_TYPE_OAUTH)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(site)
    }

    /// CAS site whose registered callback URL is a prefix of the
    /// presented `service`.
    pub async fn find_cas_site(&self, service: &str) -> DbResult<Option<Site>> {
        let site = sqlx::query_as::<_, Site>(&format!(
            "SELECT {SITE_COLUMNS} FROM sites \
             WHERE sso_type = $1 AND $2 LIKE callback_url || '%' \
             ORDER BY length(callback_url) DESC LIMIT 1"
        ))
        .bind(SSO_TYPE_CAS)
        .bind(service)
        .fetch_optional(&self.pool)
        .await?;
        Ok(site)
    }

    /// SAML site by SP entity id.
    pub async fn find_saml_site(&self, entity_id: &str) -> DbResult<Option<Site>> {
        let site = sqlx::query_as::<_, Site>(&format!(
            "SELECT {SITE_COLUMNS} FROM sites WHERE sso_type = $1 AND entity_id = $2"
        ))
        .bind(SSO_TYPE_SAML)
        .bind(entity_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(site)
    }

    /// Nginx site by exact callback URL.
    pub async fn find_nginx_site(&self, callback_url: &str) -> DbResult<Option<Site>> {
        let site = sqlx::query_as::<_, Site>(&format!(
            "SELECT {SITE_COLUMNS} FROM sites WHERE sso_type = $1 AND callback_url = $2"
        ))
        .bind(SSO_TYPE_NGINX)
        .bind(callback_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(site)
    }

    /// Whether the subject may use the site: open to all, or present in
    /// the site's membership list.
    pub async fn user_can_access(&self, user_id: i64, site: &Site) -> DbResult<bool> {
        if site.all_open {
            return Ok(true);
        }
        let member: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM site_users WHERE site_id = $1 AND user_id = $2
            )
            ",
        )
        .bind(site.id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(member)
    }
}
