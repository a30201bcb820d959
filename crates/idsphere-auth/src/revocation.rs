//! Revoked-bearer cache.
//!
//! Logout inserts the raw bearer string into the `revoked_tokens` KV with
//! a 24-hour window; validation reads through a `moka` cache so the per
//! request cost is an in-memory lookup, not a database round trip.

use moka::future::Cache;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use idsphere_db::models::RevokedToken;

use crate::error::AuthError;

/// Maximum number of cached lookups.
const MAX_CACHE_ENTRIES: u64 = 10_000;

/// Time-to-live for cached lookups (seconds). The database row is the
/// source of truth; the cache only amortizes reads.
const CACHE_TTL_SECONDS: u64 = 30;

/// Read-through cache over the revoked-bearer table.
#[derive(Clone)]
pub struct RevocationCache {
    cache: Cache<String, bool>,
    pool: Arc<PgPool>,
}

impl RevocationCache {
    /// Create a new cache over the shared pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECONDS))
            .build();

        Self {
            cache,
            pool: Arc::new(pool),
        }
    }

    /// Whether a bearer has been revoked.
    pub async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        if let Some(revoked) = self.cache.get(token).await {
            return Ok(revoked);
        }

        let revoked = RevokedToken::is_revoked(&self.pool, token).await?;
        self.cache.insert(token.to_string(), revoked).await;
        Ok(revoked)
    }

    /// Revoke a bearer for the next 24 hours. The cache entry is written
    /// immediately so the very next validation sees the revocation.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        RevokedToken::revoke(&self.pool, token).await?;
        self.cache.insert(token.to_string(), true).await;
        Ok(())
    }
}

impl std::fmt::Debug for RevocationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationCache")
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
