//! Revoked-bearer KV model.

use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};

/// Logout revocations are kept for twenty-four hours, past any issued
/// token's lifetime.
pub const REVOCATION_TTL_HOURS: i64 = 24;

/// A bearer token revoked by logout, keyed by the raw token string.
#[derive(Debug, Clone, FromRow)]
pub struct RevokedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl RevokedToken {
    /// Record a revocation. Re-revoking an already revoked bearer
    /// refreshes its window.
    pub async fn revoke(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
        let expires_at = Utc::now() + Duration::hours(REVOCATION_TTL_HOURS);
        sqlx::query(
            r"
            INSERT INTO revoked_tokens (token, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token) DO UPDATE SET expires_at = EXCLUDED.expires_at
            ",
        )
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Whether a bearer is currently revoked.
    pub async fn is_revoked(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let revoked: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM revoked_tokens
                WHERE token = $1 AND expires_at > now()
            )
            ",
        )
        .bind(token)
        .fetch_one(pool)
        .await?;
        Ok(revoked)
    }
}
