//! Nginx cookie-token model.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// Cookie tokens live for twelve hours.
pub const NGINX_TOKEN_TTL_HOURS: i64 = 12;

/// A reusable cookie token redeemed by the reverse proxy.
///
/// `token` is the pre-encryption plaintext. Unlike the OAuth and CAS
/// shapes, lookups do not consume the token.
#[derive(Debug, Clone, FromRow)]
pub struct NginxTicket {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl NginxTicket {
    /// Whether the validity window has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Data for persisting a freshly minted cookie token.
#[derive(Debug, Clone)]
pub struct NewNginxTicket {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl NewNginxTicket {
    /// Build a token expiring [`NGINX_TOKEN_TTL_HOURS`] from now.
    #[must_use]
    pub fn new(token: String, user_id: i64) -> Self {
        Self {
            token,
            user_id,
            expires_at: Utc::now() + Duration::hours(NGINX_TOKEN_TTL_HOURS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_expires_in_twelve_hours() {
        let t = NewNginxTicket::new("GsT9qKpB7mWx3nYzLdRcVf2hJ8aQ5eUo".to_string(), 7);
        let ttl = (t.expires_at - Utc::now()).num_minutes();
        assert!((719..=720).contains(&ttl));
    }

    #[test]
    fn token_inside_window_is_live() {
        let t = NginxTicket {
            id: 1,
            token: "tok".to_string(),
            user_id: 7,
            expires_at: Utc::now() + Duration::minutes(1),
        };
        assert!(!t.is_expired());
    }
}
