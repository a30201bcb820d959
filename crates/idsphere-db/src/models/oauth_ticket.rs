//! OAuth authorization-code ticket model.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// Authorization codes live for ten seconds.
pub const OAUTH_CODE_TTL_SECONDS: i64 = 10;

/// A single-use OAuth authorization code.
///
/// `code` is the pre-encryption plaintext; clients only ever see the
/// encrypted form. `redirect_uri` is pinned to the site's registered
/// callback at mint time.
#[derive(Debug, Clone, FromRow)]
pub struct OAuthTicket {
    pub id: i64,
    pub code: String,
    pub redirect_uri: String,
    pub user_id: i64,
    pub nonce: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl OAuthTicket {
    /// Whether the validity window has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Valid means unexpired and not yet consumed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.consumed_at.is_none() && !self.is_expired()
    }
}

/// Data for minting a new authorization code.
#[derive(Debug, Clone)]
pub struct NewOAuthTicket {
    pub code: String,
    pub redirect_uri: String,
    pub user_id: i64,
    pub nonce: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl NewOAuthTicket {
    /// Build a ticket expiring [`OAUTH_CODE_TTL_SECONDS`] from now.
    #[must_use]
    pub fn new(code: String, redirect_uri: String, user_id: i64, nonce: Option<String>) -> Self {
        Self {
            code,
            redirect_uri,
            user_id,
            nonce,
            expires_at: Utc::now() + Duration::seconds(OAUTH_CODE_TTL_SECONDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(expires_at: DateTime<Utc>, consumed_at: Option<DateTime<Utc>>) -> OAuthTicket {
        OAuthTicket {
            id: 1,
            code: "GsT9qKpB7mWx3nYzLdRcVf2hJ8aQ5eUo".to_string(),
            redirect_uri: "https://app/cb".to_string(),
            user_id: 7,
            nonce: Some("n1".to_string()),
            expires_at,
            consumed_at,
        }
    }

    #[test]
    fn fresh_ticket_is_valid() {
        let t = ticket(Utc::now() + Duration::seconds(5), None);
        assert!(t.is_valid());
        assert!(!t.is_expired());
    }

    #[test]
    fn expired_ticket_is_invalid() {
        let t = ticket(Utc::now() - Duration::seconds(1), None);
        assert!(t.is_expired());
        assert!(!t.is_valid());
    }

    #[test]
    fn consumed_ticket_is_invalid_even_when_unexpired() {
        let t = ticket(Utc::now() + Duration::seconds(5), Some(Utc::now()));
        assert!(!t.is_valid());
        assert!(!t.is_expired());
    }

    #[test]
    fn new_ticket_expires_in_ten_seconds() {
        let t = NewOAuthTicket::new(
            "code".to_string(),
            "https://app/cb".to_string(),
            7,
            None,
        );
        let ttl = (t.expires_at - Utc::now()).num_seconds();
        assert!((9..=10).contains(&ttl));
    }
}
