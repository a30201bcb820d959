//! CAS service-ticket model.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// Service tickets live for ten seconds.
pub const CAS_TICKET_TTL_SECONDS: i64 = 10;

/// A single-use CAS 3.0 service ticket.
///
/// `ticket` stores the exact signed value handed to the client
/// (`ST-<unix>-<username>-<hmac_hex>`); the signature is part of the
/// value, not a separate column.
#[derive(Debug, Clone, FromRow)]
pub struct CasTicket {
    pub id: i64,
    pub ticket: String,
    pub service: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl CasTicket {
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

/// Data for persisting a freshly issued service ticket.
#[derive(Debug, Clone)]
pub struct NewCasTicket {
    pub ticket: String,
    pub service: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl NewCasTicket {
    /// Build a ticket expiring [`CAS_TICKET_TTL_SECONDS`] from now.
    #[must_use]
    pub fn new(ticket: String, service: String, user_id: i64) -> Self {
        Self {
            ticket,
            service,
            user_id,
            expires_at: Utc::now() + Duration::seconds(CAS_TICKET_TTL_SECONDS),
        }
    }
}
