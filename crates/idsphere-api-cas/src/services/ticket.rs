//! Service-ticket issuance and validation.
//!
//! A ticket is `ST-<unix-seconds>-<username>` signed with
//! HMAC-SHA256 over the body; the hex signature is appended as a fourth
//! `-` separated part and stored as part of the value itself.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqlx::PgPool;
use subtle::ConstantTimeEq;

use idsphere_core::append_query;
use idsphere_db::models::{NewCasTicket, Subject};
use idsphere_db::{SiteRegistry, SubjectStore, TicketStore};

use crate::error::{CasError, CasResult};

type HmacSha256 = Hmac<Sha256>;

/// Result of a successful CAS authorize call.
#[derive(Debug, Clone)]
pub struct CasGrant {
    /// Full redirect URL carrying the signed ticket.
    pub redirect_uri: String,
    /// Resolved site name, for the audit log.
    pub site_name: String,
}

/// Service issuing and validating CAS 3.0 tickets.
#[derive(Debug, Clone)]
pub struct CasTicketService {
    registry: SiteRegistry,
    tickets: TicketStore,
    subjects: SubjectStore,
    secret: String,
}

impl CasTicketService {
    /// Create a new service over the shared pool and HMAC secret.
    #[must_use]
    pub fn new(pool: PgPool, secret: String) -> Self {
        Self {
            registry: SiteRegistry::new(pool.clone()),
            tickets: TicketStore::new(pool.clone()),
            subjects: SubjectStore::new(pool),
            secret,
        }
    }

    /// Resolve the site, enforce access, and issue a signed ticket.
    pub async fn authorize(
        &self,
        service: &str,
        user_id: i64,
        username: &str,
    ) -> CasResult<CasGrant> {
        let site = self
            .registry
            .find_cas_site(service)
            .await?
            .ok_or(CasError::AppUnregistered)?;

        if !self.registry.user_can_access(user_id, &site).await? {
            return Err(CasError::AccessDenied { site: site.name });
        }

        let ticket = issue_ticket(&self.secret, username, Utc::now().timestamp());
        self.tickets
            .create_cas_ticket(&NewCasTicket::new(
                ticket.clone(),
                site.callback_url.clone(),
                user_id,
            ))
            .await?;

        let redirect_uri = append_query(&site.callback_url, "ticket", &ticket);

        tracing::info!(
            site = %site.name,
            user_id,
            "issued CAS service ticket"
        );

        Ok(CasGrant {
            redirect_uri,
            site_name: site.name,
        })
    }

    /// Validate a presented ticket: site exists, single-use lookup
    /// succeeds, structure and HMAC verify. Returns the owning subject.
    pub async fn service_validate(&self, service: &str, ticket: &str) -> CasResult<Subject> {
        self.registry
            .find_cas_site(service)
            .await?
            .ok_or(CasError::InvalidService)?;

        // A hit here means the ticket exists, is unexpired, and was never
        // consumed; the lookup stamps it consumed in the same statement.
        let row = self
            .tickets
            .consume_cas_ticket(ticket)
            .await?
            .ok_or(CasError::InvalidTicket)?;

        if !verify_ticket(&self.secret, ticket) {
            return Err(CasError::InvalidTicket);
        }

        let subject = self
            .subjects
            .get_by_id(row.user_id)
            .await?
            .ok_or_else(|| CasError::Internal(format!("subject {} not found", row.user_id)))?;

        tracing::info!(
            user_id = subject.id,
            "validated CAS service ticket"
        );

        Ok(subject)
    }
}

/// Build a full signed ticket for a username at an instant.
#[must_use]
pub fn issue_ticket(secret: &str, username: &str, unix_seconds: i64) -> String {
    let body = format!("ST-{unix_seconds}-{username}");
    let signature = sign(secret, &body);
    format!("{body}-{signature}")
}

/// Verify a full ticket: exactly four `-` separated parts, and the HMAC
/// over the first three recomputes to the fourth. Constant-time compare.
#[must_use]
pub fn verify_ticket(secret: &str, ticket: &str) -> bool {
    let parts: Vec<&str> = ticket.split('-').collect();
    if parts.len() != 4 {
        return false;
    }
    let body = format!("{}-{}-{}", parts[0], parts[1], parts[2]);
    let expected = sign(secret, &body);
    expected.as_bytes().ct_eq(parts[3].as_bytes()).into()
}

fn sign(secret: &str, body: &str) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "cas-hmac-secret";

    #[test]
    fn issued_tickets_round_trip() {
        let ticket = issue_ticket(SECRET, "bob", 1_700_000_000);
        assert!(ticket.starts_with("ST-1700000000-bob-"));
        assert!(verify_ticket(SECRET, &ticket));
    }

    #[test]
    fn signature_is_hex_hmac_over_body() {
        let ticket = issue_ticket(SECRET, "bob", 1_700_000_000);
        let signature = ticket.rsplit('-').next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(signature, sign(SECRET, "ST-1700000000-bob"));
    }

    #[test]
    fn tampered_body_fails_verification() {
        let ticket = issue_ticket(SECRET, "bob", 1_700_000_000);
        let tampered = ticket.replacen("bob", "eve", 1);
        assert!(!verify_ticket(SECRET, &tampered));
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let mut ticket = issue_ticket(SECRET, "bob", 1_700_000_000);
        let last = ticket.pop().unwrap();
        ticket.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_ticket(SECRET, &ticket));
    }

    #[test]
    fn wrong_part_count_fails_verification() {
        assert!(!verify_ticket(SECRET, "ST-1700000000-bob"));
        assert!(!verify_ticket(SECRET, "ST-1-bob-extra-part"));
        assert!(!verify_ticket(SECRET, ""));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let ticket = issue_ticket(SECRET, "bob", 1_700_000_000);
        assert!(!verify_ticket("other-secret", &ticket));
    }
}
