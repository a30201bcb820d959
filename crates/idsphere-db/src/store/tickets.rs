//! Ticket persistence with atomic single-use consumption.
//!
//! The consume queries stamp `consumed_at` in the same conditional UPDATE
//! that checks it, so concurrent redemptions of one value resolve with
//! at-most-one success. Expired or consumed rows never match; an
//! out-of-band sweep may delete them at leisure.

use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::{
    CasTicket, NewCasTicket, NewNginxTicket, NewOAuthTicket, NginxTicket, OAuthTicket,
};

/// Store for the three short-lived ticket shapes.
#[derive(Debug, Clone)]
pub struct TicketStore {
    pool: PgPool,
}

impl TicketStore {
    /// Create a new store over the shared pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist an OAuth authorization code. The insert is the commit
    /// point; a failure before it leaves no ticket behind.
    pub async fn create_oauth_code(&self, ticket: &NewOAuthTicket) -> DbResult<()> {
        sqlx::query(
            r"
            INSERT INTO sso_oauth_tickets (code, redirect_uri, user_id, nonce, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&ticket.code)
        .bind(&ticket.redirect_uri)
        .bind(ticket.user_id)
        .bind(&ticket.nonce)
        .bind(ticket.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Atomically fetch and consume an authorization code. Returns the
    /// ticket only when it exists, is unexpired, and was never consumed.
    pub async fn consume_oauth_code(&self, code: &str) -> DbResult<Option<OAuthTicket>> {
        let ticket = sqlx::query_as::<_, OAuthTicket>(
            r"
            UPDATE sso_oauth_tickets
            SET consumed_at = now()
            WHERE code = $1 AND expires_at > now() AND consumed_at IS NULL
            RETURNING id, code, redirect_uri, user_id, nonce, expires_at, consumed_at
            ",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ticket)
    }

    /// Persist a CAS service ticket.
    pub async fn create_cas_ticket(&self, ticket: &NewCasTicket) -> DbResult<()> {
        sqlx::query(
            r"
            INSERT INTO sso_cas_tickets (ticket, service, user_id, expires_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&ticket.ticket)
        .bind(&ticket.service)
        .bind(ticket.user_id)
        .bind(ticket.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Atomically fetch and consume a CAS service ticket.
    pub async fn consume_cas_ticket(&self, ticket: &str) -> DbResult<Option<CasTicket>> {
        let row = sqlx::query_as::<_, CasTicket>(
            r"
            UPDATE sso_cas_tickets
            SET consumed_at = now()
            WHERE ticket = $1 AND expires_at > now() AND consumed_at IS NULL
            RETURNING id, ticket, service, user_id, expires_at, consumed_at
            ",
        )
        .bind(ticket)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Persist an Nginx cookie token.
    pub async fn create_nginx_token(&self, ticket: &NewNginxTicket) -> DbResult<()> {
        sqlx::query(
            r"
            INSERT INTO sso_nginx_tickets (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(&ticket.token)
        .bind(ticket.user_id)
        .bind(ticket.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch an Nginx cookie token. Not single-use: no consumption
    /// stamp. The row is returned even when stale so the caller can
    /// distinguish an expired token from an unknown one.
    pub async fn get_nginx_token(&self, token: &str) -> DbResult<Option<NginxTicket>> {
        let row = sqlx::query_as::<_, NginxTicket>(
            r"
            SELECT id, token, user_id, expires_at
            FROM sso_nginx_tickets
            WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
