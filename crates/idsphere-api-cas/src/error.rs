//! CAS-specific error types.
//!
//! `service string is invalid` and `ticket string is invalid` are matched
//! verbatim by third-party CAS clients; never reword them.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use idsphere_core::SsoErrorKind;

use crate::models::response::failure_response;

/// Result type for CAS operations.
pub type CasResult<T> = Result<T, CasError>;

/// CAS engine errors.
#[derive(Debug, Error)]
pub enum CasError {
    /// No site registered for the presented `service`.
    #[error("应用未注册或配置错误")]
    AppUnregistered,

    /// The subject may not access the resolved site.
    #[error("您无权访问该应用")]
    AccessDenied {
        /// Resolved site name, for the audit log.
        site: String,
    },

    /// The `service` failed validation on `/p3/serviceValidate`.
    #[error("service string is invalid")]
    InvalidService,

    /// The ticket failed lookup, structure, or signature verification.
    #[error("ticket string is invalid")]
    InvalidTicket,

    /// Store failure.
    #[error("Database error")]
    Database(#[from] idsphere_db::DbError),

    /// Anything else that is the server's fault.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CasError {
    /// Protocol-neutral kind, for the audit log.
    #[must_use]
    pub fn kind(&self) -> SsoErrorKind {
        match self {
            CasError::AppUnregistered => SsoErrorKind::AppUnregistered,
            CasError::AccessDenied { .. } => SsoErrorKind::AccessDenied,
            CasError::InvalidService | CasError::InvalidTicket => SsoErrorKind::InvalidTicket,
            CasError::Database(_) | CasError::Internal(_) => SsoErrorKind::InternalError,
        }
    }

    /// The resolved site name, when known.
    #[must_use]
    pub fn site_name(&self) -> &str {
        match self {
            CasError::AccessDenied { site } => site,
            _ => "",
        }
    }

    /// CAS failure code for the XML surface.
    fn failure_code(&self) -> &'static str {
        match self {
            CasError::InvalidService => "INVALID_SERVICE",
            CasError::InvalidTicket => "INVALID_TICKET",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for CasError {
    /// CAS clients expect a 200 with `cas:authenticationFailure`; only
    /// server faults surface as HTTP errors.
    fn into_response(self) -> Response {
        let status = match &self {
            CasError::Database(_) | CasError::Internal(_) => {
                tracing::error!("CAS internal error: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::OK,
        };
        let body = failure_response(self.failure_code(), &self.to_string());
        (
            status,
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_strings_are_preserved() {
        assert_eq!(CasError::InvalidService.to_string(), "service string is invalid");
        assert_eq!(CasError::InvalidTicket.to_string(), "ticket string is invalid");
    }

    #[test]
    fn failure_codes_match_protocol_constants() {
        assert_eq!(CasError::InvalidService.failure_code(), "INVALID_SERVICE");
        assert_eq!(CasError::InvalidTicket.failure_code(), "INVALID_TICKET");
        assert_eq!(
            CasError::Internal("boom".to_string()).failure_code(),
            "INTERNAL_ERROR"
        );
    }
}
