//! Cookie-auth error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use idsphere_core::SsoErrorKind;

/// Result type for cookie-auth operations.
pub type NginxResult<T> = Result<T, NginxError>;

/// Cookie-auth engine errors.
#[derive(Debug, Error)]
pub enum NginxError {
    /// No site registered for the presented callback URL.
    #[error("应用未注册或配置错误")]
    AppUnregistered,

    /// The subject may not access the resolved site.
    #[error("您无权访问该应用")]
    AccessDenied {
        /// Resolved site name, for the audit log.
        site: String,
    },

    /// The token failed decryption or lookup.
    #[error("token string is invalid")]
    InvalidToken,

    /// The token exists but its twelve-hour window has passed.
    #[error("token has expired")]
    ExpiredToken,

    /// Store failure.
    #[error("Database error")]
    Database(#[from] idsphere_db::DbError),

    /// Anything else that is the server's fault.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NginxError {
    /// Protocol-neutral kind, for the audit log.
    #[must_use]
    pub fn kind(&self) -> SsoErrorKind {
        match self {
            NginxError::AppUnregistered => SsoErrorKind::AppUnregistered,
            NginxError::AccessDenied { .. } => SsoErrorKind::AccessDenied,
            NginxError::InvalidToken => SsoErrorKind::InvalidTicket,
            NginxError::ExpiredToken => SsoErrorKind::ExpiredCredential,
            NginxError::Database(_) | NginxError::Internal(_) => SsoErrorKind::InternalError,
        }
    }

    /// The resolved site name, when known.
    #[must_use]
    pub fn site_name(&self) -> &str {
        match self {
            NginxError::AccessDenied { site } => site,
            _ => "",
        }
    }
}

/// Platform JSON error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u32,
    pub msg: String,
}

impl IntoResponse for NginxError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        // The proxy keys on the status alone: any non-200 blocks the
        // subrequest, and token failures must read as 401.
        let status = match &self {
            NginxError::InvalidToken | NginxError::ExpiredToken => StatusCode::UNAUTHORIZED,
            NginxError::AccessDenied { .. } => StatusCode::UNAUTHORIZED,
            NginxError::Database(e) => {
                tracing::error!("cookie-auth database error: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            NginxError::Internal(msg) => {
                tracing::error!("cookie-auth internal error: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            NginxError::AppUnregistered => StatusCode::BAD_REQUEST,
        };

        let msg = match &self {
            NginxError::Database(_) => "A database error occurred".to_string(),
            NginxError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let body = ErrorBody {
            code: kind.code(),
            msg,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_and_invalid_are_distinct_kinds() {
        assert_eq!(NginxError::InvalidToken.kind(), SsoErrorKind::InvalidTicket);
        assert_eq!(
            NginxError::ExpiredToken.kind(),
            SsoErrorKind::ExpiredCredential
        );
    }

    #[test]
    fn login_surface_literals_are_preserved() {
        assert_eq!(NginxError::AppUnregistered.to_string(), "应用未注册或配置错误");
        assert_eq!(
            NginxError::AccessDenied {
                site: "grafana".to_string()
            }
            .to_string(),
            "您无权访问该应用"
        );
    }
}
