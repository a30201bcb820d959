//! OAuth-specific error types.
//!
//! The message strings on the client-facing variants are part of the
//! public surface: relying parties and the login front-end match on them
//! verbatim, so they must not be reworded.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use idsphere_core::SsoErrorKind;

/// Result type for OAuth operations.
pub type OAuthResult<T> = Result<T, OAuthError>;

/// OAuth engine errors.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// No site registered for the presented `client_id`.
    #[error("应用未注册或配置错误")]
    AppUnregistered,

    /// The subject may not access the resolved site.
    #[error("您无权访问该应用")]
    AccessDenied {
        /// Resolved site name, for the audit log.
        site: String,
    },

    /// Unknown `client_id` on the token endpoint.
    #[error("client_id string is invalid")]
    InvalidClientId,

    /// `client_secret` mismatch on the token endpoint.
    #[error("client_secret string is invalid")]
    InvalidClientSecret,

    /// The code failed decryption or single-use redemption.
    #[error("code string is invalid")]
    InvalidCode,

    /// Bearer validation failure on userinfo.
    #[error(transparent)]
    Auth(#[from] idsphere_auth::AuthError),

    /// Store failure.
    #[error("Database error")]
    Database(#[from] idsphere_db::DbError),

    /// Anything else that is the server's fault.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OAuthError {
    /// Protocol-neutral kind, for the audit log.
    #[must_use]
    pub fn kind(&self) -> SsoErrorKind {
        use idsphere_auth::AuthError;
        match self {
            OAuthError::AppUnregistered => SsoErrorKind::AppUnregistered,
            OAuthError::AccessDenied { .. } => SsoErrorKind::AccessDenied,
            OAuthError::InvalidClientId | OAuthError::InvalidClientSecret => {
                SsoErrorKind::InvalidClient
            }
            OAuthError::InvalidCode => SsoErrorKind::InvalidCode,
            OAuthError::Auth(AuthError::TokenExpired) => SsoErrorKind::ExpiredCredential,
            OAuthError::Auth(AuthError::Revoked) => SsoErrorKind::RevokedToken,
            OAuthError::Auth(AuthError::Database(_)) => SsoErrorKind::InternalError,
            OAuthError::Auth(_) => SsoErrorKind::InvalidSignature,
            OAuthError::Database(_) | OAuthError::Internal(_) => SsoErrorKind::InternalError,
        }
    }

    /// The resolved site name, when the failure happened after site
    /// resolution.
    #[must_use]
    pub fn site_name(&self) -> &str {
        match self {
            OAuthError::AccessDenied { site } => site,
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

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            SsoErrorKind::AccessDenied | SsoErrorKind::RevokedToken => StatusCode::UNAUTHORIZED,
            SsoErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };

        let msg = match &self {
            OAuthError::Database(e) => {
                tracing::error!("OAuth database error: {e}");
                "A database error occurred".to_string()
            }
            OAuthError::Internal(msg) => {
                tracing::error!("OAuth internal error: {msg}");
                "An internal error occurred".to_string()
            }
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
    fn literal_strings_are_preserved() {
        assert_eq!(OAuthError::AppUnregistered.to_string(), "应用未注册或配置错误");
        assert_eq!(
            OAuthError::AccessDenied {
                site: "grafana".to_string()
            }
            .to_string(),
            "您无权访问该应用"
        );
        assert_eq!(
            OAuthError::InvalidClientId.to_string(),
            "client_id string is invalid"
        );
        assert_eq!(
            OAuthError::InvalidClientSecret.to_string(),
            "client_secret string is invalid"
        );
        assert_eq!(OAuthError::InvalidCode.to_string(), "code string is invalid");
    }

    #[test]
    fn access_denied_carries_site_name() {
        let err = OAuthError::AccessDenied {
            site: "grafana".to_string(),
        };
        assert_eq!(err.site_name(), "grafana");
        assert_eq!(OAuthError::InvalidCode.site_name(), "");
    }

    #[test]
    fn kinds_match_variants() {
        assert_eq!(
            OAuthError::AppUnregistered.kind(),
            SsoErrorKind::AppUnregistered
        );
        assert_eq!(
            OAuthError::InvalidClientSecret.kind(),
            SsoErrorKind::InvalidClient
        );
        assert_eq!(
            OAuthError::Auth(idsphere_auth::AuthError::Revoked).kind(),
            SsoErrorKind::RevokedToken
        );
    }
}
