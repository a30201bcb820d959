//! SAML-specific error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use idsphere_core::SsoErrorKind;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML engine errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// Invalid or malformed `AuthnRequest`.
    #[error("Invalid AuthnRequest: {0}")]
    InvalidAuthnRequest(String),

    /// No site registered for the request's issuer entity id.
    #[error("应用未注册或配置错误")]
    AppUnregistered,

    /// The subject may not access the resolved site.
    #[error("您无权访问该应用")]
    AccessDenied {
        /// Resolved site name, for the audit log.
        site: String,
    },

    /// Neither binding's signature verified.
    #[error("Signature validation failed: {0}")]
    SignatureValidationFailed(String),

    /// Building or signing the response failed.
    #[error("Assertion generation failed: {0}")]
    AssertionGenerationFailed(String),

    /// Metadata rendering failed.
    #[error("Metadata generation failed: {0}")]
    MetadataGenerationFailed(String),

    /// The SP certificate could not be parsed.
    #[error("Certificate parsing error: {0}")]
    CertificateParseError(String),

    /// SP metadata fetch or parse failure.
    #[error("SP metadata error: {0}")]
    SpMetadata(String),

    /// Bearer validation failure on the authorize endpoint.
    #[error(transparent)]
    Auth(#[from] idsphere_auth::AuthError),

    /// Store failure.
    #[error("Database error")]
    Database(#[from] idsphere_db::DbError),

    /// Anything else that is the server's fault.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SamlError {
    /// Protocol-neutral kind, for the audit log.
    #[must_use]
    pub fn kind(&self) -> SsoErrorKind {
        use idsphere_auth::AuthError;
        match self {
            SamlError::AppUnregistered => SsoErrorKind::AppUnregistered,
            SamlError::AccessDenied { .. } => SsoErrorKind::AccessDenied,
            SamlError::InvalidAuthnRequest(_) | SamlError::SpMetadata(_) => {
                SsoErrorKind::InvalidTicket
            }
            SamlError::SignatureValidationFailed(_) | SamlError::CertificateParseError(_) => {
                SsoErrorKind::InvalidSignature
            }
            SamlError::Auth(AuthError::TokenExpired) => SsoErrorKind::ExpiredCredential,
            SamlError::Auth(AuthError::Revoked) => SsoErrorKind::RevokedToken,
            SamlError::Auth(AuthError::Database(_)) => SsoErrorKind::InternalError,
            SamlError::Auth(_) => SsoErrorKind::InvalidSignature,
            SamlError::AssertionGenerationFailed(_)
            | SamlError::MetadataGenerationFailed(_)
            | SamlError::Database(_)
            | SamlError::Internal(_) => SsoErrorKind::InternalError,
        }
    }

    /// The resolved site name, when known.
    #[must_use]
    pub fn site_name(&self) -> &str {
        match self {
            SamlError::AccessDenied { site } => site,
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

impl IntoResponse for SamlError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            SsoErrorKind::AccessDenied | SsoErrorKind::RevokedToken => StatusCode::UNAUTHORIZED,
            SsoErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };

        let msg = match &self {
            SamlError::Database(e) => {
                tracing::error!("SAML database error: {e}");
                "A database error occurred".to_string()
            }
            SamlError::AssertionGenerationFailed(msg) => {
                tracing::error!("SAML assertion generation failed: {msg}");
                "Assertion generation failed".to_string()
            }
            SamlError::Internal(msg) => {
                tracing::error!("SAML internal error: {msg}");
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
    fn login_surface_literals_are_preserved() {
        assert_eq!(SamlError::AppUnregistered.to_string(), "应用未注册或配置错误");
        assert_eq!(
            SamlError::AccessDenied {
                site: "aws".to_string()
            }
            .to_string(),
            "您无权访问该应用"
        );
    }

    #[test]
    fn signature_failures_map_to_invalid_signature() {
        let err = SamlError::SignatureValidationFailed("digest mismatch".to_string());
        assert_eq!(err.kind(), SsoErrorKind::InvalidSignature);
    }
}
