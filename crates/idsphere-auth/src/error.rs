//! Auth error types.

use thiserror::Error;

/// Result alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failures while issuing or validating tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// RSA key could not be parsed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Token is malformed or failed a structural check.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token `exp` is in the past.
    #[error("Token has expired")]
    TokenExpired,

    /// Signature did not verify against the platform key.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token uses an algorithm other than RS256.
    #[error("Unsupported token algorithm")]
    InvalidAlgorithm,

    /// A required claim is absent.
    #[error("Missing claim: {0}")]
    MissingClaim(String),

    /// No bearer token in the request.
    #[error("Missing bearer token")]
    MissingToken,

    /// The bearer was revoked by logout.
    #[error("Token has been revoked")]
    Revoked,

    /// Revocation lookup failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
