//! Error type for settings and key loading.

use thiserror::Error;

/// Result alias for this crate.
pub type SecretsResult<T> = Result<T, SecretsError>;

/// Failures while loading configuration or key material.
#[derive(Debug, Error)]
pub enum SecretsError {
    /// The settings file could not be read or parsed, or a required key
    /// is missing. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The RSA private key or X.509 certificate could not be parsed.
    #[error("Key material error: {0}")]
    Key(String),

    /// Ticket encryption or decryption failed.
    #[error("Cipher error: {0}")]
    Cipher(String),
}
