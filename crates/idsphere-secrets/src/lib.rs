//! Settings and key material for the IDSphere identity provider.
//!
//! Everything here is loaded once at startup and treated as immutable:
//! the YAML settings file, the IdP RSA keypair and X.509 certificate, the
//! HMAC secret, and the AES-256-GCM cipher that wraps opaque tickets on
//! their way to clients.

pub mod cipher;
pub mod error;
pub mod keys;
pub mod settings;

pub use cipher::TicketCipher;
pub use error::SecretsError;
pub use keys::KeyMaterial;
pub use settings::{ServerSettings, Settings};
