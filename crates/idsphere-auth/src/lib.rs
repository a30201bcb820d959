//! JWT issuance and validation for IDSphere.
//!
//! One RS256 keypair signs every token the platform emits. Validation is
//! revocation-aware: logout parks the raw bearer string in a 24-hour KV
//! and the validator consults it before trusting the signature.

pub mod bearer;
pub mod claims;
pub mod error;
pub mod jwks;
pub mod jwt;
pub mod revocation;

pub use bearer::{authenticate_bearer, extract_bearer};
pub use claims::{OAuthClaims, TOKEN_TTL_SECONDS};
pub use error::{AuthError, AuthResult};
pub use jwks::{build_jwks, Jwk, JwkSet};
pub use jwt::{decode_token, encode_token};
pub use revocation::RevocationCache;
