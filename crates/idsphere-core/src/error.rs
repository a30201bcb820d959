//! Protocol-neutral error kinds.
//!
//! Every engine reports its failures as one of these kinds; the HTTP layer
//! maps the kind to the protocol-appropriate surface (JSON envelope, CAS
//! failure XML, SAML status). The kinds themselves never carry
//! protocol-specific wording.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// The failure categories shared by all four protocol engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SsoErrorKind {
    /// The relying party is not registered for the presented protocol key.
    AppUnregistered,
    /// The subject is not a member of the site and the site is not open.
    AccessDenied,
    /// Client id / client secret mismatch on the token endpoint.
    InvalidClient,
    /// The authorization code failed decryption or single-use lookup.
    InvalidCode,
    /// The CAS or cookie ticket failed lookup or signature verification.
    InvalidTicket,
    /// A SAML request or XMLDSig signature did not verify.
    InvalidSignature,
    /// The presented credential exists but its validity window has passed.
    ExpiredCredential,
    /// The bearer token was revoked by logout.
    RevokedToken,
    /// Database or crypto failure unrelated to the caller's input.
    InternalError,
}

impl SsoErrorKind {
    /// Platform JSON envelope code for this kind.
    ///
    /// 90400-series codes are caller faults, 90500 is a server fault; the
    /// values are part of the public surface consumed by front-ends.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            SsoErrorKind::AppUnregistered
            | SsoErrorKind::InvalidClient
            | SsoErrorKind::InvalidCode
            | SsoErrorKind::InvalidTicket
            | SsoErrorKind::InvalidSignature
            | SsoErrorKind::ExpiredCredential => 90400,
            SsoErrorKind::AccessDenied | SsoErrorKind::RevokedToken => 90401,
            SsoErrorKind::InternalError => 90500,
        }
    }
}

impl Display for SsoErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SsoErrorKind::AppUnregistered => "app_unregistered",
            SsoErrorKind::AccessDenied => "access_denied",
            SsoErrorKind::InvalidClient => "invalid_client",
            SsoErrorKind::InvalidCode => "invalid_code",
            SsoErrorKind::InvalidTicket => "invalid_ticket",
            SsoErrorKind::InvalidSignature => "invalid_signature",
            SsoErrorKind::ExpiredCredential => "expired_credential",
            SsoErrorKind::RevokedToken => "revoked_token",
            SsoErrorKind::InternalError => "internal_error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_faults_map_to_90400() {
        assert_eq!(SsoErrorKind::AppUnregistered.code(), 90400);
        assert_eq!(SsoErrorKind::InvalidTicket.code(), 90400);
        assert_eq!(SsoErrorKind::ExpiredCredential.code(), 90400);
    }

    #[test]
    fn denials_map_to_90401() {
        assert_eq!(SsoErrorKind::AccessDenied.code(), 90401);
        assert_eq!(SsoErrorKind::RevokedToken.code(), 90401);
    }

    #[test]
    fn server_faults_map_to_90500() {
        assert_eq!(SsoErrorKind::InternalError.code(), 90500);
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(SsoErrorKind::InvalidSignature.to_string(), "invalid_signature");
    }
}
