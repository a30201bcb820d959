//! JWKS construction from the platform public key.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// A JSON Web Key (RFC 7517), RSA signature keys only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub alg: String,
    pub n: String,
    pub e: String,
}

/// A JSON Web Key Set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// Build the one-key JWKS the platform publishes.
///
/// `kid` is supplied by the key provider (base64url of SHA-256 over the
/// DER-encoded PKIX public key), keeping the advertised id byte-stable
/// across restarts.
pub fn build_jwks(public_key_pem: &[u8], kid: &str) -> Result<JwkSet, AuthError> {
    let pem = std::str::from_utf8(public_key_pem)
        .map_err(|e| AuthError::InvalidKey(format!("Invalid PEM encoding: {e}")))?;

    let public_key = RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| AuthError::InvalidKey(format!("Failed to parse RSA public key: {e}")))?;

    let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
    let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

    Ok(JwkSet {
        keys: vec![Jwk {
            kty: "RSA".to_string(),
            kid: kid.to_string(),
            key_use: "sig".to_string(),
            alg: "RS256".to_string(),
            n,
            e,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PUBLIC_KEY: &[u8] = br#"-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAuOs2bjkrVK1Vi6uSrZAG
jy/YTQlC0eMz4YLJHVDgdXPm8UYjonBBykwbKm+C0p4syG93yBDeV7lC+U8zgSk9
4QHP4CilO9VShORDHG37iy1cU6o9PCto+z8wgoc88nWRowFn4rJ3QEnkDyCdRzNy
4d1YV2q97sMW6U9iqsefQu0g6Qkx7GcLy1TLqchIi/tfKxSO7w75Zx8bqBuXZBmY
cmay3ysdQN3l+PVIm4ic/CpuFLW0XmeTvlUp3R2JoSxVySh3faTq+18cspk7nBiW
5mTpko2924GiIWMh/graaMU7agn1ItpBwmXQtXBhfd1J6i5jSKu53NGG4SSXPvu9
jQIDAQAB
-----END PUBLIC KEY-----"#;

    #[test]
    fn builds_single_rs256_key() {
        let jwks = build_jwks(TEST_PUBLIC_KEY, "kid-1").unwrap();
        assert_eq!(jwks.keys.len(), 1);

        let key = &jwks.keys[0];
        assert_eq!(key.kty, "RSA");
        assert_eq!(key.kid, "kid-1");
        assert_eq!(key.key_use, "sig");
        assert_eq!(key.alg, "RS256");
        assert_eq!(key.e, "AQAB");
        assert!(!key.n.is_empty());
    }

    #[test]
    fn serializes_use_field_name() {
        let jwks = build_jwks(TEST_PUBLIC_KEY, "kid-1").unwrap();
        let json = serde_json::to_string(&jwks).unwrap();
        assert!(json.contains("\"use\":\"sig\""));
        assert!(json.contains("\"kid\":\"kid-1\""));
    }

    #[test]
    fn jwks_is_deterministic_for_a_key() {
        let first = build_jwks(TEST_PUBLIC_KEY, "kid-1").unwrap();
        let second = build_jwks(TEST_PUBLIC_KEY, "kid-1").unwrap();
        assert_eq!(first.keys[0].n, second.keys[0].n);
        assert_eq!(first.keys[0].e, second.keys[0].e);
    }

    #[test]
    fn rejects_non_key_pem() {
        assert!(build_jwks(b"not a key", "kid-1").is_err());
    }
}
