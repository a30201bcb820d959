//! IdP key material.
//!
//! One RSA private key and its X.509 certificate serve the whole process:
//! SAML XMLDSig signing, JWT issuance, and the JWKS. Loaded once at
//! startup; signing is safe to invoke from any number of request tasks.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer;
use openssl::x509::X509;
use sha2::{Digest, Sha256};

use crate::error::{SecretsError, SecretsResult};

/// The process-wide RSA keypair and certificate.
#[derive(Clone)]
pub struct KeyMaterial {
    private_key: PKey<Private>,
    certificate: X509,
    private_key_pem: String,
    certificate_pem: String,
}

impl KeyMaterial {
    /// Parse key material from PEM strings.
    pub fn from_pem(private_key_pem: &str, certificate_pem: &str) -> SecretsResult<Self> {
        let private_key = PKey::private_key_from_pem(private_key_pem.as_bytes())
            .map_err(|e| SecretsError::Key(format!("Invalid private key: {e}")))?;
        let certificate = X509::from_pem(certificate_pem.as_bytes())
            .map_err(|e| SecretsError::Key(format!("Invalid certificate: {e}")))?;

        Ok(Self {
            private_key,
            certificate,
            private_key_pem: private_key_pem.to_string(),
            certificate_pem: certificate_pem.to_string(),
        })
    }

    /// The private key as PEM, for signers that take PEM input.
    #[must_use]
    pub fn private_key_pem(&self) -> &str {
        &self.private_key_pem
    }

    /// The certificate as PEM.
    #[must_use]
    pub fn certificate_pem(&self) -> &str {
        &self.certificate_pem
    }

    /// The public key as PEM (SubjectPublicKeyInfo).
    pub fn public_key_pem(&self) -> SecretsResult<Vec<u8>> {
        self.private_key
            .public_key_to_pem()
            .map_err(|e| SecretsError::Key(format!("Public key encoding failed: {e}")))
    }

    /// The public key as DER-encoded PKIX bytes.
    pub fn public_key_der(&self) -> SecretsResult<Vec<u8>> {
        self.private_key
            .public_key_to_der()
            .map_err(|e| SecretsError::Key(format!("Public key encoding failed: {e}")))
    }

    /// The certificate body, base64 over the raw DER, as SAML metadata and
    /// KeyInfo elements embed it.
    pub fn certificate_base64_der(&self) -> SecretsResult<String> {
        let der = self
            .certificate
            .to_der()
            .map_err(|e| SecretsError::Key(format!("Certificate encoding failed: {e}")))?;
        Ok(STANDARD.encode(der))
    }

    /// The JWKS key id: base64url of SHA-256 over the DER-encoded PKIX
    /// public key. Deterministic for a given key across restarts.
    pub fn kid(&self) -> SecretsResult<String> {
        let der = self.public_key_der()?;
        let digest = Sha256::digest(&der);
        Ok(URL_SAFE.encode(digest))
    }

    /// RSA-SHA256 signature over `data`.
    pub fn sign_sha256(&self, data: &[u8]) -> SecretsResult<Vec<u8>> {
        let mut signer = Signer::new(MessageDigest::sha256(), &self.private_key)
            .map_err(|e| SecretsError::Key(format!("Signer creation failed: {e}")))?;
        signer
            .update(data)
            .map_err(|e| SecretsError::Key(format!("Signing failed: {e}")))?;
        signer
            .sign_to_vec()
            .map_err(|e| SecretsError::Key(format!("Signing failed: {e}")))
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("kid", &self.kid().ok())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::asn1::Asn1Time;
    use openssl::nid::Nid;
    use openssl::rsa::Rsa;
    use openssl::x509::X509NameBuilder;

    fn generate_pems() -> (String, String) {
        let rsa = Rsa::generate(2048).unwrap();
        let pkey = PKey::from_rsa(rsa).unwrap();

        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_nid(Nid::COMMONNAME, "idsphere-test")
            .unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&pkey).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(365).unwrap())
            .unwrap();
        builder.sign(&pkey, MessageDigest::sha256()).unwrap();
        let cert = builder.build();

        (
            String::from_utf8(pkey.private_key_to_pem_pkcs8().unwrap()).unwrap(),
            String::from_utf8(cert.to_pem().unwrap()).unwrap(),
        )
    }

    #[test]
    fn loads_generated_material() {
        let (key_pem, cert_pem) = generate_pems();
        let material = KeyMaterial::from_pem(&key_pem, &cert_pem).unwrap();
        assert!(!material.certificate_base64_der().unwrap().is_empty());
    }

    #[test]
    fn kid_is_deterministic_across_loads() {
        let (key_pem, cert_pem) = generate_pems();
        let first = KeyMaterial::from_pem(&key_pem, &cert_pem).unwrap();
        let second = KeyMaterial::from_pem(&key_pem, &cert_pem).unwrap();
        assert_eq!(first.kid().unwrap(), second.kid().unwrap());
    }

    #[test]
    fn kid_is_base64url_of_pkix_digest() {
        let (key_pem, cert_pem) = generate_pems();
        let material = KeyMaterial::from_pem(&key_pem, &cert_pem).unwrap();

        let expected = URL_SAFE.encode(Sha256::digest(material.public_key_der().unwrap()));
        assert_eq!(material.kid().unwrap(), expected);
    }

    #[test]
    fn kid_differs_between_keys() {
        let (key_a, cert_a) = generate_pems();
        let (key_b, cert_b) = generate_pems();
        let a = KeyMaterial::from_pem(&key_a, &cert_a).unwrap();
        let b = KeyMaterial::from_pem(&key_b, &cert_b).unwrap();
        assert_ne!(a.kid().unwrap(), b.kid().unwrap());
    }

    #[test]
    fn signing_produces_rsa_sized_output() {
        let (key_pem, cert_pem) = generate_pems();
        let material = KeyMaterial::from_pem(&key_pem, &cert_pem).unwrap();
        let signature = material.sign_sha256(b"SignedInfo").unwrap();
        assert_eq!(signature.len(), 256);
    }

    #[test]
    fn rejects_garbage_pem() {
        let err = KeyMaterial::from_pem("not a key", "not a cert").unwrap_err();
        assert!(err.to_string().contains("Invalid private key"));
    }
}
