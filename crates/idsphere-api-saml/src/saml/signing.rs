//! IdP signing credentials for XMLDSig.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer;
use openssl::x509::X509;

use crate::error::{SamlError, SamlResult};

/// The IdP keypair and certificate used to sign responses.
#[derive(Clone)]
pub struct SigningCredentials {
    private_key: PKey<Private>,
    certificate: X509,
}

impl SigningCredentials {
    /// Parse credentials from PEM strings.
    pub fn from_pem(private_key_pem: &str, certificate_pem: &str) -> SamlResult<Self> {
        let private_key = PKey::private_key_from_pem(private_key_pem.as_bytes())
            .map_err(|e| SamlError::Internal(format!("Invalid IdP private key: {e}")))?;
        let certificate = X509::from_pem(certificate_pem.as_bytes())
            .map_err(|e| SamlError::CertificateParseError(format!("Invalid IdP certificate: {e}")))?;
        Ok(Self {
            private_key,
            certificate,
        })
    }

    /// RSA-SHA256 signature over canonicalized `SignedInfo` bytes.
    pub fn sign_sha256(&self, data: &[u8]) -> SamlResult<Vec<u8>> {
        let mut signer = Signer::new(MessageDigest::sha256(), &self.private_key)
            .map_err(|e| SamlError::AssertionGenerationFailed(format!("Signer failed: {e}")))?;
        signer
            .update(data)
            .map_err(|e| SamlError::AssertionGenerationFailed(format!("Signing failed: {e}")))?;
        signer
            .sign_to_vec()
            .map_err(|e| SamlError::AssertionGenerationFailed(format!("Signing failed: {e}")))
    }

    /// Certificate body as base64 DER, for `KeyInfo` and metadata.
    pub fn certificate_base64_der(&self) -> SamlResult<String> {
        let der = self.certificate.to_der().map_err(|e| {
            SamlError::CertificateParseError(format!("Certificate encoding failed: {e}"))
        })?;
        Ok(STANDARD.encode(der))
    }
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials").finish_non_exhaustive()
    }
}
