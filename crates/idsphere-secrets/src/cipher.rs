//! Opaque-ticket cipher.
//!
//! OAuth codes and Nginx cookie tokens are stored server-side in
//! plaintext; the value handed to the client is the AES-256-GCM
//! encryption of that plaintext. Redemption decrypts the presented
//! ciphertext and compares against the stored row, so the plaintext
//! never crosses the wire.
//!
//! Ciphertext format: base64url(nonce || ciphertext || tag), URL-safe so
//! it can ride in a redirect query parameter unescaped.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{SecretsError, SecretsResult};

/// Nonce size for AES-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Cipher wrapping opaque tickets for client-side transport.
#[derive(Clone)]
pub struct TicketCipher {
    key: [u8; 32],
}

impl TicketCipher {
    /// Derive the cipher key from the configured secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    /// Encrypt a ticket value for the client.
    pub fn encrypt(&self, plaintext: &str) -> SecretsResult<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| SecretsError::Cipher(format!("create cipher: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from(nonce_bytes);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| SecretsError::Cipher(format!("encrypt: {e}")))?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(result))
    }

    /// Decrypt a ticket value presented by a client.
    pub fn decrypt(&self, encoded: &str) -> SecretsResult<String> {
        let data = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| SecretsError::Cipher(format!("base64 decode: {e}")))?;

        if data.len() <= NONCE_SIZE {
            return Err(SecretsError::Cipher("ciphertext too short".to_string()));
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| SecretsError::Cipher(format!("create cipher: {e}")))?;

        let nonce_bytes: [u8; NONCE_SIZE] = data[..NONCE_SIZE]
            .try_into()
            .map_err(|_| SecretsError::Cipher("invalid nonce length".to_string()))?;
        let nonce = Nonce::from(nonce_bytes);

        let plaintext = cipher
            .decrypt(&nonce, &data[NONCE_SIZE..])
            .map_err(|e| SecretsError::Cipher(format!("decrypt: {e}")))?;

        String::from_utf8(plaintext).map_err(|e| SecretsError::Cipher(format!("invalid UTF-8: {e}")))
    }
}

impl std::fmt::Debug for TicketCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketCipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_32_char_code() {
        let cipher = TicketCipher::new("cas-hmac-secret");
        let code = "a".repeat(32);
        let encrypted = cipher.encrypt(&code).unwrap();
        assert_ne!(encrypted, code);
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), code);
    }

    #[test]
    fn ciphertext_is_url_safe() {
        let cipher = TicketCipher::new("secret");
        let encrypted = cipher.encrypt("GsT9qKpB7mWx3nYzLdRcVf2hJ8aQ5eUo").unwrap();
        assert!(encrypted
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let cipher = TicketCipher::new("secret");
        let mut encrypted = cipher.encrypt("plaintext").unwrap();
        let flipped = if encrypted.ends_with('A') { 'B' } else { 'A' };
        encrypted.pop();
        encrypted.push(flipped);
        assert!(cipher.decrypt(&encrypted).is_err());
    }

    #[test]
    fn wrong_secret_cannot_decrypt() {
        let encrypted = TicketCipher::new("secret-a").encrypt("code").unwrap();
        assert!(TicketCipher::new("secret-b").decrypt(&encrypted).is_err());
    }

    #[test]
    fn short_input_is_rejected() {
        let cipher = TicketCipher::new("secret");
        assert!(cipher.decrypt("AAAA").is_err());
        assert!(cipher.decrypt("!!not-base64!!").is_err());
    }
}
