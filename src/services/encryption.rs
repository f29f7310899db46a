// src/services/encryption.rs
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Encryption key not configured")]
    KeyNotConfigured,

    #[error("Invalid encryption key format")]
    InvalidKeyFormat,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid encrypted data format")]
    InvalidDataFormat,
}

/// AES-256-GCM encryption for provider API keys and sensitive settings
/// at rest. The master key is a base64-encoded 32-byte value in
/// ENCRYPTION_MASTER_KEY.
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService")
            .field("cipher", &"<encrypted>")
            .finish()
    }
}

impl EncryptionService {
    /// Initialize encryption service from environment variable
    pub fn from_env() -> Result<Self, EncryptionError> {
        let key_str =
            env::var("ENCRYPTION_MASTER_KEY").map_err(|_| EncryptionError::KeyNotConfigured)?;

        Self::from_key(&key_str)
    }

    /// Initialize encryption service from a base64-encoded key string
    pub fn from_key(key_str: &str) -> Result<Self, EncryptionError> {
        let key_bytes = BASE64
            .decode(key_str.as_bytes())
            .map_err(|_| EncryptionError::InvalidKeyFormat)?;

        // AES-256 requires exactly 32 key bytes
        if key_bytes.len() != 32 {
            return Err(EncryptionError::InvalidKeyFormat);
        }

        let key = aes_gcm::Key::<Aes256Gcm>::from_slice(&key_bytes);
        let cipher = Aes256Gcm::new(key);

        Ok(Self { cipher })
    }

    /// Generate a new random encryption key (base64-encoded)
    pub fn generate_key() -> String {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        BASE64.encode(key)
    }

    /// Encrypt a plaintext string and return base64-encoded nonce+ciphertext
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        // 12-byte random nonce per GCM invocation
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Decrypt a base64-encoded nonce+ciphertext and return the plaintext
    pub fn decrypt(&self, encrypted: &str) -> Result<String, EncryptionError> {
        let combined = BASE64
            .decode(encrypted.as_bytes())
            .map_err(|_| EncryptionError::InvalidDataFormat)?;

        if combined.len() < 12 {
            return Err(EncryptionError::InvalidDataFormat);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext_bytes = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| EncryptionError::DecryptionFailed(e.to_string()))?;

        String::from_utf8(plaintext_bytes)
            .map_err(|e| EncryptionError::DecryptionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = EncryptionService::generate_key();
        let service = EncryptionService::from_key(&key).expect("valid key");

        let plaintext = "sk-proj-abc123-provider-key";
        let encrypted = service.encrypt(plaintext).expect("encrypt");
        assert_ne!(encrypted, plaintext);

        let decrypted = service.decrypt(&encrypted).expect("decrypt");
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_produces_distinct_ciphertexts() {
        let key = EncryptionService::generate_key();
        let service = EncryptionService::from_key(&key).expect("valid key");

        // Fresh nonce per call, so identical plaintexts must not collide
        let a = service.encrypt("same value").expect("encrypt");
        let b = service.encrypt("same value").expect("encrypt");
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_bad_key_material() {
        assert!(EncryptionService::from_key("not base64!!!").is_err());

        // Right encoding, wrong length
        let short_key = BASE64.encode([0u8; 16]);
        assert!(matches!(
            EncryptionService::from_key(&short_key),
            Err(EncryptionError::InvalidKeyFormat)
        ));
    }

    #[test]
    fn test_decrypt_rejects_wrong_key() {
        let service_a =
            EncryptionService::from_key(&EncryptionService::generate_key()).expect("key a");
        let service_b =
            EncryptionService::from_key(&EncryptionService::generate_key()).expect("key b");

        let encrypted = service_a.encrypt("secret").expect("encrypt");
        assert!(service_b.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_decrypt_rejects_truncated_data() {
        let service =
            EncryptionService::from_key(&EncryptionService::generate_key()).expect("key");
        assert!(matches!(
            service.decrypt(&BASE64.encode([1u8; 4])),
            Err(EncryptionError::InvalidDataFormat)
        ));
    }
}
