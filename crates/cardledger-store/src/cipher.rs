//! PAN encryption at rest.
//!
//! Card numbers are encrypted with AES in ECB mode with PKCS7 padding and
//! stored base64-encoded. The scheme is deterministic by specification:
//! identical plaintexts produce identical ciphertexts, there is no nonce and
//! no authentication tag. The symmetric key is supplied base64-encoded at
//! startup and its length selects AES-128, AES-192, or AES-256.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Errors raised by the PAN cipher.
///
/// A malformed key is a construction-time failure; callers must treat any
/// cipher error as a fatal configuration problem, not as a per-request
/// condition.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The configured key is not usable.
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Decryption failed (corrupt or foreign ciphertext).
    #[error("decryption failed: {0}")]
    Decrypt(String),
}

/// Reversible cipher for card numbers.
///
/// Cheap to construct once and safe to share: encryption and decryption are
/// pure functions of the key and the input.
pub struct PanCipher {
    key: Vec<u8>,
}

impl PanCipher {
    /// Build a cipher from a base64-encoded AES key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the input is not valid base64
    /// or does not decode to 16, 24, or 32 bytes.
    pub fn from_base64(secret: &str) -> Result<Self, CryptoError> {
        let key = BASE64
            .decode(secret.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("key is not valid base64: {e}")))?;
        match key.len() {
            16 | 24 | 32 => Ok(Self { key }),
            n => Err(CryptoError::InvalidKey(format!(
                "AES key must be 16, 24, or 32 bytes, got {n}"
            ))),
        }
    }

    /// Encrypt a plaintext PAN to a base64 ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Encrypt`] if the cipher cannot be keyed; the
    /// key length is validated at construction, so this is unreachable in a
    /// correctly configured process.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let data = plaintext.as_bytes();
        let ciphertext = match self.key.len() {
            16 => ecb::Encryptor::<Aes128>::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Encrypt(e.to_string()))?
                .encrypt_padded_vec_mut::<Pkcs7>(data),
            24 => ecb::Encryptor::<Aes192>::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Encrypt(e.to_string()))?
                .encrypt_padded_vec_mut::<Pkcs7>(data),
            _ => ecb::Encryptor::<Aes256>::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Encrypt(e.to_string()))?
                .encrypt_padded_vec_mut::<Pkcs7>(data),
        };
        Ok(BASE64.encode(ciphertext))
    }

    /// Decrypt a base64 ciphertext back to the plaintext PAN.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Decrypt`] if the input is not valid base64,
    /// the padding is wrong, or the result is not UTF-8 — all signs of a
    /// corrupt record or a key mismatch.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let data = BASE64
            .decode(ciphertext)
            .map_err(|e| CryptoError::Decrypt(format!("ciphertext is not valid base64: {e}")))?;
        let plaintext = match self.key.len() {
            16 => ecb::Decryptor::<Aes128>::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Decrypt(e.to_string()))?
                .decrypt_padded_vec_mut::<Pkcs7>(&data)
                .map_err(|e| CryptoError::Decrypt(e.to_string()))?,
            24 => ecb::Decryptor::<Aes192>::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Decrypt(e.to_string()))?
                .decrypt_padded_vec_mut::<Pkcs7>(&data)
                .map_err(|e| CryptoError::Decrypt(e.to_string()))?,
            _ => ecb::Decryptor::<Aes256>::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Decrypt(e.to_string()))?
                .decrypt_padded_vec_mut::<Pkcs7>(&data)
                .map_err(|e| CryptoError::Decrypt(e.to_string()))?,
        };
        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::Decrypt(format!("plaintext is not UTF-8: {e}")))
    }
}
