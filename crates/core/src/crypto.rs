//! Encryption of provider access tokens at rest.
//!
//! Tokens returned by OAuth code exchange are sealed with AES-256-GCM
//! before they touch the database. The wire format is
//! `base64(nonce || ciphertext)` with a fresh random 96-bit nonce per
//! encryption, so re-encrypting the same token yields a different blob.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;

use crate::error::CoreError;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Decode a base64-encoded 32-byte encryption key (as configured via
/// `TOKEN_ENCRYPTION_KEY`).
pub fn decode_key(encoded: &str) -> Result<[u8; KEY_LEN], CoreError> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|_| CoreError::Validation("Encryption key is not valid base64".into()))?;
    bytes.try_into().map_err(|_| {
        CoreError::Validation(format!("Encryption key must be {KEY_LEN} bytes"))
    })
}

/// Encrypt a plaintext access token for storage.
pub fn seal_token(key: &[u8; KEY_LEN], plaintext: &str) -> Result<String, CoreError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CoreError::Internal("Token encryption failed".into()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(blob))
}

/// Decrypt a stored access token blob.
pub fn open_token(key: &[u8; KEY_LEN], sealed: &str) -> Result<String, CoreError> {
    let blob = BASE64
        .decode(sealed)
        .map_err(|_| CoreError::Internal("Stored token is not valid base64".into()))?;
    if blob.len() <= NONCE_LEN {
        return Err(CoreError::Internal("Stored token blob is truncated".into()));
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CoreError::Internal("Token decryption failed".into()))?;

    String::from_utf8(plaintext)
        .map_err(|_| CoreError::Internal("Decrypted token is not valid UTF-8".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn test_key() -> [u8; KEY_LEN] {
        [7u8; KEY_LEN]
    }

    #[test]
    fn seal_and_open_round_trip() {
        let key = test_key();
        let sealed = seal_token(&key, "ya29.provider-access-token").unwrap();
        assert_ne!(sealed, "ya29.provider-access-token");
        assert_eq!(open_token(&key, &sealed).unwrap(), "ya29.provider-access-token");
    }

    #[test]
    fn sealing_twice_yields_distinct_blobs() {
        let key = test_key();
        let a = seal_token(&key, "same").unwrap();
        let b = seal_token(&key, "same").unwrap();
        assert_ne!(a, b, "nonce must be fresh per encryption");
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = seal_token(&test_key(), "secret").unwrap();
        let other = [9u8; KEY_LEN];
        assert_matches!(open_token(&other, &sealed), Err(CoreError::Internal(_)));
    }

    #[test]
    fn tampered_blob_fails_to_open() {
        let key = test_key();
        let sealed = seal_token(&key, "secret").unwrap();
        let mut blob = BASE64.decode(&sealed).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        let tampered = BASE64.encode(blob);
        assert_matches!(open_token(&key, &tampered), Err(CoreError::Internal(_)));
    }

    #[test]
    fn decode_key_enforces_length() {
        let good = BASE64.encode([1u8; KEY_LEN]);
        assert_eq!(decode_key(&good).unwrap(), [1u8; KEY_LEN]);

        let short = BASE64.encode([1u8; 16]);
        assert_matches!(decode_key(&short), Err(CoreError::Validation(_)));
        assert_matches!(decode_key("!!!"), Err(CoreError::Validation(_)));
    }
}
