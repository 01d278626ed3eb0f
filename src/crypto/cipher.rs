//! Content cipher: symmetric encryption of byte buffers under the data key.
//!
//! Layout of a ciphertext:
//!
//! ```text
//! nonce (12 bytes) || AES-256-GCM( sha256(plaintext)[..n] || plaintext )
//! ```
//!
//! The leading `n` bytes of the digest are the verification prefix. A wrong key
//! is rejected by the GCM tag; the prefix is checked as well so a buffer that
//! happens to authenticate under the wrong key is still refused.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::errors::{CipherError, CipherResult};

/// Key size for AES-256 in bytes.
pub const KEY_SIZE: usize = 32;

/// Nonce size in bytes for AES-GCM.
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size appended by AES-GCM.
pub const TAG_SIZE: usize = 16;

/// Verification prefix length used for note and revision fields.
pub const FIELD_VERIFICATION_BYTES: usize = 4;

/// Verification prefix length used when wrapping the data key.
pub const KEY_VERIFICATION_BYTES: usize = 16;

/// The symmetric key protected content is encrypted with.
///
/// Wiped from memory on drop; `Debug` never prints it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DataKey {
    key: [u8; KEY_SIZE],
}

impl DataKey {
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Builds a key from arbitrary bytes, zero-padding or truncating to 32.
    pub fn from_slice(bytes: &[u8]) -> CipherResult<Self> {
        if bytes.is_empty() {
            return Err(CipherError::MissingKey);
        }
        let mut key = [0u8; KEY_SIZE];
        let len = bytes.len().min(KEY_SIZE);
        key[..len].copy_from_slice(&bytes[..len]);
        Ok(Self { key })
    }

    /// Generates a random key from the OS-seeded thread RNG.
    pub fn random() -> Self {
        let mut key = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

fn verification_prefix(plaintext: &[u8], verification_bytes: usize) -> Vec<u8> {
    let digest = Sha256::digest(plaintext);
    digest[..verification_bytes.min(digest.len())].to_vec()
}

fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Encrypts `plaintext` with the field-sized verification prefix.
pub fn encrypt(key: &DataKey, plaintext: &[u8]) -> CipherResult<Vec<u8>> {
    encrypt_with_verification(key, plaintext, FIELD_VERIFICATION_BYTES)
}

/// Encrypts `plaintext`, prefixing it with `verification_bytes` of its digest.
pub fn encrypt_with_verification(
    key: &DataKey,
    plaintext: &[u8],
    verification_bytes: usize,
) -> CipherResult<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CipherError::MissingKey)?;

    let mut payload = Zeroizing::new(verification_prefix(plaintext, verification_bytes));
    payload.extend_from_slice(plaintext);

    let nonce_bytes = generate_nonce();
    let body = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), payload.as_slice())
        .map_err(|_| CipherError::Malformed("encryption failed".to_string()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + body.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decrypts a buffer produced by [`encrypt_with_verification`].
///
/// # Errors
///
/// `CipherError::Malformed` if the buffer is too short to hold nonce, tag and
/// prefix; `CipherError::Decryption` if the key is wrong or the data corrupted.
pub fn decrypt(
    key: &DataKey,
    ciphertext: &[u8],
    verification_bytes: usize,
) -> CipherResult<Vec<u8>> {
    let min_len = NONCE_SIZE + TAG_SIZE + verification_bytes;
    if ciphertext.len() < min_len {
        return Err(CipherError::Malformed(format!(
            "expected at least {} bytes, got {}",
            min_len,
            ciphertext.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CipherError::MissingKey)?;
    let (nonce, body) = ciphertext.split_at(NONCE_SIZE);

    let payload = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| CipherError::Decryption)?,
    );

    if payload.len() < verification_bytes {
        return Err(CipherError::Decryption);
    }
    let (prefix, plaintext) = payload.split_at(verification_bytes);
    if prefix != verification_prefix(plaintext, verification_bytes).as_slice() {
        return Err(CipherError::Decryption);
    }

    Ok(plaintext.to_vec())
}

/// Encrypts a string and encodes the result as base64, for text columns.
pub fn encrypt_string(key: &DataKey, plaintext: &str) -> CipherResult<String> {
    Ok(BASE64.encode(encrypt(key, plaintext.as_bytes())?))
}

/// Reverses [`encrypt_string`].
pub fn decrypt_string(key: &DataKey, encoded: &str) -> CipherResult<String> {
    let ciphertext = BASE64.decode(encoded)?;
    let plaintext = decrypt(key, &ciphertext, FIELD_VERIFICATION_BYTES)?;
    Ok(String::from_utf8(plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn roundtrip_restores_plaintext() {
        let key = DataKey::random();
        let plaintext = b"Hello, protected world!";
        let ciphertext = encrypt(&key, plaintext).unwrap();
        let decrypted = decrypt(&key, &ciphertext, FIELD_VERIFICATION_BYTES).unwrap();
        assert_eq!(decrypted, plaintext.to_vec());
    }

    #[test]
    fn roundtrip_of_empty_plaintext() {
        let key = DataKey::random();
        let ciphertext = encrypt(&key, b"").unwrap();
        assert_eq!(
            decrypt(&key, &ciphertext, FIELD_VERIFICATION_BYTES).unwrap(),
            Vec::<u8>::new()
        );
    }

    #[test]
    fn ciphertext_length_is_deterministic() {
        let key = DataKey::random();
        let ciphertext = encrypt(&key, b"12345").unwrap();
        assert_eq!(
            ciphertext.len(),
            NONCE_SIZE + FIELD_VERIFICATION_BYTES + 5 + TAG_SIZE
        );

        let wrapped = encrypt_with_verification(&key, b"12345", KEY_VERIFICATION_BYTES).unwrap();
        assert_eq!(wrapped.len(), NONCE_SIZE + KEY_VERIFICATION_BYTES + 5 + TAG_SIZE);
    }

    #[test]
    fn same_plaintext_encrypts_differently() {
        let key = DataKey::random();
        let a = encrypt(&key, b"same").unwrap();
        let b = encrypt(&key, b"same").unwrap();
        assert_ne!(a, b, "fresh nonce per encryption");
    }

    #[test]
    fn wrong_key_is_detected() {
        let key1 = DataKey::random();
        let key2 = DataKey::random();
        let ciphertext = encrypt(&key1, b"secret").unwrap();
        let result = decrypt(&key2, &ciphertext, FIELD_VERIFICATION_BYTES);
        assert!(matches!(result, Err(CipherError::Decryption)));
    }

    #[test]
    fn wrong_key_detected_across_many_plaintexts() {
        let key1 = DataKey::random();
        let key2 = DataKey::random();
        for i in 0..50 {
            let plaintext = format!("message number {}", i);
            let ciphertext = encrypt(&key1, plaintext.as_bytes()).unwrap();
            assert!(decrypt(&key2, &ciphertext, FIELD_VERIFICATION_BYTES).is_err());
        }
    }

    #[test]
    fn tampered_ciphertext_is_detected() {
        let key = DataKey::random();
        let mut ciphertext = encrypt(&key, b"do not touch").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;
        assert!(matches!(
            decrypt(&key, &ciphertext, FIELD_VERIFICATION_BYTES),
            Err(CipherError::Decryption)
        ));
    }

    #[test]
    fn mismatched_verification_length_fails() {
        let key = DataKey::random();
        let ciphertext = encrypt_with_verification(&key, b"payload", KEY_VERIFICATION_BYTES).unwrap();
        assert!(decrypt(&key, &ciphertext, FIELD_VERIFICATION_BYTES).is_err());
    }

    #[test]
    fn short_buffer_is_malformed() {
        let key = DataKey::random();
        let result = decrypt(&key, &[0u8; 10], FIELD_VERIFICATION_BYTES);
        assert!(matches!(result, Err(CipherError::Malformed(_))));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(DataKey::from_slice(&[]), Err(CipherError::MissingKey)));
    }

    #[test]
    fn short_key_is_zero_padded() {
        let short = DataKey::from_slice(&[7u8; 16]).unwrap();
        assert_eq!(&short.as_bytes()[..16], &[7u8; 16]);
        assert_eq!(&short.as_bytes()[16..], &[0u8; 16]);
    }

    #[test]
    fn string_roundtrip() {
        let key = DataKey::random();
        let encoded = encrypt_string(&key, "Título secreto").unwrap();
        assert!(!encoded.contains("secreto"));
        assert_eq!(decrypt_string(&key, &encoded).unwrap(), "Título secreto");
    }

    #[test]
    fn string_with_invalid_base64_fails() {
        let key = DataKey::random();
        assert!(matches!(
            decrypt_string(&key, "not base64!!"),
            Err(CipherError::Encoding(_))
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let key = DataKey::new([0xAB; KEY_SIZE]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("171"));
    }
}
