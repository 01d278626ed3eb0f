//! Password-based key derivation and the wrapped data key.
//!
//! The data key never changes once created. A password only wraps it: changing
//! the password re-wraps the same key, so no protected note is re-encrypted.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use scrypt::{Params, scrypt};

use super::cipher::{self, DataKey, KEY_SIZE, KEY_VERIFICATION_BYTES};
use super::errors::{CipherError, CipherResult, SessionError, SessionResult};

/// scrypt cost: N = 2^14 = 16384.
pub const SCRYPT_LOG_N: u8 = 14;

/// scrypt block size.
pub const SCRYPT_R: u32 = 8;

/// scrypt parallelism.
pub const SCRYPT_P: u32 = 1;

/// Salt size in bytes.
pub const SALT_SIZE: usize = 32;

/// Derives a 32-byte key from a password with scrypt (N=16384, r=8, p=1).
///
/// Deterministic for the same password and salt and deliberately slow; never
/// call it while holding a lock other threads wait on.
pub fn derive_key(password: &str, salt: &[u8]) -> CipherResult<DataKey> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_SIZE)
        .map_err(|e| CipherError::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; KEY_SIZE];
    scrypt(password.as_bytes(), salt, &params, &mut key)
        .map_err(|e| CipherError::KeyDerivation(e.to_string()))?;

    let derived = DataKey::new(key);
    zeroize::Zeroize::zeroize(&mut key);
    Ok(derived)
}

/// Generates a random base64-encoded salt.
pub fn random_salt() -> String {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    BASE64.encode(salt)
}

/// Everything persisted about the password, stored in the options table.
///
/// - `verification_hash` = base64(scrypt(password, verification_salt)),
///   used to reject a wrong password before touching the data key
/// - `encrypted_data_key` = base64(encrypt(scrypt(password, derived_key_salt),
///   data_key)) with a 16-byte verification prefix
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub verification_salt: String,
    pub verification_hash: String,
    pub derived_key_salt: String,
    pub encrypted_data_key: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial").finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Sets up a first password: generates a fresh data key and wraps it.
    pub fn create(password: &str) -> CipherResult<Self> {
        Self::wrap(password, &DataKey::random())
    }

    /// Wraps `data_key` under `password` with fresh salts.
    pub fn wrap(password: &str, data_key: &DataKey) -> CipherResult<Self> {
        let verification_salt = random_salt();
        let derived_key_salt = random_salt();

        let verification_key = derive_key(password, &BASE64.decode(&verification_salt)?)?;
        let password_key = derive_key(password, &BASE64.decode(&derived_key_salt)?)?;

        let wrapped = cipher::encrypt_with_verification(
            &password_key,
            data_key.as_bytes(),
            KEY_VERIFICATION_BYTES,
        )?;

        Ok(Self {
            verification_salt,
            verification_hash: BASE64.encode(verification_key.as_bytes()),
            derived_key_salt,
            encrypted_data_key: BASE64.encode(wrapped),
        })
    }

    /// Checks the password against the stored verification hash.
    pub fn verify(&self, password: &str) -> SessionResult<()> {
        let salt = BASE64.decode(&self.verification_salt).map_err(CipherError::from)?;
        let key = derive_key(password, &salt)?;
        if BASE64.encode(key.as_bytes()) == self.verification_hash {
            Ok(())
        } else {
            Err(SessionError::WrongPassword)
        }
    }

    /// Verifies the password and unwraps the data key.
    ///
    /// # Errors
    ///
    /// `SessionError::WrongPassword` if the password does not verify or the
    /// wrapped key fails its integrity check.
    pub fn open(&self, password: &str) -> SessionResult<DataKey> {
        self.verify(password)?;

        let salt = BASE64.decode(&self.derived_key_salt).map_err(CipherError::from)?;
        let password_key = derive_key(password, &salt)?;
        let wrapped = BASE64
            .decode(&self.encrypted_data_key)
            .map_err(CipherError::from)?;

        let raw = zeroize::Zeroizing::new(
            cipher::decrypt(&password_key, &wrapped, KEY_VERIFICATION_BYTES)
                .map_err(|_| SessionError::WrongPassword)?,
        );
        Ok(DataKey::from_slice(&raw)?)
    }

    /// Re-wraps the same data key under a new password.
    pub fn rewrap(&self, old_password: &str, new_password: &str) -> SessionResult<Self> {
        let data_key = self.open(old_password)?;
        Ok(Self::wrap(new_password, &data_key)?)
    }
}
