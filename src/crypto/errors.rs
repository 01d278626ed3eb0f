//! Error types for the protected-content pipeline.

use thiserror::Error;

/// Errors from encrypting or decrypting a buffer.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption key is missing")]
    MissingKey,

    /// Wrong key or corrupted ciphertext.
    #[error("decryption failed: wrong key or corrupted data")]
    Decryption,

    #[error("ciphertext is malformed: {0}")]
    Malformed(String),

    #[error("encrypted text is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("decrypted text is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Result type alias for cipher operations.
pub type CipherResult<T> = Result<T, CipherError>;

/// Errors from the protected session and the entity codec.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("wrong password")]
    WrongPassword,

    #[error("protected session is required; unlock it with the password first")]
    ProtectedSessionRequired,

    #[error("an unlock attempt is already in progress")]
    UnlockInProgress,

    #[error("no password has been set")]
    PasswordNotSet,

    #[error("password has already been set")]
    PasswordAlreadySet,

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
