//! Protected content: cipher, password key derivation, session and codec.

pub mod cipher;
mod codec;
mod errors;
pub mod kdf;
mod session;

pub use cipher::DataKey;
pub use codec::EntityCodec;
pub use errors::{CipherError, CipherResult, SessionError, SessionResult};
pub use kdf::KeyMaterial;
pub use session::{
    DEFAULT_EXPIRY_CHECK_INTERVAL, DEFAULT_SESSION_TIMEOUT, ExpiryTimer, ProtectedSession,
    SessionState, UnlockOutcome,
};
