//! Error types for cryptographic operations.
//!
//! Every variant maps to a stable integer code for embedding in wire
//! protocols and FFI surfaces; `0` is reserved for success. Authentication
//! failure deliberately carries no detail: tampering, a wrong key, and a
//! wrong organization id are indistinguishable by design.

use thiserror::Error;

/// Stable code for the success path.
pub const SUCCESS_CODE: i32 = 0;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// A cryptographic primitive failed (cipher init, RNG failure).
    #[error("cryptographic operation failed: {0}")]
    Failure(String),

    /// GCM tag verification failed: tampering, wrong key, or wrong
    /// organization id. The plaintext scratch buffer has been zeroized.
    #[error("authentication failed")]
    AuthFailed,

    /// Malformed or out-of-range argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Allocation failed or a buffer bound was exceeded.
    #[error("memory error: {0}")]
    MemoryError(String),

    /// Input larger than the permitted maximum.
    #[error("input too large: {size} bytes (max {max})")]
    Overflow { size: usize, max: usize },
}

impl CryptoError {
    /// Stable integer code for this error.
    pub fn code(&self) -> i32 {
        match self {
            CryptoError::Failure(_) => -1,
            CryptoError::AuthFailed => -2,
            CryptoError::InvalidInput(_) => -3,
            CryptoError::MemoryError(_) => -4,
            CryptoError::Overflow { .. } => -5,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CryptoError::InvalidInput(msg.into())
    }
}
