//! Cryptographic context: the per-instance master key and salt.
//!
//! Created once per service instance. The key is read-only after
//! construction and may be shared freely behind an `Arc`; key and salt are
//! zeroized when the context is dropped. No IV lives here: a fresh one is
//! drawn per encryption.

use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Required master key length (AES-256).
pub const KEY_LEN: usize = 32;
/// Context salt length.
pub const SALT_LEN: usize = 16;

/// Master key plus a per-instance random salt for key derivation.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CryptoContext {
    key: [u8; KEY_LEN],
    salt: [u8; SALT_LEN],
}

impl CryptoContext {
    /// Build a context around a 32-byte master key; draws a fresh random
    /// salt from the OS CSPRNG.
    pub fn new(master_key: &[u8]) -> CryptoResult<Self> {
        if master_key.len() != KEY_LEN {
            return Err(CryptoError::invalid(format!(
                "master key must be {KEY_LEN} bytes, got {}",
                master_key.len()
            )));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(master_key);

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        Ok(Self { key, salt })
    }

    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }
}

impl std::fmt::Debug for CryptoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CryptoContext([REDACTED])")
    }
}
