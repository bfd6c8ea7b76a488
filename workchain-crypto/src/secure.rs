//! Secure byte buffers: bounded allocation, zeroized on drop.

use crate::error::{CryptoError, CryptoResult};
use zeroize::Zeroize;

/// Maximum capacity of a single secure buffer (100 MiB).
pub const MAX_SECURE_BUFFER: usize = 100 * 1024 * 1024;

/// Owned byte buffer for sensitive material. Contents are zeroized when the
/// buffer is dropped or wiped; `Debug` never prints the bytes.
pub struct SecureBuffer {
    data: Vec<u8>,
}

impl SecureBuffer {
    /// Allocate an empty buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> CryptoResult<Self> {
        if capacity == 0 || capacity > MAX_SECURE_BUFFER {
            return Err(CryptoError::invalid(format!(
                "secure buffer capacity {capacity} outside (0, {MAX_SECURE_BUFFER}]"
            )));
        }
        Ok(Self {
            data: Vec::with_capacity(capacity),
        })
    }

    /// Take ownership of existing bytes.
    pub fn from_vec(data: Vec<u8>) -> CryptoResult<Self> {
        if data.len() > MAX_SECURE_BUFFER {
            return Err(CryptoError::MemoryError(format!(
                "secure buffer of {} bytes exceeds the {MAX_SECURE_BUFFER}-byte bound",
                data.len()
            )));
        }
        Ok(Self { data })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Zeroize the contents and empty the buffer.
    pub fn wipe(&mut self) {
        self.data.zeroize();
    }
}

impl std::fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureBuffer([REDACTED, {} bytes])", self.data.len())
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}
