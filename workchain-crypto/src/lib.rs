//! # WorkChain Crypto
//!
//! Authenticated symmetric encryption with tenant-context binding.
//!
//! The centerpiece is the [`TenantEnvelope`]: AES-256-GCM with a 96-bit
//! random IV, a detached 128-bit tag, and the caller's organization id bound
//! to the ciphertext as AAD. A ciphertext sealed for tenant A will not open
//! under tenant B; the only signal is [`CryptoError::AuthFailed`], identical
//! to tampering or a wrong key.
//!
//! Wire format (bit-exact):
//!
//! ```text
//! frame = IV[12] || ciphertext[n]
//! tag   = tag[16]                  (transmitted separately)
//! AAD   = organization id bytes    (opaque, must match on decrypt)
//! ```
//!
//! Auxiliary primitives (SHA-256/512, HMAC-SHA-256, PBKDF2-HMAC-SHA-512,
//! CSPRNG bytes, constant-time compare) live in [`primitives`]. Key
//! material is zeroized on drop throughout.

pub mod context;
pub mod envelope;
pub mod error;
pub mod primitives;
pub mod secure;

#[cfg(test)]
mod tests;

pub use context::CryptoContext;
pub use envelope::{SealedEnvelope, TenantEnvelope, IV_LEN, MAX_PLAINTEXT_LEN, TAG_LEN};
pub use error::{CryptoError, CryptoResult, SUCCESS_CODE};
pub use secure::SecureBuffer;
