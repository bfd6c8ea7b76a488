//! Auxiliary cryptographic primitives: hashing, HMAC, key derivation,
//! CSPRNG bytes, and constant-time comparison.

use crate::error::{CryptoError, CryptoResult};
use crate::secure::SecureBuffer;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;

/// Minimum accepted PBKDF2 iteration count.
pub const MIN_PBKDF2_ITERATIONS: u32 = 10_000;
/// Maximum derived key length.
pub const MAX_DERIVED_KEY_LEN: usize = 64;
/// Maximum bytes drawn from the CSPRNG per call (1 MiB).
pub const MAX_RANDOM_BYTES: usize = 1024 * 1024;

/// SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// SHA-512 digest.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let digest = Sha512::digest(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    out
}

/// HMAC-SHA-256 over `data` with `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> CryptoResult<[u8; 32]> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|_| CryptoError::Failure("HMAC key setup failed".into()))?;
    mac.update(data);
    let digest = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Ok(out)
}

/// PBKDF2-HMAC-SHA-512 key derivation.
///
/// Rejects iteration counts below [`MIN_PBKDF2_ITERATIONS`], empty
/// passwords or salts, and output lengths outside (0, 64].
pub fn derive_key_pbkdf2(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    out_len: usize,
) -> CryptoResult<SecureBuffer> {
    if password.is_empty() {
        return Err(CryptoError::invalid("password must not be empty"));
    }
    if salt.is_empty() {
        return Err(CryptoError::invalid("salt must not be empty"));
    }
    if iterations < MIN_PBKDF2_ITERATIONS {
        return Err(CryptoError::invalid(format!(
            "PBKDF2 iterations {iterations} below the minimum {MIN_PBKDF2_ITERATIONS}"
        )));
    }
    if out_len == 0 || out_len > MAX_DERIVED_KEY_LEN {
        return Err(CryptoError::invalid(format!(
            "derived key length {out_len} outside (0, {MAX_DERIVED_KEY_LEN}]"
        )));
    }

    let mut derived = vec![0u8; out_len];
    pbkdf2::pbkdf2::<Hmac<Sha512>>(password, salt, iterations, &mut derived)
        .map_err(|_| CryptoError::Failure("PBKDF2 derivation failed".into()))?;
    SecureBuffer::from_vec(derived)
}

/// Fill a fresh buffer with bytes from the OS CSPRNG.
pub fn random_bytes(len: usize) -> CryptoResult<Vec<u8>> {
    if len == 0 || len > MAX_RANDOM_BYTES {
        return Err(CryptoError::invalid(format!(
            "random byte count {len} outside (0, {MAX_RANDOM_BYTES}]"
        )));
    }
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    Ok(buf)
}

/// Constant-time equality for equal-length byte strings. Slices of
/// different lengths compare unequal immediately (the length is not secret).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
