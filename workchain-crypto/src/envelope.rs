//! Tenant AEAD Envelope: AES-256-GCM with organization-id binding.
//!
//! Encryption draws a fresh 96-bit IV from the OS CSPRNG, authenticates the
//! caller-supplied organization id as AAD, and yields the frame
//! `IV || ciphertext` with the 16-byte tag detached. Decryption must present
//! a byte-identical AAD; any mismatch, tampering, or wrong key surfaces as
//! `AuthFailed` after the plaintext scratch buffer is zeroized.
//!
//! (key, IV) pairs never repeat: IVs are never derived from message content,
//! so collision probability is bounded by the birthday term on 96 bits.

use crate::context::CryptoContext;
use crate::error::{CryptoError, CryptoResult};
use crate::secure::SecureBuffer;
use aes_gcm::aead::{AeadCore, KeyInit, OsRng};
use aes_gcm::{AeadInPlace, Aes256Gcm, Key, Nonce, Tag};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;
use zeroize::Zeroize;

/// IV length prepended to every ciphertext frame.
pub const IV_LEN: usize = 12;
/// Detached authentication tag length.
pub const TAG_LEN: usize = 16;
/// Maximum plaintext accepted per encryption (50 MiB).
pub const MAX_PLAINTEXT_LEN: usize = 50 * 1024 * 1024;

/// One sealed payload: the wire frame plus its detached tag.
#[derive(Debug, Clone)]
pub struct SealedEnvelope {
    /// `IV[12] || ciphertext`
    pub frame: Vec<u8>,
    /// GCM authentication tag, transmitted out-of-band or appended by the caller
    pub tag: [u8; TAG_LEN],
}

impl SealedEnvelope {
    pub fn iv(&self) -> &[u8] {
        &self.frame[..IV_LEN]
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.frame[IV_LEN..]
    }
}

/// AES-256-GCM envelope bound to whatever organization id callers pass as AAD.
pub struct TenantEnvelope {
    cipher: Aes256Gcm,
    total_sealed: AtomicU64,
    total_opened: AtomicU64,
    auth_failures: AtomicU64,
}

impl TenantEnvelope {
    /// Build an envelope over a context's master key.
    pub fn new(context: &CryptoContext) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(context.key())),
            total_sealed: AtomicU64::new(0),
            total_opened: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
        }
    }

    /// Build an envelope directly from a 32-byte key.
    pub fn from_key(key: &[u8]) -> CryptoResult<Self> {
        if key.len() != 32 {
            return Err(CryptoError::invalid(format!(
                "envelope key must be 32 bytes, got {}",
                key.len()
            )));
        }
        Ok(Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
            total_sealed: AtomicU64::new(0),
            total_opened: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
        })
    }

    /// Encrypt `plaintext`, binding `aad` (the organization id; may be
    /// empty) into the authentication tag.
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> CryptoResult<SealedEnvelope> {
        if plaintext.len() > MAX_PLAINTEXT_LEN {
            return Err(CryptoError::Overflow {
                size: plaintext.len(),
                max: MAX_PLAINTEXT_LEN,
            });
        }

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let mut frame = Vec::with_capacity(IV_LEN + plaintext.len());
        frame.extend_from_slice(&nonce);
        frame.extend_from_slice(plaintext);

        let tag = self
            .cipher
            .encrypt_in_place_detached(&nonce, aad, &mut frame[IV_LEN..])
            .map_err(|_| CryptoError::Failure("AES-256-GCM encryption failed".into()))?;

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(&tag);

        self.total_sealed.fetch_add(1, Ordering::Relaxed);
        Ok(SealedEnvelope {
            frame,
            tag: tag_bytes,
        })
    }

    /// Decrypt a frame produced by [`encrypt`](Self::encrypt).
    ///
    /// `aad` must be byte-identical to the value used at encryption; a
    /// mismatch is indistinguishable from tampering or a wrong key and
    /// yields `AuthFailed` with the scratch plaintext zeroized.
    pub fn decrypt(&self, frame: &[u8], tag: &[u8], aad: &[u8]) -> CryptoResult<SecureBuffer> {
        if frame.len() < IV_LEN {
            return Err(CryptoError::invalid(format!(
                "ciphertext frame of {} bytes is shorter than the {IV_LEN}-byte IV",
                frame.len()
            )));
        }
        if tag.len() != TAG_LEN {
            return Err(CryptoError::invalid(format!(
                "authentication tag must be {TAG_LEN} bytes, got {}",
                tag.len()
            )));
        }

        let (iv, ciphertext) = frame.split_at(IV_LEN);
        let nonce = Nonce::from_slice(iv);
        let mut plaintext = ciphertext.to_vec();

        if self
            .cipher
            .decrypt_in_place_detached(nonce, aad, &mut plaintext, Tag::from_slice(tag))
            .is_err()
        {
            plaintext.zeroize();
            self.auth_failures.fetch_add(1, Ordering::Relaxed);
            warn!("Envelope authentication failed");
            return Err(CryptoError::AuthFailed);
        }

        self.total_opened.fetch_add(1, Ordering::Relaxed);
        SecureBuffer::from_vec(plaintext)
    }

    pub fn total_sealed(&self) -> u64 {
        self.total_sealed.load(Ordering::Relaxed)
    }

    pub fn total_opened(&self) -> u64 {
        self.total_opened.load(Ordering::Relaxed)
    }

    pub fn auth_failures(&self) -> u64 {
        self.auth_failures.load(Ordering::Relaxed)
    }
}
