#[cfg(test)]
mod tests {
    use crate::context::CryptoContext;
    use crate::envelope::{TenantEnvelope, IV_LEN, MAX_PLAINTEXT_LEN, TAG_LEN};
    use crate::error::{CryptoError, SUCCESS_CODE};
    use crate::primitives::*;
    use crate::secure::{SecureBuffer, MAX_SECURE_BUFFER};

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn test_envelope() -> TenantEnvelope {
        TenantEnvelope::from_key(&[0x42u8; 32]).unwrap()
    }

    // ── Envelope ─────────────────────────────────────────────────────────

    #[test]
    fn test_roundtrip_with_tenant_binding() {
        let envelope = test_envelope();
        let sealed = envelope.encrypt(b"hello", b"org-A").unwrap();
        let opened = envelope.decrypt(&sealed.frame, &sealed.tag, b"org-A").unwrap();
        assert_eq!(opened.as_slice(), b"hello");
        assert_eq!(envelope.total_sealed(), 1);
        assert_eq!(envelope.total_opened(), 1);
    }

    #[test]
    fn test_wrong_tenant_fails_authentication() {
        // Sealed for org-A, presented as org-B: the only signal is
        // AuthFailed, identical to tampering.
        let envelope = test_envelope();
        let sealed = envelope.encrypt(b"hello", b"org-A").unwrap();
        let err = envelope.decrypt(&sealed.frame, &sealed.tag, b"org-B").unwrap_err();
        assert!(matches!(err, CryptoError::AuthFailed));
        assert_eq!(err.code(), -2);
        assert_eq!(envelope.auth_failures(), 1);
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let envelope = test_envelope();
        let other = TenantEnvelope::from_key(&[0x43u8; 32]).unwrap();
        let sealed = envelope.encrypt(b"payload", b"org-A").unwrap();
        let err = other.decrypt(&sealed.frame, &sealed.tag, b"org-A").unwrap_err();
        assert!(matches!(err, CryptoError::AuthFailed));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let envelope = test_envelope();
        let mut sealed = envelope.encrypt(b"untouchable", b"org-A").unwrap();
        sealed.frame[IV_LEN] ^= 0x01;
        let err = envelope.decrypt(&sealed.frame, &sealed.tag, b"org-A").unwrap_err();
        assert!(matches!(err, CryptoError::AuthFailed));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let envelope = test_envelope();
        let mut sealed = envelope.encrypt(b"untouchable", b"org-A").unwrap();
        sealed.tag[0] ^= 0x80;
        let err = envelope.decrypt(&sealed.frame, &sealed.tag, b"org-A").unwrap_err();
        assert!(matches!(err, CryptoError::AuthFailed));
    }

    #[test]
    fn test_short_frame_rejected() {
        let envelope = test_envelope();
        let err = envelope.decrypt(&[0u8; IV_LEN - 1], &[0u8; TAG_LEN], b"org-A").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidInput(_)));
        assert_eq!(err.code(), -3);
    }

    #[test]
    fn test_bad_tag_length_rejected() {
        let envelope = test_envelope();
        let sealed = envelope.encrypt(b"x", b"").unwrap();
        let err = envelope.decrypt(&sealed.frame, &sealed.tag[..8], b"").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_plaintext_and_empty_aad() {
        let envelope = test_envelope();
        let sealed = envelope.encrypt(b"", b"").unwrap();
        assert_eq!(sealed.frame.len(), IV_LEN);
        let opened = envelope.decrypt(&sealed.frame, &sealed.tag, b"").unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn test_frame_layout() {
        let envelope = test_envelope();
        let plaintext = b"twelve bytes";
        let sealed = envelope.encrypt(plaintext, b"org-A").unwrap();
        assert_eq!(sealed.frame.len(), IV_LEN + plaintext.len());
        assert_eq!(sealed.iv().len(), IV_LEN);
        assert_eq!(sealed.ciphertext().len(), plaintext.len());
        assert_ne!(sealed.ciphertext(), plaintext);
    }

    #[test]
    fn test_iv_freshness() {
        // Same key, same plaintext: frames must differ because each
        // encryption draws a fresh random IV.
        let envelope = test_envelope();
        let first = envelope.encrypt(b"repeat after me", b"org-A").unwrap();
        let second = envelope.encrypt(b"repeat after me", b"org-A").unwrap();
        assert_ne!(first.iv(), second.iv());
        assert_ne!(first.frame, second.frame);
        assert_ne!(first.tag, second.tag);
    }

    #[test]
    fn test_oversize_plaintext_rejected() {
        let envelope = test_envelope();
        let oversize = vec![0u8; MAX_PLAINTEXT_LEN + 1];
        let err = envelope.encrypt(&oversize, b"org-A").unwrap_err();
        assert!(matches!(err, CryptoError::Overflow { .. }));
        assert_eq!(err.code(), -5);
    }

    #[test]
    fn test_envelope_key_length_validated() {
        assert!(TenantEnvelope::from_key(&[0u8; 16]).is_err());
        assert!(TenantEnvelope::from_key(&[0u8; 33]).is_err());
        assert!(TenantEnvelope::from_key(&[0u8; 32]).is_ok());
    }

    #[test]
    fn test_context_roundtrip() {
        let context = CryptoContext::new(&[7u8; 32]).unwrap();
        let envelope = TenantEnvelope::new(&context);
        let sealed = envelope.encrypt(b"context sealed", b"tenant-1").unwrap();
        let opened = envelope.decrypt(&sealed.frame, &sealed.tag, b"tenant-1").unwrap();
        assert_eq!(opened.as_slice(), b"context sealed");
    }

    #[test]
    fn test_context_validation_and_redaction() {
        let err = CryptoContext::new(&[0u8; 31]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidInput(_)));

        let context = CryptoContext::new(&[9u8; 32]).unwrap();
        let debug = format!("{context:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains('9'));
    }

    #[test]
    fn test_context_salts_are_random() {
        let a = CryptoContext::new(&[1u8; 32]).unwrap();
        let b = CryptoContext::new(&[1u8; 32]).unwrap();
        assert_ne!(a.salt(), b.salt());
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(SUCCESS_CODE, 0);
        assert_eq!(CryptoError::Failure("x".into()).code(), -1);
        assert_eq!(CryptoError::AuthFailed.code(), -2);
        assert_eq!(CryptoError::InvalidInput("x".into()).code(), -3);
        assert_eq!(CryptoError::MemoryError("x".into()).code(), -4);
        assert_eq!(CryptoError::Overflow { size: 1, max: 0 }.code(), -5);
    }

    // ── Primitives ───────────────────────────────────────────────────────

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256(b"abc").to_vec(),
            hex("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn test_sha512_known_vector() {
        assert_eq!(
            sha512(b"abc").to_vec(),
            hex("ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f")
        );
    }

    #[test]
    fn test_hmac_sha256_known_vector() {
        let mac = hmac_sha256(b"key", b"The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(
            mac.to_vec(),
            hex("f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8")
        );
    }

    #[test]
    fn test_pbkdf2_bounds() {
        assert!(derive_key_pbkdf2(b"", b"salt", 10_000, 32).is_err());
        assert!(derive_key_pbkdf2(b"pw", b"", 10_000, 32).is_err());
        assert!(derive_key_pbkdf2(b"pw", b"salt", 9_999, 32).is_err());
        assert!(derive_key_pbkdf2(b"pw", b"salt", 10_000, 0).is_err());
        assert!(derive_key_pbkdf2(b"pw", b"salt", 10_000, 65).is_err());
        assert!(derive_key_pbkdf2(b"pw", b"salt", 10_000, 64).is_ok());
    }

    #[test]
    fn test_pbkdf2_deterministic_and_salt_sensitive() {
        let a = derive_key_pbkdf2(b"password", b"salt-1", 10_000, 32).unwrap();
        let b = derive_key_pbkdf2(b"password", b"salt-1", 10_000, 32).unwrap();
        let c = derive_key_pbkdf2(b"password", b"salt-2", 10_000, 32).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
        assert_ne!(a.as_slice(), c.as_slice());
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_random_bytes_bounds_and_freshness() {
        assert!(random_bytes(0).is_err());
        assert!(random_bytes(MAX_RANDOM_BYTES + 1).is_err());

        let a = random_bytes(32).unwrap();
        let b = random_bytes(32).unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"same", b"same"));
        assert!(!constant_time_eq(b"same", b"sbme"));
        assert!(!constant_time_eq(b"short", b"longer"));
        assert!(constant_time_eq(b"", b""));
    }

    // ── Secure buffer ────────────────────────────────────────────────────

    #[test]
    fn test_secure_buffer_bounds() {
        assert!(SecureBuffer::with_capacity(0).is_err());
        assert!(SecureBuffer::with_capacity(MAX_SECURE_BUFFER + 1).is_err());
        assert!(SecureBuffer::with_capacity(1024).is_ok());
    }

    #[test]
    fn test_secure_buffer_wipe_and_redaction() {
        let mut buffer = SecureBuffer::from_vec(b"top secret".to_vec()).unwrap();
        assert_eq!(buffer.len(), 10);

        let debug = format!("{buffer:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("top secret"));

        buffer.wipe();
        assert!(buffer.is_empty());
    }
}
