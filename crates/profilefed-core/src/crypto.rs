//! Cryptographic primitives for response signing
//!
//! ProfileFed signs the exact bytes of each response body with the server's
//! Ed25519 private key and conveys the detached signature base64-encoded in
//! a response header. There is no envelope format: the signed message IS the
//! body, so implementations must marshal once and reuse the buffer for both
//! signing and writing.

use crate::error::{ProfileFedError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

/// Generate a new random Ed25519 signing key
pub fn generate_keypair() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// Sign a message and return the base64-encoded detached signature
pub fn sign_base64(key: &SigningKey, message: &[u8]) -> String {
    STANDARD.encode(key.sign(message).to_bytes())
}

/// Verify a detached signature over a message.
///
/// Returns false for malformed signature bytes instead of failing, so
/// callers can treat "garbage signature" and "wrong key" uniformly.
pub fn verify_detached(key: &VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
    let Ok(sig) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(message, &sig).is_ok()
}

/// Decode a base64-encoded signature into raw bytes
pub fn decode_signature(encoded: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded)?)
}

/// Encode a verifying key as standard base64
pub fn encode_verifying_key(key: &VerifyingKey) -> String {
    STANDARD.encode(key.to_bytes())
}

/// Decode a base64-encoded Ed25519 verifying key
pub fn decode_verifying_key(encoded: &str) -> Result<VerifyingKey> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| ProfileFedError::InvalidKey(e.to_string()))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| ProfileFedError::InvalidKey("key must be 32 bytes".into()))?;
    Ok(VerifyingKey::from_bytes(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let key = generate_keypair();
        let sig = sign_base64(&key, b"hello federation");
        let sig_bytes = decode_signature(&sig).unwrap();

        assert!(verify_detached(
            &key.verifying_key(),
            b"hello federation",
            &sig_bytes
        ));
        assert!(!verify_detached(
            &key.verifying_key(),
            b"tampered body",
            &sig_bytes
        ));
    }

    #[test]
    fn test_verification_fails_with_wrong_key() {
        let key1 = generate_keypair();
        let key2 = generate_keypair();

        let sig = decode_signature(&sign_base64(&key1, b"message")).unwrap();
        assert!(!verify_detached(&key2.verifying_key(), b"message", &sig));
    }

    #[test]
    fn test_malformed_signature_is_not_fatal() {
        let key = generate_keypair();
        // Wrong length, not even close to a signature
        assert!(!verify_detached(&key.verifying_key(), b"msg", b"abc"));
        assert!(!verify_detached(&key.verifying_key(), b"msg", &[]));
    }

    #[test]
    fn test_verifying_key_roundtrip() {
        let key = generate_keypair();
        let encoded = encode_verifying_key(&key.verifying_key());
        let decoded = decode_verifying_key(&encoded).unwrap();
        assert_eq!(decoded, key.verifying_key());
    }

    #[test]
    fn test_decode_verifying_key_rejects_bad_input() {
        assert!(decode_verifying_key("not base64!!!").is_err());
        // Valid base64, wrong length
        let short = STANDARD.encode([0u8; 16]);
        assert!(decode_verifying_key(&short).is_err());
    }
}
