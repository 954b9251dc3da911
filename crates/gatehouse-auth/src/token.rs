//! Opaque random tokens and their persisted digests.
//!
//! Refresh tokens are only ever persisted as a SHA-256 digest. Lifecycle
//! codes are kept in clear so that a resend can return the pending value.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generates `bytes` random bytes and encodes them as URL-safe base64.
pub fn generate_opaque_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Hex-encoded SHA-256 digest of a token.
pub fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length_and_uniqueness() {
        let a = generate_opaque_token(32);
        let b = generate_opaque_token(32);
        assert_ne!(a, b);
        let decoded = URL_SAFE_NO_PAD.decode(&a).unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let d = digest("token");
        assert_eq!(d, digest("token"));
        assert_eq!(d.len(), 64);
        assert_ne!(d, digest("token2"));
    }
}
