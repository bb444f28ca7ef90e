//! Content digests and correlation identifiers
//!
//! Object identity is the digest of the payload under a named algorithm,
//! encoded as unpadded URL-safe base64 so it can ride inside a URI
//! segment without escaping.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{CoreError, Result};

/// Length of a correlation identifier in characters
pub const ID_LENGTH: usize = 20;

/// Digest `content` under the named algorithm and encode the result as
/// unpadded URL-safe base64.
pub fn digest(content: &[u8], algorithm: &str) -> Result<String> {
    let raw = match algorithm {
        "sha-256" => Sha256::digest(content).to_vec(),
        "sha-384" => Sha384::digest(content).to_vec(),
        "sha-512" => Sha512::digest(content).to_vec(),
        other => return Err(CoreError::UnsupportedAlgorithm(other.to_string())),
    };
    Ok(URL_SAFE_NO_PAD.encode(raw))
}

/// Generate a random 20-character alphanumeric correlation identifier.
///
/// Uniqueness is best-effort: identifiers only correlate a response to
/// its request within a single exchange.
pub fn new_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let a = digest(b"hello world", "sha-256").unwrap();
        let b = digest(b"hello world", "sha-256").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_differs_by_content() {
        let a = digest(b"hello", "sha-256").unwrap();
        let b = digest(b"world", "sha-256").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_differs_by_algorithm() {
        let a = digest(b"hello", "sha-256").unwrap();
        let b = digest(b"hello", "sha-512").unwrap();
        assert_ne!(a, b);
        // sha-256 digests are 32 bytes, 43 base64 chars unpadded
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn test_digest_url_safe_alphabet() {
        // Brute a few inputs; none may contain '+', '/' or padding
        for i in 0u8..64 {
            let encoded = digest(&[i, i.wrapping_mul(7), 0xFF], "sha-256").unwrap();
            assert!(!encoded.contains('+'));
            assert!(!encoded.contains('/'));
            assert!(!encoded.contains('='));
        }
    }

    #[test]
    fn test_digest_unknown_algorithm() {
        assert_eq!(
            digest(b"hello", "md5"),
            Err(CoreError::UnsupportedAlgorithm("md5".to_string()))
        );
    }

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_new_id_varies() {
        assert_ne!(new_id(), new_id());
    }
}
