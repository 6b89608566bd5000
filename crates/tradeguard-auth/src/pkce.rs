//! PKCE (Proof Key for Code Exchange) helpers.
//!
//! Only the S256 method is supported: the challenge is
//! `base64url(SHA-256(code_verifier))` without padding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use tradeguard_core::error::ControlPlaneError;

/// Random bytes behind each authorization `state` value.
const STATE_BYTES: usize = 32;

/// Reject challenges that are too short or not base64url.
pub fn validate_code_challenge(challenge: &str, min_length: usize) -> Result<(), ControlPlaneError> {
    let well_formed = challenge.len() >= min_length
        && challenge
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if well_formed {
        Ok(())
    } else {
        Err(ControlPlaneError::InvalidCodeChallenge)
    }
}

/// Compute the S256 challenge for a verifier.
pub fn s256_challenge(code_verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code_verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Whether `code_verifier` hashes to `code_challenge`.
pub fn verifier_matches(code_verifier: &str, code_challenge: &str) -> bool {
    constant_time_eq(s256_challenge(code_verifier).as_bytes(), code_challenge.as_bytes())
}

/// Generate an opaque, URL-safe authorization `state`.
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s256_rfc7636_vector() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            s256_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
        assert!(verifier_matches(verifier, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"));
        assert!(!verifier_matches("another-verifier", "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"));
    }

    #[test]
    fn test_challenge_length_boundary() {
        assert!(validate_code_challenge(&"a".repeat(43), 43).is_ok());
        assert_eq!(
            validate_code_challenge(&"a".repeat(42), 43),
            Err(ControlPlaneError::InvalidCodeChallenge)
        );
    }

    #[test]
    fn test_challenge_rejects_non_base64url() {
        let padded = format!("{}=", "a".repeat(43));
        assert!(validate_code_challenge(&padded, 43).is_err());
        let with_plus = format!("{}+", "a".repeat(43));
        assert!(validate_code_challenge(&with_plus, 43).is_err());
    }

    #[test]
    fn test_state_is_random_and_url_safe() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(validate_code_challenge(&a, 43).is_ok());
    }
}
