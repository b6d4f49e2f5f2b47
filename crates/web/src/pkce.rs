//! PKCE code generation for the Lichess OAuth flow

use base64::Engine as _;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a (verifier, challenge) pair: random verifier, S256
/// challenge encoded as unpadded url-safe base64.
pub fn generate_pkce() -> (String, String) {
    let verifier = random_token(64);
    let digest = Sha256::digest(verifier.as_bytes());
    let challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    (verifier, challenge)
}

/// CSRF state nonce for the authorization request.
pub fn random_state() -> String {
    random_token(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_is_urlsafe_and_unpadded() {
        let (verifier, challenge) = generate_pkce();
        assert_eq!(verifier.len(), 64);
        // SHA-256 digest is 32 bytes -> 43 base64 chars unpadded.
        assert_eq!(challenge.len(), 43);
        assert!(!challenge.contains('='));
        assert!(!challenge.contains('+'));
        assert!(!challenge.contains('/'));
    }

    #[test]
    fn verifiers_are_unique() {
        let (a, _) = generate_pkce();
        let (b, _) = generate_pkce();
        assert_ne!(a, b);
    }
}
