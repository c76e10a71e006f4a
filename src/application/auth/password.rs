use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::warn;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash `plaintext ‖ salt` with SHA-256 and return the lowercase hex digest.
///
/// Deterministic: the salt is a fixed, configured value rather than a random
/// per-credential salt, since there is exactly one admin credential.
pub fn hash_password(plaintext: &str, salt: &str) -> String {
    hex::encode(digest(plaintext, salt))
}

/// Check `plaintext` against a stored hex digest.
///
/// Digests of different length are rejected up front (length is not secret);
/// equal-length digests are compared in constant time. A stored digest that
/// is not valid hex is treated as a mismatch.
pub fn verify_password(plaintext: &str, salt: &str, stored_digest: &str) -> bool {
    let computed = digest(plaintext, salt);
    if stored_digest.len() != computed.len() * 2 {
        return false;
    }

    let stored = match hex::decode(stored_digest) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                target = "homeblog::auth::password",
                error = %err,
                "stored password digest is malformed"
            );
            return false;
        }
    };

    computed.as_slice().ct_eq(stored.as_slice()).into()
}

/// Whether `value` looks like a digest produced by [`hash_password`].
pub fn is_digest(value: &str) -> bool {
    value.len() == DIGEST_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

fn digest(plaintext: &str, salt: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.finalize().to_vec()
}
