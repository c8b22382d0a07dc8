use sha2::{Digest, Sha256};

/// Hex-encoded SHA256 digest of a byte buffer.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
