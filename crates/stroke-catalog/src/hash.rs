#![deny(unsafe_code)]

use sha2::Digest;

/// Hex-encoded SHA-256 of the catalog source, recorded in run reports so a
/// clean table can be traced to the exact rules that produced it.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}
