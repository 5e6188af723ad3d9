use std::io::Read;
use std::path::Path;

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;

/// Length of a random token identifier.
pub const TOKEN_LEN: usize = 16;

/// Compute the SHA-256 hash of an in-memory buffer as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Compute the SHA-256 hash of a file's contents using streaming I/O.
/// Reads in 64KB chunks to avoid loading large files entirely into memory.
pub fn compute_sha256(path: &Path) -> std::io::Result<String> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::with_capacity(64 * 1024, file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

/// Generate a fresh random identifier of `TOKEN_LEN` lowercase hex characters.
pub fn random_token() -> String {
    let value: u64 = rand::rng().random();
    format!("{:016x}", value)
}

/// Whether `s` looks like a hex SHA-256 digest produced by [`sha256_hex`].
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == SHA256_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
