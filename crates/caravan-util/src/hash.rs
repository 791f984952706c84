//! SHA-256 helpers for artifact and sidecar verification.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::UtilError;

/// Hex SHA-256 of `data`.
pub fn sha256_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Hex SHA-256 of the file at `path`, streamed rather than read whole.
///
/// # Errors
/// Returns `UtilError::Io` if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<String, UtilError> {
    let io_error = |source| UtilError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(io_error)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(io_error)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Extract the digest from a `.sha256` sidecar file's content.
///
/// Sidecars hold either the bare digest or `"<digest>  <filename>"`.
pub fn parse_sidecar(content: &str) -> Option<String> {
    let digest = content.split_whitespace().next()?;
    (digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| digest.to_ascii_lowercase())
}
