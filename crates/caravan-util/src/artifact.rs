//! Artifact download, SHA-256 verification, and atomic placement into a cache.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::download::{BasicAuth, HttpClient};
use crate::error::UtilError;

/// Result of ensuring an artifact is available locally.
#[derive(Debug, Clone)]
pub struct ArtifactResult {
    /// Path to the artifact on disk.
    pub path: PathBuf,
    /// Hex-encoded SHA-256 hash of the artifact.
    pub sha256: String,
    /// `true` if the artifact was downloaded this call, `false` if it already existed.
    pub freshly_downloaded: bool,
}

/// Where and how to fetch one artifact.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactRequest<'a> {
    pub url: &'a str,
    pub dest: &'a Path,
    pub expected_sha256: Option<&'a str>,
    pub auth: Option<&'a BasicAuth>,
    /// Download again even when `dest` already exists.
    pub refresh: bool,
}

/// Validate that a coordinate part is safe for filesystem paths and URLs.
///
/// Allows only `[a-zA-Z0-9._+-]`, must be non-empty and must not be `.`/`..`.
///
/// # Errors
/// Returns `UtilError::InvalidSegment` if the string is empty or contains
/// characters outside the allowed set.
pub fn validate_segment(segment: &str) -> Result<(), UtilError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+');
    if segment.is_empty() || segment == "." || segment == ".." || !segment.chars().all(allowed) {
        return Err(UtilError::InvalidSegment {
            segment: segment.to_owned(),
        });
    }
    Ok(())
}

fn check_hash(path: &Path, expected: Option<&str>, actual: &str) -> Result<(), UtilError> {
    match expected {
        Some(expected) if !expected.eq_ignore_ascii_case(actual) => {
            Err(UtilError::ArtifactHashMismatch {
                path: path.display().to_string(),
                expected: expected.to_owned(),
                actual: actual.to_owned(),
            })
        }
        _ => Ok(()),
    }
}

/// A temp path next to `dest`, unique within this process.
fn temp_path(dest: &Path) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact");
    let tmp_name = format!(".tmp-{name}-{pid}-{n}");
    dest.parent()
        .map(|p| p.join(&tmp_name))
        .unwrap_or_else(|| PathBuf::from(&tmp_name))
}

/// Ensure a single-file artifact exists at `request.dest`, downloading it if needed.
///
/// 1. If `dest` already exists and `refresh` is off, hash it and verify against
///    `expected_sha256` (if provided). Return with `freshly_downloaded = false`.
/// 2. Otherwise create parent directories, download to a temp file, verify
///    the hash, then atomically rename into place.
/// 3. If the rename fails but `dest` now exists, another process placed the
///    file concurrently; verify the placed file's hash instead.
/// 4. The temp file is removed on all error paths.
///
/// # Errors
/// Returns an error if the download fails, the hash does not match, or an
/// I/O operation fails.
pub fn ensure_artifact(
    client: &HttpClient,
    request: &ArtifactRequest<'_>,
) -> Result<ArtifactResult, UtilError> {
    let dest = request.dest;

    if dest.exists() && !request.refresh {
        let actual_hash = crate::hash::sha256_file(dest)?;
        check_hash(dest, request.expected_sha256, &actual_hash)?;
        return Ok(ArtifactResult {
            path: dest.to_path_buf(),
            sha256: actual_hash,
            freshly_downloaded: false,
        });
    }

    if let Some(parent) = dest.parent() {
        crate::fs::ensure_dir(parent)?;
    }

    let tmp_path = temp_path(dest);
    let download_hash = match client.download(request.url, &tmp_path, request.auth) {
        Ok(hash) => hash,
        Err(e) => {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }
    };

    if let Err(e) = check_hash(dest, request.expected_sha256, &download_hash) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    match std::fs::rename(&tmp_path, dest) {
        Ok(()) => {}
        Err(_) if dest.exists() => {
            let _ = std::fs::remove_file(&tmp_path);
            let placed_hash = crate::hash::sha256_file(dest)?;
            check_hash(dest, request.expected_sha256, &placed_hash)?;
        }
        Err(source) => {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(UtilError::Io {
                path: dest.display().to_string(),
                source,
            });
        }
    }

    Ok(ArtifactResult {
        path: dest.to_path_buf(),
        sha256: download_hash,
        freshly_downloaded: true,
    })
}
