//! Error types for caravan-util.

/// Errors produced by utility functions.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// An I/O operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The server answered 404 for the requested URL.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// A download failed.
    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// A path segment contains unsafe characters.
    #[error("invalid path segment \"{segment}\": only alphanumeric characters, dots, hyphens, plus signs, and underscores are allowed")]
    InvalidSegment { segment: String },

    /// An artifact hash does not match the expected value.
    #[error("artifact hash mismatch for {path}: expected {expected}, got {actual}")]
    ArtifactHashMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// Cannot determine the user's home directory.
    #[error("cannot determine home directory: set CARAVAN_HOME or HOME")]
    NoHomeDir,
}

impl UtilError {
    /// `true` when the remote resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
