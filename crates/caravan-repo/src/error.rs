//! Error types for caravan-repo.

use caravan_model::ModelError;
use caravan_util::error::UtilError;

/// Errors produced while talking to repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// No repository holds the requested item.
    #[error("{what} not found in any repository")]
    NotFound { what: String },

    /// The backend cannot perform this operation at all.
    #[error("{repository} does not support {operation}")]
    Unsupported {
        operation: String,
        repository: String,
    },

    /// A module descriptor could not be parsed.
    #[error("invalid module descriptor {location}: {message}")]
    InvalidMetadata { location: String, message: String },

    /// A repository endpoint is misconfigured.
    #[error("invalid repository \"{url}\": {reason}")]
    InvalidRepository { url: String, reason: String },

    /// Every repository that holds the item failed to deliver it.
    #[error("cannot fetch {what}: {message}")]
    Failed { what: String, message: String },

    /// A utility operation (I/O, download, hashing) failed.
    #[error("{0}")]
    Util(#[from] UtilError),

    /// A coordinate or mapping inside a descriptor is malformed.
    #[error("{0}")]
    Model(#[from] ModelError),
}

impl RepoError {
    /// `true` when the next repository should be tried.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Util(e) => e.is_not_found(),
            _ => false,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
