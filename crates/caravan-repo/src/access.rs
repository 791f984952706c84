//! The capability the resolution engine calls into.

use std::path::PathBuf;

use caravan_model::{Coordinate, ModuleId, Version};

use crate::error::RepoError;
use crate::metadata::ModuleMetadata;

/// Metadata and artifact access over one or more repositories.
///
/// Implementations must be safe to call from several threads at once.
pub trait RepositoryAccess: Send + Sync {
    /// Every version of `module` the repositories know about.
    ///
    /// # Errors
    /// Returns an error if no repository can list versions of the module.
    fn available_versions(&self, module: &ModuleId) -> Result<Vec<Version>, RepoError>;

    /// Configurations and dependency edges of one module version.
    ///
    /// # Errors
    /// Returns `RepoError::NotFound` if no repository has a descriptor.
    fn fetch_metadata(&self, coordinate: &Coordinate) -> Result<ModuleMetadata, RepoError>;

    /// A local file holding the designated artifact, downloading it if needed.
    ///
    /// # Errors
    /// Returns an error if no repository can deliver the artifact.
    fn fetch_artifact(&self, coordinate: &Coordinate, refresh: bool) -> Result<PathBuf, RepoError>;
}
