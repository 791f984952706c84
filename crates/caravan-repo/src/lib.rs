#![forbid(unsafe_code)]
//! Repository access: module metadata, version listings, and artifact files.

pub mod access;
pub mod backend;
pub mod error;
pub mod ivy;
pub mod metadata;
pub mod pom;
pub mod set;

pub use access::RepositoryAccess;
pub use backend::{Endpoint, Layout, RepositoryBackend};
pub use error::RepoError;
pub use metadata::{ConfigurationDef, MetadataDependency, ModuleMetadata};
pub use set::RepositorySet;
