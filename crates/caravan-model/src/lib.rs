#![forbid(unsafe_code)]
//! Module identifiers, versions, coordinates, and dependency declarations.

pub mod coordinate;
pub mod declaration;
pub mod error;
pub mod mapping;
pub mod module_id;
pub mod provider;
pub mod set;
pub mod version;

pub use coordinate::{ArtifactSpec, Coordinate};
pub use declaration::{
    ComputedDependency, DependencyDeclaration, DependencyTarget, Exclusion, Transitivity,
};
pub use error::ModelError;
pub use mapping::{ConfigurationMapping, MappingClause};
pub use module_id::ModuleId;
pub use provider::VersionProvider;
pub use set::DependencySet;
pub use version::{Version, VersionRange};
