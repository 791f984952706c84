//! Conflict resolution, dependency tree construction, and artifact
//! materialization for Caravan.

pub mod conflict;
pub mod container;
pub mod error;
pub mod logger;
pub mod params;
pub mod resolve;
pub mod result;
pub mod tree;

pub use conflict::{Candidate, ConflictResolver};
pub use container::{ArtifactContainer, ArtifactReport};
pub use error::EngineError;
pub use logger::{LogCrateLogger, LogLevel, Logger, MemoryLogger};
pub use params::{ConflictStrategy, ResolutionParameters};
pub use resolve::{DependencyResolver, ResolutionState};
pub use result::{ResolveResult, ResolveWarning};
pub use tree::{DependencyNode, DependencyTree, FileNode, ModuleNode};
