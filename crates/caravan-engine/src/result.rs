//! What a resolution call hands back.

use std::fmt;
use std::path::PathBuf;

use caravan_model::{Coordinate, ModuleId, Version};

use crate::container::ArtifactContainer;
use crate::error::EngineError;
use crate::tree::DependencyTree;

/// Something that went wrong without failing the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// An artifact of a resolved module could not be fetched.
    MissingArtifact { coordinate: Coordinate, reason: String },
    /// A file declared on the root does not exist.
    MissingFile { path: PathBuf },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArtifact { coordinate, reason } => {
                write!(f, "missing artifact {coordinate}: {reason}")
            }
            Self::MissingFile { path } => write!(f, "missing file {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveResult {
    tree: DependencyTree,
    artifacts: ArtifactContainer,
    problems: Vec<String>,
    warnings: Vec<ResolveWarning>,
}

impl ResolveResult {
    pub fn new(
        tree: DependencyTree,
        artifacts: ArtifactContainer,
        problems: Vec<String>,
        warnings: Vec<ResolveWarning>,
    ) -> Self {
        Self {
            tree,
            artifacts,
            problems,
            warnings,
        }
    }

    pub fn dependency_tree(&self) -> &DependencyTree {
        &self.tree
    }

    /// The flat classpath: every file in tree order, each once.
    pub fn files(&self) -> Vec<PathBuf> {
        self.tree.files()
    }

    /// Files of the resolved version of `module`.
    pub fn files_for(&self, module: &ModuleId) -> Vec<PathBuf> {
        self.tree
            .first(module)
            .map(|node| self.artifacts.artifacts(&node.coordinate))
            .unwrap_or_default()
    }

    pub fn version_of(&self, module: &ModuleId) -> Option<&Version> {
        self.tree.first(module).map(|node| node.version())
    }

    pub fn contains(&self, module: &ModuleId) -> bool {
        self.tree.contains(module)
    }

    pub fn artifacts(&self) -> &ArtifactContainer {
        &self.artifacts
    }

    /// Unresolved modules, versions, and dynamic versions.
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn warnings(&self) -> &[ResolveWarning] {
        &self.warnings
    }

    /// # Errors
    /// Returns `EngineError::Resolution` listing every recorded problem.
    pub fn assert_no_error(&self) -> Result<(), EngineError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Resolution {
                problems: self.problems.clone(),
            })
        }
    }

    /// Both results side by side; `other`'s roots follow this one's.
    pub fn merge(&self, other: &ResolveResult) -> Self {
        let roots = self
            .tree
            .roots()
            .iter()
            .chain(other.tree.roots())
            .cloned()
            .collect();
        let mut problems = self.problems.clone();
        for problem in &other.problems {
            if !problems.contains(problem) {
                problems.push(problem.clone());
            }
        }
        let mut warnings = self.warnings.clone();
        warnings.extend(other.warnings.iter().cloned());
        Self {
            tree: DependencyTree::new(self.tree.configuration(), roots),
            artifacts: self.artifacts.merge(&other.artifacts),
            problems,
            warnings,
        }
    }
}
