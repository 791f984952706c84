//! A single declared dependency edge.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::coordinate::Coordinate;
use crate::error::ModelError;
use crate::mapping::{ConfigurationMapping, COMPILE, MASTER, RUNTIME};
use crate::module_id::{ModuleId, WILDCARD};

/// A module pattern pruned from the subtree of the edge that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exclusion(ModuleId);

impl Exclusion {
    pub fn new(pattern: ModuleId) -> Self {
        Self(pattern)
    }

    /// Exclude every module of `group`.
    pub fn of_group(group: &str) -> Self {
        Self(ModuleId::new(group, WILDCARD))
    }

    /// Parse a `"group:name"` pattern where either part may be `*`.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidCoordinate` when the pattern is not two
    /// non-empty colon-separated parts.
    pub fn parse(pattern: &str) -> Result<Self, ModelError> {
        ModuleId::parse(pattern).map(Self)
    }

    pub fn pattern(&self) -> &ModuleId {
        &self.0
    }

    pub fn matches(&self, module: &ModuleId) -> bool {
        self.0.matches(module)
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How much of a module's graph an unmapped edge pulls in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transitivity {
    /// Only the module's own artifacts.
    None,
    /// What the module needs to compile against it.
    Compile,
    /// Everything the module needs at runtime.
    #[default]
    Runtime,
}

impl Transitivity {
    /// Target configurations used when a clause has no right side.
    pub fn right_configurations(self) -> BTreeSet<String> {
        let names: &[&str] = match self {
            Self::None => &[MASTER],
            Self::Compile => &[MASTER, COMPILE],
            Self::Runtime => &[MASTER, COMPILE, RUNTIME],
        };
        names.iter().map(|name| (*name).to_owned()).collect()
    }
}

/// Files produced outside of any repository, possibly by another build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComputedDependency {
    pub description: String,
    pub files: Vec<PathBuf>,
}

/// What a declaration points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyTarget {
    Module(Coordinate),
    Files(Vec<PathBuf>),
    Computed(ComputedDependency),
}

/// One declared edge: a target plus how it is qualified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyDeclaration {
    target: DependencyTarget,
    mapping: ConfigurationMapping,
    exclusions: Vec<Exclusion>,
    transitivity: Transitivity,
}

impl DependencyDeclaration {
    fn with_target(target: DependencyTarget) -> Self {
        Self {
            target,
            mapping: ConfigurationMapping::default(),
            exclusions: Vec::new(),
            transitivity: Transitivity::default(),
        }
    }

    pub fn module(coordinate: Coordinate) -> Self {
        Self::with_target(DependencyTarget::Module(coordinate))
    }

    /// Shorthand for `module(Coordinate::parse(coordinate)?)`.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidCoordinate` for a malformed coordinate.
    pub fn parse(coordinate: &str) -> Result<Self, ModelError> {
        Coordinate::parse(coordinate).map(Self::module)
    }

    pub fn files(files: Vec<PathBuf>) -> Self {
        Self::with_target(DependencyTarget::Files(files))
    }

    pub fn computed(description: &str, files: Vec<PathBuf>) -> Self {
        Self::with_target(DependencyTarget::Computed(ComputedDependency {
            description: description.to_owned(),
            files,
        }))
    }

    pub fn with_mapping(mut self, mapping: ConfigurationMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Parse and attach a mapping expression.
    ///
    /// # Errors
    /// Returns `ModelError::MappingSyntax` for a malformed expression.
    pub fn mapped(self, expression: &str) -> Result<Self, ModelError> {
        Ok(self.with_mapping(ConfigurationMapping::parse(Some(expression))?))
    }

    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        if !self.exclusions.contains(&exclusion) {
            self.exclusions.push(exclusion);
        }
        self
    }

    pub fn with_transitivity(mut self, transitivity: Transitivity) -> Self {
        self.transitivity = transitivity;
        self
    }

    pub fn target(&self) -> &DependencyTarget {
        &self.target
    }

    pub fn mapping(&self) -> &ConfigurationMapping {
        &self.mapping
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    pub fn transitivity(&self) -> Transitivity {
        self.transitivity
    }

    pub fn coordinate(&self) -> Option<&Coordinate> {
        match &self.target {
            DependencyTarget::Module(coordinate) => Some(coordinate),
            DependencyTarget::Files(_) | DependencyTarget::Computed(_) => None,
        }
    }

    /// `true` if one of this edge's exclusions matches `module`.
    pub fn excludes(&self, module: &ModuleId) -> bool {
        self.exclusions.iter().any(|e| e.matches(module))
    }

    /// Target configurations this edge pulls when the root resolves `active`.
    pub fn target_configurations(&self, active: &BTreeSet<String>) -> BTreeSet<String> {
        self.mapping
            .targets_for(active, &self.transitivity.right_configurations())
    }

    pub(crate) fn replace_target(&self, target: DependencyTarget) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            DependencyTarget::Module(coordinate) => write!(f, "{coordinate}")?,
            DependencyTarget::Files(files) => write!(f, "files ({})", files.len())?,
            DependencyTarget::Computed(computed) => write!(f, "computed {}", computed.description)?,
        }
        if !self.mapping.is_empty() {
            write!(f, " ({})", self.mapping)?;
        }
        Ok(())
    }
}
