//! Immutable dependency sets.

use crate::coordinate::Coordinate;
use crate::declaration::{DependencyDeclaration, DependencyTarget, Exclusion};
use crate::module_id::ModuleId;
use crate::provider::VersionProvider;
use crate::version::Version;

/// An ordered list of declarations plus set-wide exclusions and version
/// overrides. Every transformation returns a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DependencySet {
    declarations: Vec<DependencyDeclaration>,
    global_exclusions: Vec<Exclusion>,
    version_provider: VersionProvider,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(declarations: Vec<DependencyDeclaration>) -> Self {
        Self {
            declarations,
            ..Self::default()
        }
    }

    /// Append a declaration.
    pub fn and(&self, declaration: DependencyDeclaration) -> Self {
        let mut next = self.clone();
        next.declarations.push(declaration);
        next
    }

    /// Add `exclusion` to every module declaration of the set.
    pub fn with_exclusion(&self, exclusion: Exclusion) -> Self {
        let declarations = self
            .declarations
            .iter()
            .map(|decl| match decl.target() {
                DependencyTarget::Module(_) => decl.clone().with_exclusion(exclusion.clone()),
                DependencyTarget::Files(_) | DependencyTarget::Computed(_) => decl.clone(),
            })
            .collect();
        Self {
            declarations,
            ..self.clone()
        }
    }

    /// Exclude a module from every transitive edge. Direct declarations are
    /// never pruned by global exclusions.
    pub fn with_global_exclusion(&self, exclusion: Exclusion) -> Self {
        let mut next = self.clone();
        if !next.global_exclusions.contains(&exclusion) {
            next.global_exclusions.push(exclusion);
        }
        next
    }

    pub fn with_version_override(&self, module: ModuleId, version: Version) -> Self {
        Self {
            version_provider: self.version_provider.and(module, version),
            ..self.clone()
        }
    }

    /// Replace the set's version provider.
    pub fn with_version_provider(&self, provider: VersionProvider) -> Self {
        Self {
            version_provider: provider,
            ..self.clone()
        }
    }

    /// Concatenate declarations, union exclusions, and merge providers with
    /// `other` taking precedence.
    pub fn merge(&self, other: &DependencySet) -> Self {
        let mut next = self.clone();
        next.declarations.extend(other.declarations.iter().cloned());
        for exclusion in &other.global_exclusions {
            if !next.global_exclusions.contains(exclusion) {
                next.global_exclusions.push(exclusion.clone());
            }
        }
        next.version_provider = self.version_provider.merge(&other.version_provider);
        next
    }

    /// Module declarations with their versions filled in by the provider.
    pub fn with_versions_applied(&self) -> Self {
        let declarations = self
            .declarations
            .iter()
            .map(|decl| match decl.target() {
                DependencyTarget::Module(coordinate) => decl.replace_target(
                    DependencyTarget::Module(self.version_provider.apply(coordinate)),
                ),
                DependencyTarget::Files(_) | DependencyTarget::Computed(_) => decl.clone(),
            })
            .collect();
        Self {
            declarations,
            ..self.clone()
        }
    }

    pub fn declarations(&self) -> &[DependencyDeclaration] {
        &self.declarations
    }

    pub fn global_exclusions(&self) -> &[Exclusion] {
        &self.global_exclusions
    }

    pub fn version_provider(&self) -> &VersionProvider {
        &self.version_provider
    }

    /// Only the declarations that target a module.
    pub fn coordinate_declarations(
        &self,
    ) -> impl Iterator<Item = (&Coordinate, &DependencyDeclaration)> {
        self.declarations
            .iter()
            .filter_map(|decl| decl.coordinate().map(|coordinate| (coordinate, decl)))
    }

    /// The first declaration of `module`, if any.
    pub fn find(&self, module: &ModuleId) -> Option<&DependencyDeclaration> {
        self.coordinate_declarations()
            .find(|(coordinate, _)| coordinate.module() == module)
            .map(|(_, decl)| decl)
    }

    /// `true` if a global exclusion matches `module`.
    pub fn globally_excludes(&self, module: &ModuleId) -> bool {
        self.global_exclusions.iter().any(|e| e.matches(module))
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }
}
