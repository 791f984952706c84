//! Picking one version per module among the candidates a traversal found.

use caravan_model::{ModuleId, Version, VersionProvider};

use crate::params::ConflictStrategy;

/// One version of a module reached during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub module: ModuleId,
    pub version: Version,
    /// Distance from the root; root declarations are at depth 0.
    pub depth: usize,
}

impl Candidate {
    pub fn new(module: ModuleId, version: Version, depth: usize) -> Self {
        Self {
            module,
            version,
            depth,
        }
    }
}

/// Applies a [`ConflictStrategy`] to the candidates of a single module.
#[derive(Debug, Clone)]
pub struct ConflictResolver<'a> {
    strategy: ConflictStrategy,
    provider: &'a VersionProvider,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(strategy: ConflictStrategy, provider: &'a VersionProvider) -> Self {
        Self { strategy, provider }
    }

    /// The winning version among `candidates`, given in first-seen order.
    ///
    /// Ties left by the strategy go to the higher version and then to the
    /// candidate seen first. Returns `None` for an empty slice.
    pub fn resolve(&self, candidates: &[Candidate]) -> Option<Version> {
        match self.strategy {
            ConflictStrategy::Latest => latest(candidates),
            ConflictStrategy::Nearest => nearest(candidates),
            ConflictStrategy::Forced => {
                let direct = candidates.iter().any(|c| c.depth == 0);
                let forced = candidates
                    .first()
                    .and_then(|c| self.provider.version_of(&c.module));
                match forced {
                    Some(version) if !direct => Some(version.clone()),
                    _ => nearest(candidates),
                }
            }
        }
    }
}

fn latest(candidates: &[Candidate]) -> Option<Version> {
    let mut best: Option<&Candidate> = None;
    for candidate in candidates {
        if best.is_none_or(|b| candidate.version > b.version) {
            best = Some(candidate);
        }
    }
    best.map(|c| c.version.clone())
}

fn nearest(candidates: &[Candidate]) -> Option<Version> {
    let depth = candidates.iter().map(|c| c.depth).min()?;
    let closest: Vec<Candidate> = candidates
        .iter()
        .filter(|c| c.depth == depth)
        .cloned()
        .collect();
    latest(&closest)
}
