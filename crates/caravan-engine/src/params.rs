//! Per-call resolution parameters.

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// How a winner is picked among versions of one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConflictStrategy {
    /// Smallest depth from the root wins.
    #[default]
    Nearest,
    /// Highest version wins.
    Latest,
    /// Version provider entries win over transitive candidates.
    Forced,
}

impl FromStr for ConflictStrategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "latest" => Ok(Self::Latest),
            "forced" => Ok(Self::Forced),
            _ => Err(EngineError::UnknownStrategy {
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nearest => "nearest",
            Self::Latest => "latest",
            Self::Forced => "forced",
        })
    }
}

/// Knobs for one resolution call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionParameters {
    pub strategy: ConflictStrategy,
    /// Download artifacts again even when cached.
    pub refresh: bool,
    /// Trace traversal and conflict decisions at verbose level.
    pub verbose: bool,
    /// Turn resolution problems and missing artifacts into an error.
    pub fail_fast: bool,
}

impl ResolutionParameters {
    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Latest".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Latest);
        assert_eq!(" forced ".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Forced);
        let err = "newest".parse::<ConflictStrategy>().unwrap_err().to_string();
        assert!(err.contains("unknown conflict strategy"), "error was: {err}");
    }

    #[test]
    fn defaults_are_best_effort_nearest() {
        let params = ResolutionParameters::default();
        assert_eq!(params.strategy, ConflictStrategy::Nearest);
        assert!(!params.fail_fast);
        assert!(!params.refresh);
        assert!(params.with_fail_fast(true).fail_fast);
    }
}
