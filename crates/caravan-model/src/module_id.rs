//! `group:name` module identifiers.

use std::fmt;
use std::str::FromStr;

use crate::coordinate::Coordinate;
use crate::error::ModelError;
use crate::version::Version;

/// Matches any group or any name when used in an exclusion pattern.
pub const WILDCARD: &str = "*";

/// Identifies a module irrespective of its version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    group: String,
    name: String,
}

impl ModuleId {
    /// Create a module id from its two parts. Parts are trimmed.
    pub fn new(group: &str, name: &str) -> Self {
        Self {
            group: group.trim().to_owned(),
            name: name.trim().to_owned(),
        }
    }

    /// Parse a `"group:name"` string.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidCoordinate` when the string does not split
    /// into exactly two non-empty parts.
    pub fn parse(value: &str) -> Result<Self, ModelError> {
        let parts: Vec<&str> = value.trim().split(':').collect();
        let (Some(group), Some(name), None) = (parts.first(), parts.get(1), parts.get(2)) else {
            return Err(ModelError::InvalidCoordinate {
                coordinate: value.to_owned(),
                reason: format!(
                    "expected exactly 2 colon-separated parts (group:name), got {}",
                    parts.len()
                ),
            });
        };
        if group.trim().is_empty() {
            return Err(invalid(value, "group is empty"));
        }
        if name.trim().is_empty() {
            return Err(invalid(value, "name is empty"));
        }
        if value.trim().contains(char::is_whitespace) {
            return Err(invalid(value, "whitespace is not allowed"));
        }
        Ok(Self::new(group, name))
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` if this id, read as a pattern, matches `candidate`.
    ///
    /// A `*` group or name matches any value; other parts compare exactly.
    pub fn matches(&self, candidate: &ModuleId) -> bool {
        (self.group == WILDCARD || self.group == candidate.group)
            && (self.name == WILDCARD || self.name == candidate.name)
    }

    /// Build a coordinate of this module at the given version.
    pub fn at(&self, version: Version) -> Coordinate {
        Coordinate::new(self.clone(), version)
    }

    /// The repository path of the group: dots become `/`.
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }
}

fn invalid(value: &str, reason: &str) -> ModelError {
    ModelError::InvalidCoordinate {
        coordinate: value.to_owned(),
        reason: reason.to_owned(),
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

impl FromStr for ModuleId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
