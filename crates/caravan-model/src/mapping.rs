//! Configuration mappings: `"compile -> compile,runtime; test -> runtime"`.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ModelError;

/// Configuration every unqualified dependency is declared in.
pub const DEFAULT: &str = "default";
/// A module's own artifacts, without its dependencies.
pub const MASTER: &str = "master";
pub const COMPILE: &str = "compile";
pub const RUNTIME: &str = "runtime";
pub const TEST: &str = "test";
pub const PROVIDED: &str = "provided";
/// Matches every configuration on either side of a clause.
pub const ANY: &str = "*";

const ARROW: &str = "->";

/// One `left -> right` clause.
///
/// An empty left side means the declaration is unqualified; an empty right
/// side means "use the declaration's default target configurations".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingClause {
    pub left: BTreeSet<String>,
    pub right: BTreeSet<String>,
}

impl MappingClause {
    /// Build a clause from configuration names.
    pub fn of<'a>(
        left: impl IntoIterator<Item = &'a str>,
        right: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            left: left.into_iter().map(str::to_owned).collect(),
            right: right.into_iter().map(str::to_owned).collect(),
        }
    }

    /// Parse a single clause. `None` or a blank string yields an empty clause.
    ///
    /// # Errors
    /// Returns `ModelError::MappingSyntax` when the clause holds more than one
    /// `->`, or an arrow with nothing on one of its sides.
    pub fn parse(expression: Option<&str>) -> Result<Self, ModelError> {
        let Some(expression) = expression else {
            return Ok(Self::default());
        };
        let pieces: Vec<&str> = expression.split(ARROW).collect();
        match pieces.as_slice() {
            [left] => Ok(Self {
                left: names(left),
                right: BTreeSet::new(),
            }),
            [left, right] => {
                let (left, right) = (names(left), names(right));
                if left.is_empty() {
                    return Err(syntax(expression, "no configuration before `->`"));
                }
                if right.is_empty() {
                    return Err(syntax(expression, "no configuration after `->`"));
                }
                Ok(Self { left, right })
            }
            _ => Err(syntax(expression, "more than one `->` in a clause")),
        }
    }

    /// `true` if this clause's left side is active for `active` configurations.
    /// An empty left side stands for `default`.
    pub fn applies_to(&self, active: &BTreeSet<String>) -> bool {
        if self.left.is_empty() {
            return active.contains(DEFAULT) || active.contains(ANY);
        }
        self.left.contains(ANY)
            || active.contains(ANY)
            || self.left.iter().any(|name| active.contains(name))
    }
}

/// Split a comma-separated list, dropping blanks and Ivy fallback suffixes
/// such as `runtime(default)`.
fn names(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|name| {
            let name = name.trim();
            name.split_once('(').map_or(name, |(base, _)| base.trim())
        })
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

fn syntax(expression: &str, reason: &str) -> ModelError {
    ModelError::MappingSyntax {
        expression: expression.to_owned(),
        reason: reason.to_owned(),
    }
}

impl fmt::Display for MappingClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(",");
        if self.right.is_empty() {
            return f.write_str(&join(&self.left));
        }
        write!(f, "{} -> {}", join(&self.left), join(&self.right))
    }
}

/// An ordered list of clauses, as written in a `;`-separated expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigurationMapping {
    clauses: Vec<MappingClause>,
}

impl ConfigurationMapping {
    /// Parse a `;`-separated mapping expression. `None`, a blank string, and
    /// blank clauses yield no clauses.
    ///
    /// # Errors
    /// Returns `ModelError::MappingSyntax` if any clause is malformed.
    pub fn parse(expression: Option<&str>) -> Result<Self, ModelError> {
        let Some(expression) = expression else {
            return Ok(Self::default());
        };
        let clauses = expression
            .split(';')
            .filter(|clause| !clause.trim().is_empty())
            .map(|clause| MappingClause::parse(Some(clause)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    pub fn of(clauses: Vec<MappingClause>) -> Self {
        Self { clauses }
    }

    pub fn clauses(&self) -> &[MappingClause] {
        &self.clauses
    }

    /// `true` for an unqualified declaration.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Target configurations to pull when the consumer resolves `active`.
    ///
    /// Clauses whose left side is active contribute their right side, or
    /// `default_right` when they do not name one. No clauses behaves like a
    /// single empty clause.
    pub fn targets_for(
        &self,
        active: &BTreeSet<String>,
        default_right: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        let unqualified = [MappingClause::default()];
        let clauses = if self.clauses.is_empty() {
            unqualified.as_slice()
        } else {
            self.clauses.as_slice()
        };

        let mut targets = BTreeSet::new();
        for clause in clauses.iter().filter(|clause| clause.applies_to(active)) {
            if clause.right.is_empty() {
                targets.extend(default_right.iter().cloned());
            } else {
                targets.extend(clause.right.iter().cloned());
            }
        }
        targets
    }

    /// Clauses merged by left-side configuration name.
    pub fn by_configuration(&self) -> Vec<(String, BTreeSet<String>)> {
        let mut merged: Vec<(String, BTreeSet<String>)> = Vec::new();
        for clause in &self.clauses {
            for left in &clause.left {
                match merged.iter_mut().find(|(name, _)| name == left) {
                    Some((_, right)) => right.extend(clause.right.iter().cloned()),
                    None => merged.push((left.clone(), clause.right.clone())),
                }
            }
        }
        merged
    }
}

impl fmt::Display for ConfigurationMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.clauses.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join("; "))
    }
}

/// The configurations active on the root when resolving `configuration`.
///
/// `test` includes `runtime`, which includes `compile`; `provided` includes
/// `compile`. Every closure includes `default`, so unqualified declarations
/// take part in every resolution.
pub fn resolved_closure(configuration: &str) -> BTreeSet<String> {
    let names: &[&str] = match configuration.trim() {
        TEST => &[TEST, RUNTIME, COMPILE],
        RUNTIME => &[RUNTIME, COMPILE],
        PROVIDED => &[PROVIDED, COMPILE],
        COMPILE => &[COMPILE],
        other => return [other, DEFAULT].into_iter().map(str::to_owned).collect(),
    };
    names
        .iter()
        .copied()
        .chain([DEFAULT])
        .map(str::to_owned)
        .collect()
}
