//! Version strings, their ordering, and version ranges.

use std::cmp::Ordering;
use std::fmt;

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";
const LATEST_PREFIX: &str = "latest.";
const UNSPECIFIED_MARKER: &str = "?";

/// A module version.
///
/// Holds the trimmed version string. Equality is string equality. Ordering
/// splits the string into alphanumeric segments: numbers compare numerically,
/// words compare case-insensitively, a missing segment sorts lower, and
/// snapshot or dynamic versions sort below the release sharing their segments.
/// Ties left by those rules fall back to the raw string, so the order is total
/// and agrees with `==`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version(String);

impl Version {
    /// Create a version. `"?"` and blank strings are the unspecified version.
    pub fn new(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed == UNSPECIFIED_MARKER {
            return Self::unspecified();
        }
        Self(trimmed.to_owned())
    }

    /// The unspecified sentinel: a declaration that carries no version.
    pub fn unspecified() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unspecified(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_snapshot(&self) -> bool {
        ends_with_ignore_case(&self.0, SNAPSHOT_SUFFIX)
    }

    /// `true` for `1.+`, `latest.release`, and version ranges.
    pub fn is_dynamic(&self) -> bool {
        self.0.ends_with('+') || self.0.starts_with(LATEST_PREFIX) || self.is_range()
    }

    pub fn is_range(&self) -> bool {
        self.range().is_some()
    }

    /// Parse this version as a range, if it is one.
    pub fn range(&self) -> Option<VersionRange> {
        VersionRange::parse(&self.0)
    }

    /// `true` if the concrete `candidate` satisfies this (possibly dynamic) version.
    ///
    /// Fixed versions accept only themselves. Dynamic versions never accept
    /// snapshots, except `latest.integration`.
    pub fn accepts(&self, candidate: &Version) -> bool {
        if let Some(range) = self.range() {
            return !candidate.is_snapshot() && range.contains(candidate);
        }
        if let Some(prefix) = self.0.strip_suffix('+') {
            return !candidate.is_snapshot() && candidate.0.starts_with(prefix);
        }
        match self.0.as_str() {
            "latest.integration" => !candidate.is_unspecified(),
            "latest.release" => !candidate.is_unspecified() && !candidate.is_snapshot(),
            _ => self == candidate,
        }
    }

    fn sort_key(&self) -> SortKey {
        let mut body = self.0.as_str();
        let mut release = true;
        if ends_with_ignore_case(body, SNAPSHOT_SUFFIX) {
            body = body.get(..body.len() - SNAPSHOT_SUFFIX.len()).unwrap_or_default();
            release = false;
        } else if let Some(stripped) = body.strip_suffix('+') {
            body = stripped;
            release = false;
        } else if body.starts_with(LATEST_PREFIX) || body.is_empty() || self.is_range() {
            release = false;
        }
        if body.starts_with(LATEST_PREFIX) {
            body = "";
        }
        SortKey {
            segments: segments(body),
            release,
        }
    }
}

fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    value.len() >= suffix.len()
        && value
            .get(value.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    segments: Vec<Segment>,
    release: bool,
}

/// Variant order matters: words sort below numbers.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Word(String),
    /// Digits without leading zeros, compared by length first.
    Number { len: usize, digits: String },
}

fn segments(body: &str) -> Vec<Segment> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    let mut flush = |current: &mut String, is_digit: bool| {
        if current.is_empty() {
            return;
        }
        let segment = if is_digit {
            let stripped = current.trim_start_matches('0');
            let digits = if stripped.is_empty() { "0" } else { stripped };
            Segment::Number {
                len: digits.len(),
                digits: digits.to_owned(),
            }
        } else {
            Segment::Word(current.to_ascii_lowercase())
        };
        result.push(segment);
        current.clear();
    };

    for c in body.chars() {
        if !c.is_ascii_alphanumeric() {
            flush(&mut current, current_is_digit);
            continue;
        }
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            flush(&mut current, current_is_digit);
        }
        current_is_digit = is_digit;
        current.push(c);
    }
    flush(&mut current, current_is_digit);
    result
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            f.write_str(UNSPECIFIED_MARKER)
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A Maven-style version range such as `[1.0,2.0)` or `[1.5]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Option<Version>,
    pub lower_inclusive: bool,
    pub upper: Option<Version>,
    pub upper_inclusive: bool,
}

impl VersionRange {
    /// Parse `[a,b]`, `(a,b)`, `[a,)`, `(,b]` or `[a]`. Returns `None` for
    /// anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let lower_inclusive = match value.chars().next()? {
            '[' => true,
            '(' => false,
            _ => return None,
        };
        let upper_inclusive = match value.chars().last()? {
            ']' => true,
            ')' => false,
            _ => return None,
        };
        let inner = value.get(1..value.len().checked_sub(1)?)?;
        let bound = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| Version::new(s))
        };

        match inner.split_once(',') {
            Some((lo, hi)) => {
                if hi.contains(',') {
                    return None;
                }
                let lower = bound(lo);
                let upper = bound(hi);
                if lower.is_none() && upper.is_none() {
                    return None;
                }
                Some(Self {
                    lower,
                    lower_inclusive,
                    upper,
                    upper_inclusive,
                })
            }
            None => {
                // `[1.5]` pins a single version.
                if !(lower_inclusive && upper_inclusive) {
                    return None;
                }
                let exact = bound(inner)?;
                Some(Self {
                    lower: Some(exact.clone()),
                    lower_inclusive: true,
                    upper: Some(exact),
                    upper_inclusive: true,
                })
            }
        }
    }

    pub fn contains(&self, version: &Version) -> bool {
        let above_lower = match &self.lower {
            Some(lower) if self.lower_inclusive => version >= lower,
            Some(lower) => version > lower,
            None => true,
        };
        let below_upper = match &self.upper {
            Some(upper) if self.upper_inclusive => version <= upper,
            Some(upper) => version < upper,
            None => true,
        };
        above_lower && below_upper
    }
}
