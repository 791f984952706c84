//! Version overrides keyed by module, used to fill in missing versions.

use std::fmt;

use crate::coordinate::Coordinate;
use crate::module_id::{ModuleId, WILDCARD};
use crate::version::Version;

/// An ordered `ModuleId -> Version` map.
///
/// Entries whose name ends in `*` (`group:*`, `group:prefix*`) match any
/// module of that group whose name starts with the prefix. Exact entries take
/// precedence over wildcard ones; among wildcards the longest prefix wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VersionProvider {
    entries: Vec<(ModuleId, Version)>,
}

impl VersionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a provider with `module` pinned to `version`, replacing any
    /// previous entry for the same key.
    pub fn and(&self, module: ModuleId, version: Version) -> Self {
        let mut next = self.clone();
        next.insert(module, version);
        next
    }

    fn insert(&mut self, module: ModuleId, version: Version) {
        match self.entries.iter_mut().find(|(key, _)| *key == module) {
            Some((_, existing)) => *existing = version,
            None => self.entries.push((module, version)),
        }
    }

    /// Entries of `other` override entries of `self` with the same key.
    pub fn merge(&self, other: &VersionProvider) -> Self {
        let mut next = self.clone();
        for (module, version) in &other.entries {
            next.insert(module.clone(), version.clone());
        }
        next
    }

    pub fn version_of(&self, module: &ModuleId) -> Option<&Version> {
        if let Some((_, version)) = self.entries.iter().find(|(key, _)| key == module) {
            return Some(version);
        }
        self.entries
            .iter()
            .filter_map(|(key, version)| {
                let prefix = key.name().strip_suffix('*')?;
                let group_matches = key.group() == WILDCARD || key.group() == module.group();
                (group_matches && module.name().starts_with(prefix))
                    .then_some((prefix.len(), version))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, version)| version)
    }

    /// Fill in the version of `coordinate` when it is unspecified.
    pub fn apply(&self, coordinate: &Coordinate) -> Coordinate {
        let version = mediate(
            Some(coordinate.version()),
            self.version_of(coordinate.module()),
        );
        coordinate.with_version(version)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &Version)> {
        self.entries.iter().map(|(module, version)| (module, version))
    }
}

impl FromIterator<(ModuleId, Version)> for VersionProvider {
    fn from_iter<I: IntoIterator<Item = (ModuleId, Version)>>(iter: I) -> Self {
        let mut provider = Self::new();
        for (module, version) in iter {
            provider.insert(module, version);
        }
        provider
    }
}

impl fmt::Display for VersionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .entries
            .iter()
            .map(|(module, version)| format!("{module}={version}"))
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

/// Pick the version to use for an edge: an explicit declared version always
/// stands, and `override_version` only fills in a missing one.
pub fn mediate(declared: Option<&Version>, override_version: Option<&Version>) -> Version {
    match (declared, override_version) {
        (Some(declared), _) if !declared.is_unspecified() => declared.clone(),
        (_, Some(override_version)) => override_version.clone(),
        (Some(declared), None) => declared.clone(),
        (None, None) => Version::default(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> ModuleId {
        ModuleId::parse(s).unwrap()
    }

    #[test]
    fn exact_entry_wins_over_wildcard() {
        let provider = VersionProvider::new()
            .and(id("org.jetbrains:*"), Version::new("1.0"))
            .and(id("org.jetbrains:annotations"), Version::new("24.0"));
        assert_eq!(
            provider.version_of(&id("org.jetbrains:annotations")),
            Some(&Version::new("24.0"))
        );
        assert_eq!(
            provider.version_of(&id("org.jetbrains:other")),
            Some(&Version::new("1.0"))
        );
        assert_eq!(provider.version_of(&id("com.other:lib")), None);
    }

    #[test]
    fn longest_wildcard_prefix_wins() {
        let provider = VersionProvider::new()
            .and(id("io.netty:*"), Version::new("4.0"))
            .and(id("io.netty:netty-codec*"), Version::new("4.1"));
        assert_eq!(
            provider.version_of(&id("io.netty:netty-codec-http")),
            Some(&Version::new("4.1"))
        );
        assert_eq!(
            provider.version_of(&id("io.netty:netty-buffer")),
            Some(&Version::new("4.0"))
        );
    }

    #[test]
    fn and_replaces_existing_key() {
        let provider = VersionProvider::new()
            .and(id("org:lib"), Version::new("1.0"))
            .and(id("org:lib"), Version::new("2.0"));
        assert_eq!(provider.len(), 1);
        assert_eq!(provider.version_of(&id("org:lib")), Some(&Version::new("2.0")));
    }

    #[test]
    fn merge_right_side_overrides() {
        let left = VersionProvider::new()
            .and(id("org:a"), Version::new("1.0"))
            .and(id("org:b"), Version::new("1.0"));
        let right = VersionProvider::new().and(id("org:b"), Version::new("2.0"));
        let merged = left.merge(&right);
        assert_eq!(merged.version_of(&id("org:a")), Some(&Version::new("1.0")));
        assert_eq!(merged.version_of(&id("org:b")), Some(&Version::new("2.0")));
        // The original is untouched.
        assert_eq!(left.version_of(&id("org:b")), Some(&Version::new("1.0")));
    }

    #[test]
    fn apply_only_fills_unspecified_versions() {
        let provider = VersionProvider::new().and(id("org:lib"), Version::new("3.0"));
        let unspecified = Coordinate::parse("org:lib").unwrap();
        let explicit = Coordinate::parse("org:lib:1.0").unwrap();
        assert_eq!(provider.apply(&unspecified).version().as_str(), "3.0");
        assert_eq!(provider.apply(&explicit).version().as_str(), "1.0");
    }

    #[test]
    fn mediate_rules() {
        let one = Version::new("1.0");
        let two = Version::new("2.0");
        let unspecified = Version::default();
        assert_eq!(mediate(Some(&one), Some(&two)), one);
        assert_eq!(mediate(Some(&unspecified), Some(&two)), two);
        assert_eq!(mediate(None, Some(&two)), two);
        assert_eq!(mediate(Some(&one), None), one);
        assert!(mediate(None, None).is_unspecified());
    }
}
