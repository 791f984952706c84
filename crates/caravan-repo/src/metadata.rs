//! Repository-neutral module metadata, translated from POM or Ivy descriptors.

use std::collections::BTreeSet;

use caravan_model::mapping::{ANY, DEFAULT};
use caravan_model::{ArtifactSpec, ConfigurationMapping, Coordinate, Exclusion, Transitivity};

/// A configuration a module exposes, with the configurations it extends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationDef {
    pub name: String,
    pub extends: Vec<String>,
}

impl ConfigurationDef {
    pub fn new(name: &str, extends: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            extends: extends.iter().map(|e| (*e).to_owned()).collect(),
        }
    }
}

/// One dependency edge declared by a published module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDependency {
    pub coordinate: Coordinate,
    /// Left side names this module's configurations, right side the target's.
    pub mapping: ConfigurationMapping,
    pub exclusions: Vec<Exclusion>,
    /// Optional edges are never followed transitively.
    pub optional: bool,
}

/// What a repository knows about one module version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetadata {
    pub coordinate: Coordinate,
    pub configurations: Vec<ConfigurationDef>,
    pub dependencies: Vec<MetadataDependency>,
    /// Artifacts published for the module; empty for aggregate modules.
    pub artifacts: Vec<ArtifactSpec>,
}

impl ModuleMetadata {
    /// Metadata for a module publishing a single main artifact and nothing else.
    pub fn bare(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            configurations: vec![ConfigurationDef::new(DEFAULT, &[])],
            dependencies: Vec::new(),
            artifacts: vec![ArtifactSpec::default()],
        }
    }

    fn configuration(&self, name: &str) -> Option<&ConfigurationDef> {
        self.configurations.iter().find(|c| c.name == name)
    }

    /// The requested configurations plus everything they extend, limited to
    /// configurations this module declares.
    ///
    /// `*` selects every configuration. When none of the requested names is
    /// declared, `default` is used if the module has it.
    pub fn configuration_closure(&self, requested: &BTreeSet<String>) -> BTreeSet<String> {
        if requested.contains(ANY) {
            return self.configurations.iter().map(|c| c.name.clone()).collect();
        }

        let mut closure = BTreeSet::new();
        let mut pending: Vec<&str> = requested
            .iter()
            .map(String::as_str)
            .filter(|name| self.configuration(name).is_some())
            .collect();
        if pending.is_empty() && self.configuration(DEFAULT).is_some() {
            pending.push(DEFAULT);
        }

        while let Some(name) = pending.pop() {
            if !closure.insert(name.to_owned()) {
                continue;
            }
            if let Some(def) = self.configuration(name) {
                pending.extend(def.extends.iter().map(String::as_str));
            }
        }
        closure
    }

    /// Edges to follow when this module is pulled for `requested`
    /// configurations, each with the target configurations to pull from it.
    ///
    /// Optional edges and edges whose mapping is inactive are left out.
    pub fn dependencies_for(
        &self,
        requested: &BTreeSet<String>,
    ) -> Vec<(&MetadataDependency, BTreeSet<String>)> {
        let active = self.configuration_closure(requested);
        let fallback = Transitivity::Runtime.right_configurations();
        self.dependencies
            .iter()
            .filter(|dep| !dep.optional)
            .filter_map(|dep| {
                let targets = dep.mapping.targets_for(&active, &fallback);
                (!targets.is_empty()).then_some((dep, targets))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    fn maven_like() -> ModuleMetadata {
        let dep = |coord: &str, mapping: &str| MetadataDependency {
            coordinate: Coordinate::parse(coord).unwrap(),
            mapping: ConfigurationMapping::parse(Some(mapping)).unwrap(),
            exclusions: Vec::new(),
            optional: false,
        };
        ModuleMetadata {
            coordinate: Coordinate::parse("org:app:1.0").unwrap(),
            configurations: vec![
                ConfigurationDef::new("master", &[]),
                ConfigurationDef::new("compile", &[]),
                ConfigurationDef::new("runtime", &["compile"]),
                ConfigurationDef::new("default", &["runtime", "master"]),
                ConfigurationDef::new("test", &["runtime"]),
            ],
            dependencies: vec![
                dep("org:api:1.0", "compile -> compile,master; runtime -> runtime"),
                dep("org:impl:1.0", "runtime -> compile,runtime,master"),
                MetadataDependency {
                    optional: true,
                    ..dep("org:extra:1.0", "compile -> compile,master")
                },
            ],
            artifacts: vec![ArtifactSpec::default()],
        }
    }

    #[test]
    fn closure_follows_extends() {
        let meta = maven_like();
        assert_eq!(
            meta.configuration_closure(&set(&["default"])),
            set(&["compile", "default", "master", "runtime"])
        );
        assert_eq!(meta.configuration_closure(&set(&["master"])), set(&["master"]));
    }

    #[test]
    fn closure_ignores_unknown_and_falls_back_to_default() {
        let meta = maven_like();
        assert_eq!(
            meta.configuration_closure(&set(&["sources"])),
            set(&["compile", "default", "master", "runtime"])
        );
        let bare = ModuleMetadata::bare(Coordinate::parse("org:b:1.0").unwrap());
        assert_eq!(bare.configuration_closure(&set(&["runtime"])), set(&["default"]));
    }

    #[test]
    fn closure_star_selects_everything() {
        assert_eq!(maven_like().configuration_closure(&set(&["*"])).len(), 5);
    }

    #[test]
    fn compile_request_skips_runtime_only_edges() {
        let meta = maven_like();
        let deps = meta.dependencies_for(&set(&["master", "compile"]));
        let names: Vec<&str> = deps
            .iter()
            .map(|(d, _)| d.coordinate.module().name())
            .collect();
        assert_eq!(names, vec!["api"]);
        assert_eq!(deps[0].1, set(&["compile", "master"]));
    }

    #[test]
    fn runtime_request_follows_runtime_edges_but_not_optional() {
        let meta = maven_like();
        let deps = meta.dependencies_for(&set(&["master", "compile", "runtime"]));
        let names: Vec<&str> = deps
            .iter()
            .map(|(d, _)| d.coordinate.module().name())
            .collect();
        assert_eq!(names, vec!["api", "impl"]);
        assert_eq!(deps[0].1, set(&["compile", "master", "runtime"]));
    }

    #[test]
    fn master_only_request_has_no_edges() {
        assert!(maven_like().dependencies_for(&set(&["master"])).is_empty());
    }
}
