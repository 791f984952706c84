//! Maven POM parsing and translation into [`ModuleMetadata`].

use std::collections::BTreeMap;

use caravan_model::mapping::{COMPILE, DEFAULT, MASTER, RUNTIME, TEST};
use caravan_model::{
    ArtifactSpec, ConfigurationMapping, Coordinate, Exclusion, ModuleId, Version,
};
use roxmltree::Node;

use crate::error::RepoError;
use crate::metadata::{ConfigurationDef, MetadataDependency, ModuleMetadata};

/// How far parent and BOM chains are followed.
pub const MAX_PARENT_DEPTH: usize = 16;

const COMPILE_SCOPE_MAPPING: &str = "compile -> compile,master; runtime -> runtime";
const RUNTIME_SCOPE_MAPPING: &str = "runtime -> compile,runtime,master";
const MAX_INTERPOLATION_PASSES: usize = 8;

/// The `<parent>` reference of a POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ParentRef {
    pub fn coordinate(&self) -> Coordinate {
        ModuleId::new(&self.group_id, &self.artifact_id).at(Version::new(&self.version))
    }
}

/// A `<dependency>` entry, before interpolation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub classifier: Option<String>,
    pub kind: Option<String>,
    pub optional: bool,
    pub exclusions: Vec<(String, String)>,
}

impl PomDependency {
    fn key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.classifier.as_deref().unwrap_or_default()
        )
    }

    fn interpolated(&self, properties: &BTreeMap<String, String>) -> Self {
        let sub = |s: &str| interpolate(s, properties);
        Self {
            group_id: sub(&self.group_id),
            artifact_id: sub(&self.artifact_id),
            version: self.version.as_deref().map(sub),
            scope: self.scope.as_deref().map(sub),
            classifier: self.classifier.as_deref().map(sub),
            kind: self.kind.as_deref().map(sub),
            optional: self.optional,
            exclusions: self
                .exclusions
                .iter()
                .map(|(g, a)| (sub(g), sub(a)))
                .collect(),
        }
    }

    fn is_import(&self) -> bool {
        self.scope.as_deref() == Some("import") && self.kind.as_deref() == Some("pom")
    }
}

/// The parts of a POM that matter for dependency resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: Vec<(String, String)>,
    pub dependencies: Vec<PomDependency>,
    pub managed: Vec<PomDependency>,
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

fn parse_dependency(node: Node<'_, '_>) -> PomDependency {
    let exclusions = child(node, "exclusions")
        .map(|ex| {
            children(ex, "exclusion")
                .filter_map(|e| Some((child_text(e, "groupId")?, child_text(e, "artifactId")?)))
                .collect()
        })
        .unwrap_or_default();
    PomDependency {
        group_id: child_text(node, "groupId").unwrap_or_default(),
        artifact_id: child_text(node, "artifactId").unwrap_or_default(),
        version: child_text(node, "version"),
        scope: child_text(node, "scope"),
        classifier: child_text(node, "classifier"),
        kind: child_text(node, "type"),
        optional: child_text(node, "optional").is_some_and(|o| o.eq_ignore_ascii_case("true")),
        exclusions,
    }
}

fn dependency_list(node: Option<Node<'_, '_>>) -> Vec<PomDependency> {
    node.and_then(|n| child(n, "dependencies"))
        .map(|deps| children(deps, "dependency").map(parse_dependency).collect())
        .unwrap_or_default()
}

/// Parse a POM document. `location` is used in error messages.
///
/// # Errors
/// Returns `RepoError::InvalidMetadata` if the XML is malformed or the root
/// element is not `<project>`.
pub fn parse(xml: &str, location: &str) -> Result<Pom, RepoError> {
    let invalid = |message: String| RepoError::InvalidMetadata {
        location: location.to_owned(),
        message,
    };

    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;
    let doc = roxmltree::Document::parse_with_options(xml, options)
        .map_err(|e| invalid(e.to_string()))?;
    let project = doc.root_element();
    if project.tag_name().name() != "project" {
        return Err(invalid(format!(
            "expected <project>, found <{}>",
            project.tag_name().name()
        )));
    }

    let parent = child(project, "parent").and_then(|p| {
        Some(ParentRef {
            group_id: child_text(p, "groupId")?,
            artifact_id: child_text(p, "artifactId")?,
            version: child_text(p, "version")?,
        })
    });

    let properties = child(project, "properties")
        .map(|props| {
            props
                .children()
                .filter(Node::is_element)
                .map(|p| {
                    (
                        p.tag_name().name().to_owned(),
                        p.text().map(str::trim).unwrap_or_default().to_owned(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Pom {
        group_id: child_text(project, "groupId"),
        artifact_id: child_text(project, "artifactId")
            .ok_or_else(|| invalid("missing <artifactId>".to_owned()))?,
        version: child_text(project, "version"),
        packaging: child_text(project, "packaging"),
        parent,
        properties,
        dependencies: dependency_list(Some(project)),
        managed: dependency_list(child(project, "dependencyManagement")),
    })
}

/// Replace `${name}` placeholders from `properties`. Unknown placeholders
/// are left as written.
pub fn interpolate(value: &str, properties: &BTreeMap<String, String>) -> String {
    let mut current = value.to_owned();
    for _ in 0..MAX_INTERPOLATION_PASSES {
        let mut out = String::with_capacity(current.len());
        let mut rest = current.as_str();
        let mut changed = false;
        while let Some(start) = rest.find("${") {
            let (before, after) = rest.split_at(start);
            out.push_str(before);
            let Some(end) = after.find('}') else {
                out.push_str(after);
                rest = "";
                break;
            };
            let name = after.get(2..end).unwrap_or_default();
            match properties.get(name) {
                Some(replacement) => {
                    out.push_str(replacement);
                    changed = true;
                }
                None => out.push_str(after.get(..=end).unwrap_or_default()),
            }
            rest = after.get(end + 1..).unwrap_or_default();
        }
        out.push_str(rest);
        current = out;
        if !changed {
            break;
        }
    }
    current
}

/// Parse the `<versioning><versions>` list of a `maven-metadata.xml`.
///
/// # Errors
/// Returns `RepoError::InvalidMetadata` if the XML is malformed.
pub fn parse_versions(xml: &str, location: &str) -> Result<Vec<Version>, RepoError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| RepoError::InvalidMetadata {
        location: location.to_owned(),
        message: e.to_string(),
    })?;
    let versions = child(doc.root_element(), "versioning")
        .and_then(|v| child(v, "versions"))
        .map(|list| {
            children(list, "version")
                .filter_map(|v| v.text())
                .map(Version::new)
                .filter(|v| !v.is_unspecified())
                .collect()
        })
        .unwrap_or_default();
    Ok(versions)
}

/// A POM with its parent chain folded in.
#[derive(Debug, Clone, Default)]
struct EffectivePom {
    properties: BTreeMap<String, String>,
    dependencies: Vec<PomDependency>,
    managed: Vec<PomDependency>,
    packaging: Option<String>,
}

fn push_unique(target: &mut Vec<PomDependency>, dep: PomDependency) {
    if !target.iter().any(|d| d.key() == dep.key()) {
        target.push(dep);
    }
}

fn effective<F>(pom: &Pom, load: &mut F, depth: usize) -> Result<EffectivePom, RepoError>
where
    F: FnMut(&Coordinate) -> Result<Pom, RepoError>,
{
    let mut chain = vec![pom.clone()];
    let mut next = pom.parent.clone();
    while let Some(parent) = next {
        if depth + chain.len() > MAX_PARENT_DEPTH {
            log::debug!("parent chain of {} truncated at {}", pom.artifact_id, parent.artifact_id);
            break;
        }
        let loaded = load(&parent.coordinate())?;
        next = loaded.parent.clone();
        chain.push(loaded);
    }

    let mut properties = BTreeMap::new();
    for ancestor in chain.iter().rev() {
        for (key, value) in &ancestor.properties {
            properties.insert(key.clone(), value.clone());
        }
    }
    let parent_version = pom.parent.as_ref().map(|p| p.version.clone());
    let parent_group = pom.parent.as_ref().map(|p| p.group_id.clone());
    let group = pom.group_id.clone().or_else(|| parent_group.clone());
    let version = pom.version.clone().or_else(|| parent_version.clone());
    let builtins = [
        ("project.groupId", group.clone()),
        ("pom.groupId", group.clone()),
        ("groupId", group),
        ("project.artifactId", Some(pom.artifact_id.clone())),
        ("project.version", version.clone()),
        ("pom.version", version.clone()),
        ("version", version),
        ("project.parent.version", parent_version.clone()),
        ("parent.version", parent_version),
        ("project.parent.groupId", parent_group),
    ];
    for (key, value) in builtins {
        if let Some(value) = value {
            properties.insert(key.to_owned(), value);
        }
    }

    let mut dependencies = Vec::new();
    let mut managed = Vec::new();
    let mut imports = Vec::new();
    for ancestor in &chain {
        for dep in &ancestor.dependencies {
            push_unique(&mut dependencies, dep.interpolated(&properties));
        }
        for dep in &ancestor.managed {
            let dep = dep.interpolated(&properties);
            if dep.is_import() {
                imports.push(dep);
            } else {
                push_unique(&mut managed, dep);
            }
        }
    }

    for bom in imports {
        let Some(version) = bom.version.as_deref() else {
            continue;
        };
        if depth + 1 > MAX_PARENT_DEPTH {
            break;
        }
        let coordinate = ModuleId::new(&bom.group_id, &bom.artifact_id).at(Version::new(version));
        let loaded = load(&coordinate)?;
        for dep in effective(&loaded, load, depth + 1)?.managed {
            push_unique(&mut managed, dep);
        }
    }

    Ok(EffectivePom {
        properties,
        dependencies,
        managed,
        packaging: chain.first().and_then(|p| p.packaging.clone()),
    })
}

/// The configurations every Maven module exposes.
pub fn maven_configurations() -> Vec<ConfigurationDef> {
    vec![
        ConfigurationDef::new(MASTER, &[]),
        ConfigurationDef::new(COMPILE, &[]),
        ConfigurationDef::new(RUNTIME, &[COMPILE]),
        ConfigurationDef::new(DEFAULT, &[RUNTIME, MASTER]),
        ConfigurationDef::new(TEST, &[RUNTIME]),
    ]
}

fn artifact_spec(classifier: Option<&str>, kind: Option<&str>) -> ArtifactSpec {
    match kind {
        None | Some("jar" | "bundle") => ArtifactSpec::new(classifier, None),
        Some("test-jar") => ArtifactSpec::new(Some(classifier.unwrap_or("tests")), None),
        Some(other) => ArtifactSpec::new(classifier, Some(other)),
    }
}

/// Translate a POM into module metadata, loading parents and imported BOMs
/// through `load`.
///
/// # Errors
/// Returns an error if a parent or BOM cannot be loaded, or a dependency
/// names an invalid module.
pub fn to_metadata<F>(
    coordinate: &Coordinate,
    pom: &Pom,
    mut load: F,
) -> Result<ModuleMetadata, RepoError>
where
    F: FnMut(&Coordinate) -> Result<Pom, RepoError>,
{
    let effective = effective(pom, &mut load, 0)?;
    let compile = ConfigurationMapping::parse(Some(COMPILE_SCOPE_MAPPING))?;
    let runtime = ConfigurationMapping::parse(Some(RUNTIME_SCOPE_MAPPING))?;

    let mut dependencies = Vec::new();
    for dep in &effective.dependencies {
        let managed = effective.managed.iter().find(|m| m.key() == dep.key());
        let scope = dep
            .scope
            .clone()
            .or_else(|| managed.and_then(|m| m.scope.clone()))
            .unwrap_or_else(|| COMPILE.to_owned());
        let mapping = match scope.as_str() {
            COMPILE => compile.clone(),
            RUNTIME => runtime.clone(),
            _ => continue,
        };
        let version = dep
            .version
            .clone()
            .or_else(|| managed.and_then(|m| m.version.clone()))
            .unwrap_or_default();

        let module = ModuleId::parse(&format!("{}:{}", dep.group_id, dep.artifact_id))?;
        let mut exclusions: Vec<Exclusion> = Vec::new();
        let managed_exclusions = managed.map(|m| m.exclusions.as_slice()).unwrap_or_default();
        for (group, name) in dep.exclusions.iter().chain(managed_exclusions) {
            let exclusion = Exclusion::new(ModuleId::new(group, name));
            if !exclusions.contains(&exclusion) {
                exclusions.push(exclusion);
            }
        }

        dependencies.push(MetadataDependency {
            coordinate: module
                .at(Version::new(&version))
                .with_artifact(artifact_spec(dep.classifier.as_deref(), dep.kind.as_deref())),
            mapping,
            exclusions,
            optional: dep.optional,
        });
    }

    let packaging = effective
        .packaging
        .as_deref()
        .map(|p| interpolate(p, &effective.properties));
    let artifacts = match packaging.as_deref() {
        Some("pom") => Vec::new(),
        None | Some("jar" | "bundle" | "maven-plugin" | "eclipse-plugin") => {
            vec![ArtifactSpec::default()]
        }
        Some(other) => vec![ArtifactSpec::new(None, Some(other))],
    };

    Ok(ModuleMetadata {
        coordinate: coordinate.clone(),
        configurations: maven_configurations(),
        dependencies,
        artifacts,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    const PARENT: &str = r#"<?xml version="1.0"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <groupId>org.example</groupId>
  <artifactId>parent</artifactId>
  <version>2.0</version>
  <packaging>pom</packaging>
  <properties>
    <guava.version>33.0</guava.version>
    <slf4j.version>1.7.36</slf4j.version>
  </properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>com.google.guava</groupId>
        <artifactId>guava</artifactId>
        <version>${guava.version}</version>
        <exclusions>
          <exclusion><groupId>com.google.code.findbugs</groupId><artifactId>jsr305</artifactId></exclusion>
        </exclusions>
      </dependency>
      <dependency>
        <groupId>junit</groupId>
        <artifactId>junit</artifactId>
        <version>4.13</version>
        <scope>test</scope>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>"#;

    const CHILD: &str = r#"<?xml version="1.0"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>2.0</version>
  </parent>
  <artifactId>child</artifactId>
  <properties>
    <slf4j.version>2.0.9</slf4j.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>com.google.guava</groupId>
      <artifactId>guava</artifactId>
    </dependency>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>${slf4j.version}</version>
      <scope>runtime</scope>
    </dependency>
    <dependency>
      <groupId>${project.groupId}</groupId>
      <artifactId>sibling</artifactId>
      <version>${project.version}</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
    </dependency>
    <dependency>
      <groupId>javax.servlet</groupId>
      <artifactId>servlet-api</artifactId>
      <version>2.5</version>
      <scope>provided</scope>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>extras</artifactId>
      <version>1.0</version>
      <optional>true</optional>
    </dependency>
  </dependencies>
</project>"#;

    fn load_parent(coordinate: &Coordinate) -> Result<Pom, RepoError> {
        assert_eq!(coordinate.to_string(), "org.example:parent:2.0");
        parse(PARENT, "parent.pom")
    }

    fn child_metadata() -> ModuleMetadata {
        let pom = parse(CHILD, "child.pom").unwrap();
        let coordinate = Coordinate::parse("org.example:child:2.0").unwrap();
        to_metadata(&coordinate, &pom, load_parent).unwrap()
    }

    fn dep<'a>(meta: &'a ModuleMetadata, name: &str) -> Option<&'a MetadataDependency> {
        meta.dependencies
            .iter()
            .find(|d| d.coordinate.module().name() == name)
    }

    #[test]
    fn parse_reads_basic_fields_and_parent() {
        let pom = parse(CHILD, "child.pom").unwrap();
        assert_eq!(pom.artifact_id, "child");
        assert_eq!(pom.group_id, None);
        assert_eq!(pom.parent.unwrap().artifact_id, "parent");
        assert_eq!(pom.dependencies.len(), 6);
    }

    #[test]
    fn parse_rejects_non_project_root() {
        let err = parse("<settings/>", "x.pom").unwrap_err().to_string();
        assert!(err.contains("expected <project>"), "error was: {err}");
    }

    #[test]
    fn parse_rejects_malformed_xml() {
        assert!(parse("<project><artifactId>x</project>", "x.pom").is_err());
    }

    #[test]
    fn managed_version_and_exclusions_are_inherited() {
        let meta = child_metadata();
        let guava = dep(&meta, "guava").unwrap();
        assert_eq!(guava.coordinate.version().as_str(), "33.0");
        assert_eq!(guava.exclusions.len(), 1);
        assert!(guava
            .exclusions
            .iter()
            .any(|e| e.matches(&ModuleId::new("com.google.code.findbugs", "jsr305"))));
    }

    #[test]
    fn child_properties_override_parent() {
        let meta = child_metadata();
        assert_eq!(
            dep(&meta, "slf4j-api").unwrap().coordinate.version().as_str(),
            "2.0.9"
        );
    }

    #[test]
    fn project_placeholders_use_parent_values() {
        let meta = child_metadata();
        let sibling = dep(&meta, "sibling").unwrap();
        assert_eq!(sibling.coordinate.module().group(), "org.example");
        assert_eq!(sibling.coordinate.version().as_str(), "2.0");
    }

    #[test]
    fn test_and_provided_scopes_are_dropped() {
        let meta = child_metadata();
        assert!(dep(&meta, "junit").is_none());
        assert!(dep(&meta, "servlet-api").is_none());
        assert!(dep(&meta, "extras").unwrap().optional);
    }

    #[test]
    fn scopes_translate_to_mappings() {
        let meta = child_metadata();
        assert_eq!(
            dep(&meta, "guava").unwrap().mapping.to_string(),
            "compile -> compile,master; runtime -> runtime"
        );
        assert_eq!(
            dep(&meta, "slf4j-api").unwrap().mapping.to_string(),
            "runtime -> compile,master,runtime"
        );
    }

    #[test]
    fn compile_only_resolution_skips_runtime_scope() {
        let meta = child_metadata();
        let requested: BTreeSet<String> = ["master", "compile"].iter().map(|s| (*s).to_owned()).collect();
        let names: Vec<&str> = meta
            .dependencies_for(&requested)
            .into_iter()
            .map(|(d, _)| d.coordinate.module().name())
            .collect();
        assert_eq!(names, vec!["guava", "sibling"]);
    }

    #[test]
    fn pom_packaging_publishes_no_artifact() {
        let pom = parse(PARENT, "parent.pom").unwrap();
        let coordinate = Coordinate::parse("org.example:parent:2.0").unwrap();
        let meta = to_metadata(&coordinate, &pom, |_| unreachable_parent()).unwrap();
        assert!(meta.artifacts.is_empty());
        assert!(meta.dependencies.is_empty());
    }

    fn unreachable_parent() -> Result<Pom, RepoError> {
        Err(RepoError::NotFound {
            what: "parent".to_owned(),
        })
    }

    #[test]
    fn missing_parent_is_an_error() {
        let pom = parse(CHILD, "child.pom").unwrap();
        let coordinate = Coordinate::parse("org.example:child:2.0").unwrap();
        assert!(to_metadata(&coordinate, &pom, |_| unreachable_parent()).is_err());
    }

    #[test]
    fn parent_cycles_are_cut() {
        let looping = r#"<project>
  <parent><groupId>g</groupId><artifactId>self</artifactId><version>1</version></parent>
  <artifactId>self</artifactId>
</project>"#;
        let pom = parse(looping, "self.pom").unwrap();
        let coordinate = Coordinate::parse("g:self:1").unwrap();
        let mut loads = 0;
        let meta = to_metadata(&coordinate, &pom, |_| {
            loads += 1;
            parse(looping, "self.pom")
        })
        .unwrap();
        assert!(loads <= MAX_PARENT_DEPTH);
        assert!(meta.dependencies.is_empty());
    }

    #[test]
    fn imported_bom_supplies_versions() {
        let app = r#"<project>
  <groupId>g</groupId><artifactId>app</artifactId><version>1</version>
  <dependencyManagement><dependencies>
    <dependency><groupId>g</groupId><artifactId>bom</artifactId><version>5</version><type>pom</type><scope>import</scope></dependency>
  </dependencies></dependencyManagement>
  <dependencies>
    <dependency><groupId>g</groupId><artifactId>lib</artifactId></dependency>
  </dependencies>
</project>"#;
        let bom = r#"<project>
  <groupId>g</groupId><artifactId>bom</artifactId><version>5</version><packaging>pom</packaging>
  <dependencyManagement><dependencies>
    <dependency><groupId>g</groupId><artifactId>lib</artifactId><version>${project.version}.1</version></dependency>
  </dependencies></dependencyManagement>
</project>"#;
        let pom = parse(app, "app.pom").unwrap();
        let coordinate = Coordinate::parse("g:app:1").unwrap();
        let meta = to_metadata(&coordinate, &pom, |_| parse(bom, "bom.pom")).unwrap();
        assert_eq!(
            dep(&meta, "lib").unwrap().coordinate.version().as_str(),
            "5.1"
        );
    }

    #[test]
    fn interpolate_handles_nested_and_unknown() {
        let mut props = BTreeMap::new();
        props.insert("a".to_owned(), "${b}".to_owned());
        props.insert("b".to_owned(), "1.0".to_owned());
        assert_eq!(interpolate("v${a}-x", &props), "v1.0-x");
        assert_eq!(interpolate("${missing}", &props), "${missing}");
        assert_eq!(interpolate("${unterminated", &props), "${unterminated");
    }

    #[test]
    fn parse_versions_reads_listing() {
        let xml = r#"<metadata>
  <groupId>org.example</groupId><artifactId>lib</artifactId>
  <versioning>
    <latest>1.10</latest>
    <versions><version>1.9</version><version> 1.10 </version><version>2.0-SNAPSHOT</version></versions>
  </versioning>
</metadata>"#;
        let versions = parse_versions(xml, "maven-metadata.xml").unwrap();
        let names: Vec<&str> = versions.iter().map(Version::as_str).collect();
        assert_eq!(names, vec!["1.9", "1.10", "2.0-SNAPSHOT"]);
    }

    #[test]
    fn parse_versions_without_versioning_is_empty() {
        assert!(parse_versions("<metadata/>", "m.xml").unwrap().is_empty());
    }

    #[test]
    fn test_jar_type_becomes_tests_classifier() {
        let spec = artifact_spec(None, Some("test-jar"));
        assert_eq!(spec.classifier.as_deref(), Some("tests"));
        assert_eq!(spec.extension, None);
        assert_eq!(artifact_spec(None, Some("aar")).extension.as_deref(), Some("aar"));
    }
}
