//! Ivy descriptor (`ivy.xml`) translation into [`ModuleMetadata`].

use caravan_model::mapping::DEFAULT;
use caravan_model::module_id::WILDCARD;
use caravan_model::{
    ArtifactSpec, ConfigurationMapping, Coordinate, Exclusion, MappingClause, ModuleId, Version,
};
use roxmltree::Node;

use crate::error::RepoError;
use crate::metadata::{ConfigurationDef, MetadataDependency, ModuleMetadata};

/// Mapping used by `<dependency>` elements without a `conf` attribute.
const DEFAULT_CONF_MAPPING: &str = "*->*";

fn element<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn exclusion(node: Node<'_, '_>) -> Exclusion {
    Exclusion::new(ModuleId::new(
        node.attribute("org").unwrap_or(WILDCARD),
        node.attribute("module").unwrap_or(WILDCARD),
    ))
}

/// Ivy reads `conf="compile"` as `compile->compile`.
fn conf_mapping(expression: &str) -> Result<ConfigurationMapping, RepoError> {
    let parsed = ConfigurationMapping::parse(Some(expression))?;
    let clauses = parsed
        .clauses()
        .iter()
        .map(|clause| {
            if clause.right.is_empty() {
                MappingClause {
                    left: clause.left.clone(),
                    right: clause.left.clone(),
                }
            } else {
                clause.clone()
            }
        })
        .collect();
    Ok(ConfigurationMapping::of(clauses))
}

/// Parse an Ivy descriptor for `coordinate`. `location` is used in error messages.
///
/// # Errors
/// Returns `RepoError::InvalidMetadata` if the XML is malformed or is not an
/// `<ivy-module>`, and `RepoError::Model` for a malformed `conf` mapping or
/// dependency id.
pub fn to_metadata(
    coordinate: &Coordinate,
    xml: &str,
    location: &str,
) -> Result<ModuleMetadata, RepoError> {
    let invalid = |message: String| RepoError::InvalidMetadata {
        location: location.to_owned(),
        message,
    };
    let doc = roxmltree::Document::parse(xml).map_err(|e| invalid(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "ivy-module" {
        return Err(invalid(format!(
            "expected <ivy-module>, found <{}>",
            root.tag_name().name()
        )));
    }

    let configurations_node = element(root, "configurations").next();
    let mut configurations: Vec<ConfigurationDef> = configurations_node
        .map(|confs| {
            element(confs, "conf")
                .filter_map(|conf| {
                    let extends = conf
                        .attribute("extends")
                        .map(|e| {
                            e.split(',')
                                .map(str::trim)
                                .filter(|s| !s.is_empty())
                                .collect::<Vec<_>>()
                        })
                        .unwrap_or_default();
                    Some(ConfigurationDef::new(conf.attribute("name")?.trim(), &extends))
                })
                .collect()
        })
        .unwrap_or_default();
    if configurations.is_empty() {
        configurations.push(ConfigurationDef::new(DEFAULT, &[]));
    }

    let dependencies_node = element(root, "dependencies").next();
    let default_conf = dependencies_node
        .and_then(|deps| deps.attribute("defaultconf"))
        .or_else(|| configurations_node.and_then(|c| c.attribute("defaultconfmapping")))
        .unwrap_or(DEFAULT_CONF_MAPPING);
    let shared_exclusions: Vec<Exclusion> = dependencies_node
        .map(|deps| element(deps, "exclude").map(exclusion).collect())
        .unwrap_or_default();

    let mut dependencies = Vec::new();
    for dep in dependencies_node
        .into_iter()
        .flat_map(|deps| element(deps, "dependency"))
    {
        let (Some(org), Some(name)) = (dep.attribute("org"), dep.attribute("name")) else {
            return Err(invalid("<dependency> without org or name".to_owned()));
        };
        let module = ModuleId::parse(&format!("{org}:{name}"))?;
        let mapping = conf_mapping(dep.attribute("conf").unwrap_or(default_conf))?;

        let mut exclusions: Vec<Exclusion> = element(dep, "exclude").map(exclusion).collect();
        if dep.attribute("transitive") == Some("false") {
            exclusions.push(Exclusion::new(ModuleId::new(WILDCARD, WILDCARD)));
        }
        for shared in &shared_exclusions {
            if !exclusions.contains(shared) {
                exclusions.push(shared.clone());
            }
        }

        dependencies.push(MetadataDependency {
            coordinate: module.at(Version::new(dep.attribute("rev").unwrap_or_default())),
            mapping,
            exclusions,
            optional: false,
        });
    }

    let artifacts = match element(root, "publications").next() {
        None => vec![ArtifactSpec::default()],
        Some(publications) => element(publications, "artifact")
            .map(|artifact| {
                let classifier = artifact
                    .attributes()
                    .find(|a| a.name() == "classifier")
                    .map(|a| a.value());
                let extension = artifact
                    .attribute("ext")
                    .or_else(|| artifact.attribute("type"))
                    .filter(|ext| *ext != caravan_model::coordinate::DEFAULT_EXTENSION);
                ArtifactSpec::new(classifier, extension)
            })
            .collect(),
    };

    Ok(ModuleMetadata {
        coordinate: coordinate.clone(),
        configurations,
        dependencies,
        artifacts,
    })
}
