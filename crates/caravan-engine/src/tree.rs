//! The resolved dependency tree.

use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use caravan_model::{Coordinate, ModuleId, Version, VersionProvider};

const INDENT: &str = "    ";

/// A module placed in the tree at its winning version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    /// Coordinate at the resolved version, with the declared artifact.
    pub coordinate: Coordinate,
    /// The version written on the edge, before mediation and conflict resolution.
    pub declared_version: Version,
    /// Configurations pulled from this module.
    pub configurations: BTreeSet<String>,
    pub files: Vec<PathBuf>,
    pub children: Vec<DependencyNode>,
    /// Children were already listed at an earlier occurrence of the same edge.
    pub repeated: bool,
}

impl ModuleNode {
    pub fn module(&self) -> &ModuleId {
        self.coordinate.module()
    }

    pub fn version(&self) -> &Version {
        self.coordinate.version()
    }
}

/// Local files declared directly on the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// What produced the files, for computed declarations.
    pub description: Option<String>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyNode {
    Module(ModuleNode),
    Files(FileNode),
}

impl DependencyNode {
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Self::Module(node) => &node.files,
            Self::Files(node) => &node.files,
        }
    }

    pub fn children(&self) -> &[DependencyNode] {
        match self {
            Self::Module(node) => &node.children,
            Self::Files(_) => &[],
        }
    }

    pub fn as_module(&self) -> Option<&ModuleNode> {
        match self {
            Self::Module(node) => Some(node),
            Self::Files(_) => None,
        }
    }

    pub(crate) fn for_each_module_mut(&mut self, f: &mut dyn FnMut(&mut ModuleNode)) {
        if let Self::Module(node) = self {
            f(node);
            for child in &mut node.children {
                child.for_each_module_mut(f);
            }
        }
    }
}

/// Root-level nodes resolved for one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTree {
    configuration: String,
    roots: Vec<DependencyNode>,
}

impl DependencyTree {
    pub fn new(configuration: &str, roots: Vec<DependencyNode>) -> Self {
        Self {
            configuration: configuration.to_owned(),
            roots,
        }
    }

    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn roots(&self) -> &[DependencyNode] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut [DependencyNode] {
        &mut self.roots
    }

    /// Every node, pre-order.
    pub fn flatten(&self) -> Vec<&DependencyNode> {
        fn walk<'a>(node: &'a DependencyNode, out: &mut Vec<&'a DependencyNode>) {
            out.push(node);
            for child in node.children() {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        for root in &self.roots {
            walk(root, &mut out);
        }
        out
    }

    /// Module nodes, pre-order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleNode> {
        self.flatten().into_iter().filter_map(DependencyNode::as_module)
    }

    /// All files in pre-order, each listed once.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut seen: HashSet<&Path> = HashSet::new();
        let mut files = Vec::new();
        for node in self.flatten() {
            for file in node.files() {
                if seen.insert(file) {
                    files.push(file.clone());
                }
            }
        }
        files
    }

    pub fn contains(&self, module: &ModuleId) -> bool {
        self.first(module).is_some()
    }

    /// The first node for `module` in pre-order.
    pub fn first(&self, module: &ModuleId) -> Option<&ModuleNode> {
        self.modules().find(|node| node.module() == module)
    }

    /// Resolved coordinates, each module version listed once.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut seen = HashSet::new();
        self.modules()
            .filter(|node| seen.insert((node.module().clone(), node.version().clone())))
            .map(|node| node.coordinate.main())
            .collect()
    }

    /// The resolved version of every module, usable as a version provider for
    /// a later resolution.
    pub fn resolved_versions(&self) -> VersionProvider {
        let mut seen = HashSet::new();
        self.modules()
            .filter(|node| seen.insert(node.module().clone()))
            .map(|node| (node.module().clone(), node.version().clone()))
            .collect()
    }

    /// Indented text view, four spaces per level. A module's children are
    /// listed at its first occurrence only; later ones are marked `(*)`.
    pub fn render(&self) -> String {
        let mut printed = HashSet::new();
        let mut out = String::new();
        for root in &self.roots {
            render_node(root, 0, &mut printed, &mut out);
        }
        out
    }
}

fn render_node<'a>(
    node: &'a DependencyNode,
    depth: usize,
    printed: &mut HashSet<&'a ModuleId>,
    out: &mut String,
) {
    let indent = INDENT.repeat(depth);
    match node {
        DependencyNode::Module(module) => {
            let _ = write!(out, "{indent}{}", module.coordinate);
            if !module.declared_version.is_unspecified()
                && module.declared_version != *module.version()
            {
                let _ = write!(out, " as {}", module.declared_version);
            }
            let first = printed.insert(module.module());
            if !first || module.repeated {
                out.push_str(" (*)");
            }
            out.push('\n');
            if first {
                for child in &module.children {
                    render_node(child, depth + 1, printed, out);
                }
            }
        }
        DependencyNode::Files(files) => {
            let label = files.description.as_deref().unwrap_or("files");
            let listed: Vec<String> = files.files.iter().map(|f| f.display().to_string()).collect();
            let _ = writeln!(out, "{indent}{label}: {}", listed.join(", "));
        }
    }
}
