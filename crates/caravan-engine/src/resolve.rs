//! Dependency resolution in two passes.
//!
//! 1. A breadth-first walk from the root declarations collects every
//!    `(module, version, depth)` candidate. Metadata for one level is fetched in
//!    parallel and merged before the next level starts.
//! 2. Conflicts are settled per module, then the tree is rebuilt depth-first
//!    from the winning versions only, and its artifacts are downloaded in parallel.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use caravan_model::mapping::resolved_closure;
use caravan_model::provider::mediate;
use caravan_model::{
    Coordinate, DependencyDeclaration, DependencySet, DependencyTarget, Exclusion, ModuleId,
    Version,
};
use caravan_repo::{ModuleMetadata, RepositoryAccess};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::conflict::{Candidate, ConflictResolver};
use crate::container::{ArtifactContainer, ArtifactReport};
use crate::error::EngineError;
use crate::logger::Logger;
use crate::params::{ConflictStrategy, ResolutionParameters};
use crate::result::{ResolveResult, ResolveWarning};
use crate::tree::{DependencyNode, DependencyTree, FileNode, ModuleNode};

/// Where a resolution call is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Initialized,
    Traversing,
    ConflictResolving,
    Materializing,
    Done,
    Failed,
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initialized => "initialized",
            Self::Traversing => "traversing",
            Self::ConflictResolving => "conflict-resolving",
            Self::Materializing => "materializing",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Resolves dependency sets against one repository access.
///
/// Holds no state between calls; every [`resolve`](Self::resolve) starts fresh.
#[derive(Clone)]
pub struct DependencyResolver {
    repository: Arc<dyn RepositoryAccess>,
    logger: Arc<dyn Logger>,
}

impl DependencyResolver {
    pub fn new(repository: Arc<dyn RepositoryAccess>, logger: Arc<dyn Logger>) -> Self {
        Self { repository, logger }
    }

    /// Resolve `set` for the root `configuration` (e.g. `"runtime"`).
    ///
    /// # Errors
    /// Returns `EngineError::Resolution` when `params.fail_fast` is set and any
    /// module, version, or artifact could not be resolved.
    pub fn resolve(
        &self,
        set: &DependencySet,
        configuration: &str,
        params: &ResolutionParameters,
    ) -> Result<ResolveResult, EngineError> {
        Resolution {
            repository: self.repository.as_ref(),
            logger: self.logger.as_ref(),
            set,
            configuration,
            params,
            state: ResolutionState::Initialized,
            metadata: HashMap::new(),
            versions: HashMap::new(),
            winners: HashMap::new(),
            problems: Vec::new(),
            warnings: Vec::new(),
        }
        .run()
    }
}

type MetadataKey = (ModuleId, Version);
type ExpansionKey = (ModuleId, Version, BTreeSet<String>, BTreeSet<Exclusion>);
type Fetched = Result<Arc<ModuleMetadata>, String>;

fn metadata_key(coordinate: &Coordinate) -> MetadataKey {
    (coordinate.module().clone(), coordinate.version().clone())
}

/// One edge of the graph being walked.
#[derive(Debug, Clone)]
struct Edge {
    /// Target at the version currently chosen for it.
    coordinate: Coordinate,
    declared: Version,
    configurations: BTreeSet<String>,
    /// Applied to everything below the target.
    exclusions: Vec<Exclusion>,
    depth: usize,
    ancestors: Vec<ModuleId>,
}

impl Edge {
    fn module(&self) -> &ModuleId {
        self.coordinate.module()
    }

    fn key(&self) -> ExpansionKey {
        (
            self.module().clone(),
            self.coordinate.version().clone(),
            self.configurations.clone(),
            self.exclusions.iter().cloned().collect(),
        )
    }

    fn at(mut self, version: Version) -> Self {
        self.coordinate = self.coordinate.with_version(version);
        self
    }
}

enum Root {
    Module(Edge),
    Files(FileNode),
}

struct Resolution<'r> {
    repository: &'r dyn RepositoryAccess,
    logger: &'r dyn Logger,
    set: &'r DependencySet,
    configuration: &'r str,
    params: &'r ResolutionParameters,
    state: ResolutionState,
    metadata: HashMap<MetadataKey, Fetched>,
    versions: HashMap<ModuleId, Result<Vec<Version>, String>>,
    winners: HashMap<ModuleId, Version>,
    problems: Vec<String>,
    warnings: Vec<ResolveWarning>,
}

impl Resolution<'_> {
    fn run(mut self) -> Result<ResolveResult, EngineError> {
        let roots = self.roots();

        self.transition(ResolutionState::Traversing);
        let candidates = self.discover(&roots);

        self.transition(ResolutionState::ConflictResolving);
        self.settle_conflicts(&candidates);
        let mut expanded = HashSet::new();
        let nodes = roots
            .into_iter()
            .filter_map(|root| match root {
                Root::Module(edge) => self
                    .settle(edge)
                    .map(|edge| self.build_node(edge, &mut expanded)),
                Root::Files(files) => Some(DependencyNode::Files(files)),
            })
            .collect();
        let mut tree = DependencyTree::new(self.configuration, nodes);
        if self.params.fail_fast && !self.problems.is_empty() {
            return Err(self.fail());
        }

        self.transition(ResolutionState::Materializing);
        let reports = self.materialize(&tree);
        let artifacts = ArtifactContainer::of(&reports, self.logger);
        for root in tree.roots_mut() {
            root.for_each_module_mut(&mut |node| {
                node.files = self
                    .requested_artifacts(node)
                    .iter()
                    .filter_map(|artifact| artifacts.artifact(artifact))
                    .map(Path::to_path_buf)
                    .collect();
            });
        }
        if self.params.fail_fast && !self.problems.is_empty() {
            return Err(self.fail());
        }

        self.transition(ResolutionState::Done);
        self.logger.info(&format!(
            "resolved {} modules ({} files) for {}",
            tree.coordinates().len(),
            tree.files().len(),
            self.configuration
        ));
        Ok(ResolveResult::new(tree, artifacts, self.problems, self.warnings))
    }

    fn transition(&mut self, next: ResolutionState) {
        let previous = std::mem::replace(&mut self.state, next);
        self.trace(|| format!("resolution {previous} -> {next}"));
    }

    fn fail(&mut self) -> EngineError {
        self.transition(ResolutionState::Failed);
        for problem in &self.problems {
            self.logger.error(problem);
        }
        EngineError::Resolution {
            problems: std::mem::take(&mut self.problems),
        }
    }

    fn trace(&self, message: impl FnOnce() -> String) {
        if self.params.verbose {
            self.logger.verbose(&message());
        }
    }

    fn problem(&mut self, message: String) {
        if !self.problems.contains(&message) {
            if !self.params.fail_fast {
                self.logger.warn(&message);
            }
            self.problems.push(message);
        }
    }

    /// Root declarations active for the resolved configuration, in order.
    fn roots(&mut self) -> Vec<Root> {
        let set = self.set;
        let active = resolved_closure(self.configuration);
        let mut roots = Vec::new();
        for declaration in set.declarations() {
            let configurations = declaration.target_configurations(&active);
            if configurations.is_empty() {
                self.trace(|| format!("{declaration} is not part of {}", self.configuration));
                continue;
            }
            match declaration.target() {
                DependencyTarget::Module(coordinate) => roots.push(Root::Module(Edge {
                    coordinate: coordinate.clone(),
                    declared: coordinate.version().clone(),
                    configurations,
                    exclusions: declaration.exclusions().to_vec(),
                    depth: 0,
                    ancestors: Vec::new(),
                })),
                DependencyTarget::Files(files) => {
                    roots.push(Root::Files(self.file_node(None, files, declaration)));
                }
                DependencyTarget::Computed(computed) => roots.push(Root::Files(self.file_node(
                    Some(computed.description.clone()),
                    &computed.files,
                    declaration,
                ))),
            }
        }
        roots
    }

    fn file_node(
        &mut self,
        description: Option<String>,
        files: &[PathBuf],
        declaration: &DependencyDeclaration,
    ) -> FileNode {
        let mut present = Vec::new();
        for file in files {
            if file.exists() {
                present.push(file.clone());
            } else {
                let warning = ResolveWarning::MissingFile { path: file.clone() };
                self.logger.warn(&format!("{warning} declared by {declaration}"));
                self.warnings.push(warning);
            }
        }
        FileNode {
            description,
            files: present,
        }
    }

    /// The concrete version to use for `declared`, after mediation and pinning.
    fn version_for(&mut self, module: &ModuleId, declared: &Version) -> Result<Version, String> {
        let version = mediate(Some(declared), self.set.version_provider().version_of(module));
        if version.is_unspecified() {
            return Err(format!("no version declared for {module}"));
        }
        if !version.is_dynamic() {
            return Ok(version);
        }
        let repository = self.repository;
        let available = self.versions.entry(module.clone()).or_insert_with(|| {
            repository
                .available_versions(module)
                .map_err(|e| e.to_string())
        });
        match available {
            Ok(listed) => {
                let pinned = listed
                    .iter()
                    .filter(|candidate| version.accepts(candidate))
                    .max()
                    .cloned()
                    .ok_or_else(|| format!("no version of {module} matches {version}"))?;
                self.trace(|| format!("pinned {module}:{version} to {pinned}"));
                Ok(pinned)
            }
            Err(e) => Err(format!("cannot list versions of {module} for {version}: {e}")),
        }
    }

    /// Fetch metadata for every coordinate not seen yet, in parallel.
    fn prefetch(&mut self, coordinates: &[&Coordinate]) {
        let mut seen = HashSet::new();
        let pending: Vec<Coordinate> = coordinates
            .iter()
            .filter(|c| {
                let key = metadata_key(c);
                !self.metadata.contains_key(&key) && seen.insert(key)
            })
            .map(|c| c.main())
            .collect();
        if pending.is_empty() {
            return;
        }

        let repository = self.repository;
        let fetched: Vec<(MetadataKey, Fetched)> = pending
            .par_iter()
            .map(|coordinate| {
                let result = repository
                    .fetch_metadata(coordinate)
                    .map(Arc::new)
                    .map_err(|e| e.to_string());
                (metadata_key(coordinate), result)
            })
            .collect();
        self.metadata.extend(fetched);
    }

    fn metadata_of(&mut self, coordinate: &Coordinate) -> Fetched {
        let key = metadata_key(coordinate);
        if let Some(found) = self.metadata.get(&key) {
            return found.clone();
        }
        let fetched = self
            .repository
            .fetch_metadata(&coordinate.main())
            .map(Arc::new)
            .map_err(|e| e.to_string());
        self.metadata.insert(key, fetched.clone());
        fetched
    }

    /// Edges below `parent`, with their declared versions not yet settled.
    fn child_edges(&self, parent: &Edge, metadata: &ModuleMetadata) -> Vec<Edge> {
        let mut ancestors = parent.ancestors.clone();
        ancestors.push(parent.module().clone());

        metadata
            .dependencies_for(&parent.configurations)
            .into_iter()
            .filter_map(|(dependency, configurations)| {
                let module = dependency.coordinate.module();
                if parent.exclusions.iter().any(|e| e.matches(module))
                    || self.set.globally_excludes(module)
                {
                    self.trace(|| format!("{module} excluded below {}", parent.coordinate));
                    return None;
                }
                if ancestors.contains(module) {
                    self.trace(|| format!("cycle at {module} below {}", parent.coordinate));
                    return None;
                }
                let mut exclusions = parent.exclusions.clone();
                for exclusion in &dependency.exclusions {
                    if !exclusions.contains(exclusion) {
                        exclusions.push(exclusion.clone());
                    }
                }
                Some(Edge {
                    coordinate: dependency.coordinate.clone(),
                    declared: dependency.coordinate.version().clone(),
                    configurations,
                    exclusions,
                    depth: parent.depth + 1,
                    ancestors: ancestors.clone(),
                })
            })
            .collect()
    }

    /// First pass: every candidate version, level by level.
    fn discover(&mut self, roots: &[Root]) -> Vec<Candidate> {
        let mut level: Vec<Edge> = Vec::new();
        for root in roots {
            if let Root::Module(edge) = root {
                if let Ok(version) = self.version_for(edge.module(), &edge.declared) {
                    level.push(edge.clone().at(version));
                }
            }
        }

        let mut candidates = Vec::new();
        let mut expanded = HashSet::new();
        while !level.is_empty() {
            let coordinates: Vec<&Coordinate> = level.iter().map(|e| &e.coordinate).collect();
            self.prefetch(&coordinates);

            let mut next = Vec::new();
            for edge in &level {
                candidates.push(Candidate::new(
                    edge.module().clone(),
                    edge.coordinate.version().clone(),
                    edge.depth,
                ));
                if !expanded.insert(edge.key()) {
                    continue;
                }
                let Some(Ok(metadata)) = self.metadata.get(&metadata_key(&edge.coordinate)).cloned()
                else {
                    continue;
                };
                self.trace(|| format!("visiting {} at depth {}", edge.coordinate, edge.depth));
                for child in self.child_edges(edge, &metadata) {
                    let Ok(version) = self.version_for(child.module(), &child.declared) else {
                        continue;
                    };
                    if let Some(forced) = self.forced_version(child.module(), &version) {
                        next.push(child.clone().at(forced));
                    }
                    next.push(child.at(version));
                }
            }
            level = next;
        }
        candidates
    }

    /// The provider version of a transitive module under the forced strategy,
    /// when it differs from `chosen`. Its subtree takes part in conflicts too.
    fn forced_version(&mut self, module: &ModuleId, chosen: &Version) -> Option<Version> {
        if self.params.strategy != ConflictStrategy::Forced {
            return None;
        }
        let forced = self.set.version_provider().version_of(module)?.clone();
        let forced = self.version_for(module, &forced).ok()?;
        (&forced != chosen).then_some(forced)
    }

    fn settle_conflicts(&mut self, candidates: &[Candidate]) {
        let mut order: Vec<&ModuleId> = Vec::new();
        let mut groups: HashMap<&ModuleId, Vec<Candidate>> = HashMap::new();
        for candidate in candidates {
            groups
                .entry(&candidate.module)
                .or_insert_with(|| {
                    order.push(&candidate.module);
                    Vec::new()
                })
                .push(candidate.clone());
        }

        let set = self.set;
        let resolver = ConflictResolver::new(self.params.strategy, set.version_provider());
        for module in order {
            let Some(group) = groups.get(module) else {
                continue;
            };
            let Some(winner) = resolver.resolve(group) else {
                continue;
            };
            let distinct: BTreeSet<&Version> = group.iter().map(|c| &c.version).collect();
            if distinct.len() > 1 {
                self.trace(|| {
                    let listed: Vec<String> = distinct.iter().map(ToString::to_string).collect();
                    format!(
                        "conflict on {module}: [{}] -> {winner} ({})",
                        listed.join(", "),
                        self.params.strategy
                    )
                });
            }
            self.winners.insert(module.clone(), winner);
        }
    }

    /// Move `edge` to the winning version of its module. Modules first met
    /// here get their own mediated version.
    fn settle(&mut self, edge: Edge) -> Option<Edge> {
        if let Some(winner) = self.winners.get(edge.module()) {
            let winner = winner.clone();
            return Some(edge.at(winner));
        }
        match self.version_for(edge.module(), &edge.declared) {
            Ok(version) => {
                self.winners.insert(edge.module().clone(), version.clone());
                Some(edge.at(version))
            }
            Err(problem) => {
                self.problem(problem);
                None
            }
        }
    }

    /// Second pass: the tree below `edge`, using winning versions only.
    fn build_node(&mut self, edge: Edge, expanded: &mut HashSet<ExpansionKey>) -> DependencyNode {
        let repeated = !expanded.insert(edge.key());
        let mut children = Vec::new();
        if !repeated {
            match self.metadata_of(&edge.coordinate) {
                Ok(metadata) => {
                    for child in self.child_edges(&edge, &metadata) {
                        if let Some(child) = self.settle(child) {
                            children.push(self.build_node(child, expanded));
                        }
                    }
                }
                Err(message) => self.problem(format!(
                    "unresolved dependency {}: {message}",
                    edge.coordinate
                )),
            }
        }
        DependencyNode::Module(ModuleNode {
            coordinate: edge.coordinate,
            declared_version: edge.declared,
            configurations: edge.configurations,
            files: Vec::new(),
            children,
            repeated,
        })
    }

    /// The artifact a node names, or every artifact its metadata lists when it
    /// names the main one. Nodes without metadata request nothing.
    fn requested_artifacts(&self, node: &ModuleNode) -> Vec<Coordinate> {
        let Some(Ok(metadata)) = self.metadata.get(&metadata_key(&node.coordinate)) else {
            return Vec::new();
        };
        if !node.coordinate.artifact().is_main() {
            return vec![node.coordinate.clone()];
        }
        metadata
            .artifacts
            .iter()
            .map(|spec| node.coordinate.with_artifact(spec.clone()))
            .collect()
    }

    /// Download the artifacts of every module in `tree`, in parallel.
    fn materialize(&mut self, tree: &DependencyTree) -> Vec<ArtifactReport> {
        let mut seen = HashSet::new();
        let mut requests = Vec::new();
        for node in tree.modules() {
            for artifact in self.requested_artifacts(node) {
                if seen.insert(artifact.clone()) {
                    requests.push(artifact);
                }
            }
        }

        let repository = self.repository;
        let refresh = self.params.refresh;
        let reports: Vec<ArtifactReport> = requests
            .par_iter()
            .map(|coordinate| match repository.fetch_artifact(coordinate, refresh) {
                Ok(path) => ArtifactReport::fetched(coordinate.clone(), path),
                Err(e) => ArtifactReport::failed(coordinate.clone(), e.to_string()),
            })
            .collect();

        for report in &reports {
            if let Some(reason) = &report.failure {
                if self.params.fail_fast {
                    self.problems
                        .push(format!("missing artifact {}: {reason}", report.coordinate));
                }
                self.warnings.push(ResolveWarning::MissingArtifact {
                    coordinate: report.coordinate.clone(),
                    reason: reason.clone(),
                });
            }
        }
        reports
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use caravan_model::{ArtifactSpec, ConfigurationMapping, VersionProvider};
    use caravan_repo::{ConfigurationDef, MetadataDependency, RepoError};
    use proptest::prelude::{prop_assert_eq, proptest};

    use super::*;
    use crate::logger::{LogLevel, MemoryLogger};

    const COMPILE_SCOPE: &str = "compile -> compile,master; runtime -> runtime";

    /// Modules held in memory; artifacts are written to a temp dir on fetch.
    struct FakeRepository {
        modules: HashMap<Coordinate, ModuleMetadata>,
        missing_artifacts: HashSet<Coordinate>,
        dir: tempfile::TempDir,
        metadata_calls: Mutex<Vec<Coordinate>>,
    }

    impl FakeRepository {
        fn new() -> Self {
            Self {
                modules: HashMap::new(),
                missing_artifacts: HashSet::new(),
                dir: tempfile::tempdir().unwrap(),
                metadata_calls: Mutex::new(Vec::new()),
            }
        }

        fn module(self, coordinate: &str, dependencies: &[&str]) -> Self {
            self.module_with(coordinate, dependencies, Vec::new())
        }

        fn module_with(
            mut self,
            coordinate: &str,
            dependencies: &[&str],
            exclusions: Vec<(usize, &str)>,
        ) -> Self {
            let coordinate = Coordinate::parse(coordinate).unwrap();
            let mut dependencies: Vec<MetadataDependency> = dependencies
                .iter()
                .map(|dep| MetadataDependency {
                    coordinate: Coordinate::parse(dep).unwrap(),
                    mapping: ConfigurationMapping::parse(Some(COMPILE_SCOPE)).unwrap(),
                    exclusions: Vec::new(),
                    optional: false,
                })
                .collect();
            for (index, pattern) in exclusions {
                dependencies[index]
                    .exclusions
                    .push(Exclusion::parse(pattern).unwrap());
            }
            self.modules.insert(
                coordinate.clone(),
                ModuleMetadata {
                    coordinate,
                    configurations: vec![
                        ConfigurationDef::new("master", &[]),
                        ConfigurationDef::new("compile", &[]),
                        ConfigurationDef::new("runtime", &["compile"]),
                        ConfigurationDef::new("default", &["runtime", "master"]),
                        ConfigurationDef::new("test", &["runtime"]),
                    ],
                    dependencies,
                    artifacts: vec![ArtifactSpec::default()],
                },
            );
            self
        }

        fn without_artifact(mut self, coordinate: &str) -> Self {
            self.missing_artifacts
                .insert(Coordinate::parse(coordinate).unwrap());
            self
        }

        /// Same modules, fresh temp dir.
        fn duplicate(&self) -> Self {
            let mut copy = Self::new();
            copy.modules = self.modules.clone();
            copy.missing_artifacts = self.missing_artifacts.clone();
            copy
        }

        fn metadata_calls(&self) -> usize {
            self.metadata_calls.lock().unwrap().len()
        }
    }

    impl RepositoryAccess for FakeRepository {
        fn available_versions(&self, module: &ModuleId) -> Result<Vec<Version>, RepoError> {
            let mut versions: Vec<Version> = self
                .modules
                .keys()
                .filter(|c| c.module() == module)
                .map(|c| c.version().clone())
                .collect();
            versions.sort();
            Ok(versions)
        }

        fn fetch_metadata(&self, coordinate: &Coordinate) -> Result<ModuleMetadata, RepoError> {
            self.metadata_calls.lock().unwrap().push(coordinate.clone());
            self.modules
                .get(coordinate)
                .cloned()
                .ok_or_else(|| RepoError::NotFound {
                    what: coordinate.to_string(),
                })
        }

        fn fetch_artifact(&self, coordinate: &Coordinate, _refresh: bool) -> Result<PathBuf, RepoError> {
            if self.missing_artifacts.contains(coordinate) {
                return Err(RepoError::NotFound {
                    what: coordinate.to_string(),
                });
            }
            let path = self.dir.path().join(coordinate.filename());
            std::fs::write(&path, coordinate.to_string()).unwrap();
            Ok(path)
        }
    }

    fn id(s: &str) -> ModuleId {
        ModuleId::parse(s).unwrap()
    }

    fn declare(coordinate: &str) -> DependencyDeclaration {
        DependencyDeclaration::parse(coordinate).unwrap()
    }

    fn run(
        repository: FakeRepository,
        set: &DependencySet,
        params: ResolutionParameters,
    ) -> (Result<ResolveResult, EngineError>, Arc<FakeRepository>, Arc<MemoryLogger>) {
        let repository = Arc::new(repository);
        let logger = Arc::new(MemoryLogger::new());
        let resolver = DependencyResolver::new(repository.clone(), logger.clone());
        (resolver.resolve(set, "runtime", &params), repository, logger)
    }

    fn resolved(result: &ResolveResult) -> Vec<String> {
        result
            .dependency_tree()
            .coordinates()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn a_near_and_far() -> (FakeRepository, DependencySet) {
        let repository = FakeRepository::new()
            .module("org:a:1.0", &[])
            .module("org:a:2.0", &[])
            .module("org:b:1.0", &["org:c:1.0"])
            .module("org:c:1.0", &["org:a:2.0"]);
        let set = DependencySet::of(vec![declare("org:a:1.0"), declare("org:b:1.0")]);
        (repository, set)
    }

    #[test]
    fn nearest_wins_keeps_direct_version() {
        let (repository, set) = a_near_and_far();
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert_eq!(result.version_of(&id("org:a")).unwrap().as_str(), "1.0");
        assert_eq!(resolved(&result), vec!["org:a:1.0", "org:b:1.0", "org:c:1.0"]);
    }

    #[test]
    fn latest_wins_picks_transitive_version() {
        let (repository, set) = a_near_and_far();
        let params = ResolutionParameters::default().with_strategy(ConflictStrategy::Latest);
        let (result, _, _) = run(repository, &set, params);
        let result = result.unwrap();
        assert_eq!(result.version_of(&id("org:a")).unwrap().as_str(), "2.0");
        assert_eq!(
            names(&result.files()),
            vec!["a-2.0.jar", "b-1.0.jar", "c-1.0.jar"]
        );
    }

    #[test]
    fn direct_declaration_beats_transitive_range() {
        let repository = FakeRepository::new()
            .module("org:lib1:1.0", &["org:lib2:[1.0,1.2]"])
            .module("org:lib2:1.0", &[])
            .module("org:lib2:1.1", &[])
            .module("org:lib2:1.2", &[]);
        let set = DependencySet::of(vec![
            declare("org:lib1:1.0")
                .mapped("compile->compile,runtime")
                .unwrap(),
            declare("org:lib2:1.1"),
        ]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert_eq!(resolved(&result), vec!["org:lib1:1.0", "org:lib2:1.1"]);
        assert!(result.problems().is_empty());

        let lib2 = result.dependency_tree().first(&id("org:lib2")).unwrap();
        assert_eq!(lib2.declared_version.as_str(), "[1.0,1.2]");
    }

    #[test]
    fn dynamic_versions_pin_to_highest_match() {
        let repository = FakeRepository::new()
            .module("org:app:1.0", &["org:lib:1.+"])
            .module("org:lib:1.1", &[])
            .module("org:lib:1.9", &[])
            .module("org:lib:2.0", &[]);
        let set = DependencySet::of(vec![declare("org:app:1.0")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        assert_eq!(
            result.unwrap().version_of(&id("org:lib")).unwrap().as_str(),
            "1.9"
        );
    }

    #[test]
    fn cycles_terminate_with_each_module_once() {
        let repository = FakeRepository::new()
            .module("org:a:1.0", &["org:b:1.0"])
            .module("org:b:1.0", &["org:a:1.0"]);
        let set = DependencySet::of(vec![declare("org:a:1.0")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert_eq!(names(&result.files()), vec!["a-1.0.jar", "b-1.0.jar"]);
        assert_eq!(result.dependency_tree().flatten().len(), 2);
    }

    #[test]
    fn edge_exclusion_prunes_only_its_subtree() {
        let repository = FakeRepository::new()
            .module_with("org:e:1.0", &["org:x:1.0"], Vec::new())
            .module("org:x:1.0", &["org:m:1.0"])
            .module("org:s:1.0", &["org:m:1.0"])
            .module("org:m:1.0", &[]);

        let excluded = DependencySet::of(vec![declare("org:e:1.0")
            .with_exclusion(Exclusion::parse("org:m").unwrap())]);
        let (result, _, _) = run(repository, &excluded, ResolutionParameters::default());
        let result = result.unwrap();
        assert!(result.contains(&id("org:x")));
        assert!(!result.contains(&id("org:m")));

        let repository = FakeRepository::new()
            .module("org:e:1.0", &["org:x:1.0"])
            .module("org:x:1.0", &["org:m:1.0"])
            .module("org:s:1.0", &["org:m:1.0"])
            .module("org:m:1.0", &[]);
        let with_sibling = excluded.and(declare("org:s:1.0"));
        let (result, _, _) = run(repository, &with_sibling, ResolutionParameters::default());
        let result = result.unwrap();
        assert!(result.contains(&id("org:m")));
        let e = result.dependency_tree().first(&id("org:e")).unwrap();
        assert!(!e.children[0].children().iter().any(|n| n
            .as_module()
            .is_some_and(|m| m.module() == &id("org:m"))));
    }

    #[test]
    fn metadata_exclusions_apply_below_the_edge() {
        let repository = FakeRepository::new()
            .module_with("org:app:1.0", &["org:x:1.0"], vec![(0, "org:*")])
            .module("org:x:1.0", &["org:m:1.0"])
            .module("org:m:1.0", &[]);
        let set = DependencySet::of(vec![declare("org:app:1.0")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert!(result.contains(&id("org:x")));
        assert!(!result.contains(&id("org:m")));
    }

    #[test]
    fn global_exclusions_skip_transitive_edges_only() {
        let repository = FakeRepository::new()
            .module("org:app:1.0", &["log:log:1.0"])
            .module("log:log:1.0", &[]);
        let set = DependencySet::of(vec![declare("org:app:1.0")])
            .with_global_exclusion(Exclusion::of_group("log"));
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        assert!(!result.unwrap().contains(&id("log:log")));

        let repository = FakeRepository::new().module("log:log:1.0", &[]);
        let direct = DependencySet::of(vec![declare("log:log:1.0")])
            .with_global_exclusion(Exclusion::of_group("log"));
        let (result, _, _) = run(repository, &direct, ResolutionParameters::default());
        assert!(result.unwrap().contains(&id("log:log")));
    }

    #[test]
    fn equal_depth_tie_goes_to_higher_version() {
        let repository = FakeRepository::new()
            .module("org:p:1.0", &["org:a:1.2"])
            .module("org:q:1.0", &["org:a:1.10"])
            .module("org:a:1.2", &[])
            .module("org:a:1.10", &[]);
        let set = DependencySet::of(vec![declare("org:p:1.0"), declare("org:q:1.0")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        assert_eq!(
            result.unwrap().version_of(&id("org:a")).unwrap().as_str(),
            "1.10"
        );
    }

    #[test]
    fn evicted_versions_do_not_contribute_their_dependencies() {
        let repository = FakeRepository::new()
            .module("org:a:1.0", &[])
            .module("org:b:1.0", &["org:a:0.9"])
            .module("org:a:0.9", &["org:old:1.0"])
            .module("org:old:1.0", &[]);
        let set = DependencySet::of(vec![declare("org:a:1.0"), declare("org:b:1.0")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert!(!result.contains(&id("org:old")));
        assert_eq!(resolved(&result), vec!["org:a:1.0", "org:b:1.0"]);
    }

    #[test]
    fn version_provider_fills_missing_versions() {
        let repository = FakeRepository::new()
            .module("org:app:1.0", &["org:lib"])
            .module("org:lib:3.0", &[]);
        let set = DependencySet::of(vec![declare("org:app")])
            .with_version_override(id("org:app"), Version::new("1.0"))
            .with_version_override(id("org:lib"), Version::new("3.0"));
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        assert_eq!(resolved(&result.unwrap()), vec!["org:app:1.0", "org:lib:3.0"]);
    }

    #[test]
    fn forced_strategy_overrides_transitive_versions() {
        let repository = FakeRepository::new()
            .module("org:app:1.0", &["org:lib:1.0"])
            .module("org:lib:1.0", &[])
            .module("org:lib:2.0", &[]);
        let set = DependencySet::of(vec![declare("org:app:1.0")])
            .with_version_provider(VersionProvider::new().and(id("org:lib"), Version::new("2.0")));

        let (nearest, _, _) = run(repository.duplicate(), &set, ResolutionParameters::default());
        assert_eq!(nearest.unwrap().version_of(&id("org:lib")).unwrap().as_str(), "1.0");

        let params = ResolutionParameters::default().with_strategy(ConflictStrategy::Forced);
        let (forced, _, _) = run(repository, &set, params);
        assert_eq!(forced.unwrap().version_of(&id("org:lib")).unwrap().as_str(), "2.0");
    }

    #[test]
    fn forced_version_subtree_takes_part_in_conflicts() {
        let repository = FakeRepository::new()
            .module("org:app:1.0", &["org:lib:1.0"])
            .module("org:lib:1.0", &[])
            .module("org:lib:2.0", &["org:z:3.0"])
            .module("org:y:1.0", &["org:w:1.0"])
            .module("org:w:1.0", &["org:z:1.0"])
            .module("org:z:1.0", &[])
            .module("org:z:3.0", &[]);
        let set = DependencySet::of(vec![declare("org:app:1.0"), declare("org:y:1.0")])
            .with_version_provider(VersionProvider::new().and(id("org:lib"), Version::new("2.0")));
        let params = ResolutionParameters::default().with_strategy(ConflictStrategy::Forced);

        let (result, _, _) = run(repository, &set, params);
        let result = result.unwrap();
        assert_eq!(result.version_of(&id("org:lib")).unwrap().as_str(), "2.0");
        assert_eq!(result.version_of(&id("org:z")).unwrap().as_str(), "3.0");
        assert!(result.problems().is_empty(), "{:?}", result.problems());
    }

    #[test]
    fn missing_metadata_is_a_problem_unless_fail_fast() {
        let repository = FakeRepository::new().module("org:app:1.0", &["org:gone:1.0"]);
        let set = DependencySet::of(vec![declare("org:app:1.0")]);

        let (result, _, logger) = run(repository.duplicate(), &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert_eq!(result.problems().len(), 1);
        assert!(result.problems()[0].contains("org:gone:1.0"), "{:?}", result.problems());
        assert!(result.assert_no_error().is_err());
        assert!(result.contains(&id("org:gone")));
        assert_eq!(names(&result.files()), vec!["app-1.0.jar"]);
        assert_eq!(logger.messages(LogLevel::Warn).len(), 1);

        let params = ResolutionParameters::default().with_fail_fast(true);
        let (failed, _, logger) = run(repository, &set, params);
        match failed {
            Err(EngineError::Resolution { problems }) => {
                assert_eq!(problems.len(), 1);
                assert!(problems[0].starts_with("unresolved dependency org:gone:1.0"));
            }
            other => panic!("expected a resolution error, got {other:?}"),
        }
        assert_eq!(logger.messages(LogLevel::Error).len(), 1);
    }

    #[test]
    fn missing_version_is_reported() {
        let repository = FakeRepository::new();
        let set = DependencySet::of(vec![declare("org:nothing")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert_eq!(result.problems(), &["no version declared for org:nothing".to_owned()]);
        assert!(result.dependency_tree().roots().is_empty());
    }

    #[test]
    fn unmatched_dynamic_version_is_reported() {
        let repository = FakeRepository::new().module("org:lib:1.0", &[]);
        let set = DependencySet::of(vec![declare("org:lib:2.+")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert_eq!(result.problems(), &["no version of org:lib matches 2.+".to_owned()]);
    }

    #[test]
    fn missing_artifact_is_a_warning() {
        let repository = FakeRepository::new()
            .module("org:app:1.0", &["org:lib:1.0"])
            .module("org:lib:1.0", &[])
            .without_artifact("org:lib:1.0");
        let set = DependencySet::of(vec![declare("org:app:1.0")]);

        let (result, _, _) = run(repository.duplicate(), &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert!(result.assert_no_error().is_ok());
        assert!(result.contains(&id("org:lib")));
        assert!(result.files_for(&id("org:lib")).is_empty());
        assert_eq!(names(&result.files()), vec!["app-1.0.jar"]);
        assert!(matches!(
            &result.warnings()[0],
            ResolveWarning::MissingArtifact { coordinate, .. } if coordinate.to_string() == "org:lib:1.0"
        ));

        let params = ResolutionParameters::default().with_fail_fast(true);
        let (failed, _, _) = run(repository, &set, params);
        assert!(matches!(failed, Err(EngineError::Resolution { .. })));
    }

    #[test]
    fn declared_classifier_fetches_only_that_artifact() {
        let repository = FakeRepository::new().module("org:lib:1.0", &[]);
        let set = DependencySet::of(vec![declare("org:lib:sources:1.0")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        assert_eq!(names(&result.unwrap().files()), vec!["lib-1.0-sources.jar"]);
    }

    #[test]
    fn classifier_node_carries_only_its_own_artifact() {
        let repository = FakeRepository::new().module("org:lib:1.0", &[]);
        let set = DependencySet::of(vec![declare("org:lib:1.0"), declare("org:lib:sources:1.0")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let result = result.unwrap();

        let roots = result.dependency_tree().roots();
        let main = roots[0].as_module().unwrap();
        let sources = roots[1].as_module().unwrap();
        assert_eq!(names(&main.files), vec!["lib-1.0.jar"]);
        assert_eq!(names(&sources.files), vec!["lib-1.0-sources.jar"]);
        assert_eq!(
            names(&result.files()),
            vec!["lib-1.0.jar", "lib-1.0-sources.jar"]
        );
        assert_eq!(result.files_for(&id("org:lib")).len(), 2);
    }

    #[test]
    fn file_declarations_keep_order_and_warn_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("local.jar");
        std::fs::write(&local, b"jar").unwrap();
        let gone = dir.path().join("gone.jar");

        let repository = FakeRepository::new().module("org:lib:1.0", &[]);
        let set = DependencySet::of(vec![
            DependencyDeclaration::files(vec![local.clone(), gone.clone()]),
            declare("org:lib:1.0"),
        ]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let result = result.unwrap();
        assert_eq!(names(&result.files()), vec!["local.jar", "lib-1.0.jar"]);
        assert_eq!(result.warnings(), &[ResolveWarning::MissingFile { path: gone }]);
        assert!(result.assert_no_error().is_ok());
    }

    #[test]
    fn declarations_outside_the_configuration_are_skipped() {
        let repository = FakeRepository::new()
            .module("org:lib:1.0", &[])
            .module("org:junit:4.0", &[]);
        let set = DependencySet::of(vec![
            declare("org:lib:1.0"),
            declare("org:junit:4.0").mapped("test -> default").unwrap(),
        ]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        assert_eq!(resolved(&result.unwrap()), vec!["org:lib:1.0"]);
    }

    #[test]
    fn metadata_is_fetched_once_per_module_version() {
        let repository = FakeRepository::new()
            .module("org:p:1.0", &["org:shared:1.0"])
            .module("org:q:1.0", &["org:shared:1.0"])
            .module("org:shared:1.0", &[]);
        let set = DependencySet::of(vec![declare("org:p:1.0"), declare("org:q:1.0")]);
        let (result, repository, _) = run(repository, &set, ResolutionParameters::default());
        assert!(result.unwrap().problems().is_empty());
        assert_eq!(repository.metadata_calls(), 3);
    }

    #[test]
    fn verbose_traces_only_when_requested() {
        let (repository, set) = a_near_and_far();
        let (_, _, quiet) = run(repository, &set, ResolutionParameters::default());
        assert!(quiet.messages(LogLevel::Verbose).is_empty());

        let (repository, set) = a_near_and_far();
        let params = ResolutionParameters::default().with_verbose(true);
        let (_, _, loud) = run(repository, &set, params);
        let traces = loud.messages(LogLevel::Verbose);
        assert!(traces.iter().any(|t| t == "resolution initialized -> traversing"));
        assert!(traces.iter().any(|t| t.starts_with("conflict on org:a")), "{traces:?}");
    }

    #[test]
    fn repeated_resolution_is_identical() {
        let (repository, set) = a_near_and_far();
        let repository: Arc<FakeRepository> = Arc::new(repository);
        let resolver = DependencyResolver::new(repository, Arc::new(MemoryLogger::new()));
        let params = ResolutionParameters::default();
        let first = resolver.resolve(&set, "runtime", &params).unwrap();
        let second = resolver.resolve(&set, "runtime", &params).unwrap();
        assert_eq!(first.dependency_tree(), second.dependency_tree());
        assert_eq!(first.files(), second.files());
    }

    #[test]
    fn render_shows_declared_versions() {
        let repository = FakeRepository::new()
            .module("org:lib1:1.0", &["org:lib2:[1.0,1.2]"])
            .module("org:lib2:1.1", &[]);
        let set = DependencySet::of(vec![declare("org:lib1:1.0"), declare("org:lib2:1.1")]);
        let (result, _, _) = run(repository, &set, ResolutionParameters::default());
        let rendered = result.unwrap().dependency_tree().render();
        assert_eq!(
            rendered,
            "org:lib1:1.0\n    org:lib2:1.1 as [1.0,1.2]\norg:lib2:1.1 (*)\n"
        );
    }

    fn chain_repository(length: usize) -> FakeRepository {
        let mut repository = FakeRepository::new();
        for i in 0..length {
            let next = format!("org:m{}:1.0", i + 1);
            let deps: Vec<&str> = if i + 1 < length { vec![next.as_str()] } else { vec![] };
            repository = repository.module(&format!("org:m{i}:1.0"), &deps);
        }
        repository
    }

    proptest! {
        /// Resolving a linear chain always yields every module once, in chain order.
        #[test]
        fn chains_resolve_in_order(length in 1usize..8) {
            let set = DependencySet::of(vec![declare("org:m0:1.0")]);
            let (result, _, _) = run(chain_repository(length), &set, ResolutionParameters::default());
            let expected: Vec<String> = (0..length).map(|i| format!("m{i}-1.0.jar")).collect();
            prop_assert_eq!(names(&result.unwrap().files()), expected);
        }
    }

    #[test]
    fn fake_repository_lists_versions() {
        let repository = FakeRepository::new().module("org:a:2.0", &[]).module("org:a:1.0", &[]);
        let versions = repository.available_versions(&id("org:a")).unwrap();
        assert_eq!(versions, vec![Version::new("1.0"), Version::new("2.0")]);
        assert!(Path::new(repository.dir.path()).is_dir());
    }
}
