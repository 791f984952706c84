//! An ordered set of repositories sharing one cache directory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use caravan_model::{Coordinate, ModuleId, Version};
use caravan_util::download::HttpClient;
use dashmap::DashMap;

use crate::access::RepositoryAccess;
use crate::backend::{Descriptor, Endpoint, FetchContext, RepositoryBackend};
use crate::error::RepoError;
use crate::metadata::ModuleMetadata;
use crate::pom::{self, Pom};

#[derive(Debug, Clone)]
struct FetchFailure {
    not_found: bool,
    message: String,
}

type SharedFetch = Arc<OnceLock<Result<PathBuf, FetchFailure>>>;

/// Repositories queried in order: the first one holding an item serves it.
///
/// Concurrent callers asking for the same artifact wait for the fetch already
/// in flight and share its outcome. Finished fetches are forgotten, so a later
/// call retries failures and honours `refresh`; only the disk cache persists.
#[derive(Debug)]
pub struct RepositorySet {
    backends: Vec<RepositoryBackend>,
    cache_root: PathBuf,
    client: HttpClient,
    downloads: DashMap<Coordinate, SharedFetch>,
}

impl RepositorySet {
    pub fn new(backends: Vec<RepositoryBackend>, cache_root: &Path) -> Self {
        Self {
            backends,
            cache_root: cache_root.to_path_buf(),
            client: HttpClient::new(),
            downloads: DashMap::new(),
        }
    }

    /// Build a set from configured endpoints, in order.
    ///
    /// # Errors
    /// Returns `RepoError::InvalidRepository` if an endpoint URL is unusable.
    pub fn from_endpoints(endpoints: &[Endpoint], cache_root: &Path) -> Result<Self, RepoError> {
        let backends = endpoints
            .iter()
            .map(RepositoryBackend::from_endpoint)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(backends, cache_root))
    }

    pub fn backends(&self) -> &[RepositoryBackend] {
        &self.backends
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    fn ctx(&self) -> FetchContext<'_> {
        FetchContext {
            client: &self.client,
            cache_root: &self.cache_root,
        }
    }

    /// Try each backend in order. Not-found answers move on to the next
    /// backend; other failures are reported only if no backend succeeds.
    fn first_success<T>(
        &self,
        what: &str,
        fetch: impl Fn(&RepositoryBackend) -> Result<T, RepoError>,
    ) -> Result<T, RepoError> {
        let mut failures = Vec::new();
        for backend in &self.backends {
            match fetch(backend) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_not_found() => log::trace!("{what}: not in {backend}"),
                Err(e) => {
                    log::debug!("{what}: {backend} failed: {e}");
                    failures.push(format!("{backend}: {e}"));
                }
            }
        }
        if failures.is_empty() {
            Err(RepoError::NotFound {
                what: what.to_owned(),
            })
        } else {
            Err(RepoError::Failed {
                what: what.to_owned(),
                message: failures.join("; "),
            })
        }
    }

    fn load_pom(&self, coordinate: &Coordinate) -> Result<Pom, RepoError> {
        let key = coordinate.main();
        let what = format!("descriptor of {key}");
        let descriptor = self.first_success(&what, |b| b.fetch_descriptor(&key, self.ctx()))?;
        let Descriptor::Pom { xml, location } = descriptor else {
            return Err(RepoError::InvalidMetadata {
                location: key.to_string(),
                message: "expected a POM, found an Ivy descriptor".to_owned(),
            });
        };
        pom::parse(&xml, &location)
    }

    fn fetch_artifact_uncached(
        &self,
        coordinate: &Coordinate,
        refresh: bool,
    ) -> Result<PathBuf, FetchFailure> {
        let what = format!("artifact {coordinate}");
        self.first_success(&what, |b| b.fetch_artifact(coordinate, refresh, self.ctx()))
            .map_err(|e| match e {
                RepoError::NotFound { what } => FetchFailure {
                    not_found: true,
                    message: what,
                },
                RepoError::Failed { message, .. } => FetchFailure {
                    not_found: false,
                    message,
                },
                other => FetchFailure {
                    not_found: false,
                    message: other.to_string(),
                },
            })
    }
}

impl RepositoryAccess for RepositorySet {
    fn available_versions(&self, module: &ModuleId) -> Result<Vec<Version>, RepoError> {
        let mut versions = Vec::new();
        let mut answered = false;
        let mut unsupported = 0usize;
        let mut failures = Vec::new();
        for backend in &self.backends {
            match backend.list_versions(module, self.ctx()) {
                Ok(found) => {
                    answered = true;
                    versions.extend(found);
                }
                Err(e) if e.is_not_found() => answered = true,
                Err(e) if e.is_unsupported() => unsupported += 1,
                Err(e) => failures.push(format!("{backend}: {e}")),
            }
        }

        let what = format!("versions of {module}");
        if !answered && !failures.is_empty() {
            return Err(RepoError::Failed {
                what,
                message: failures.join("; "),
            });
        }
        if !answered && unsupported > 0 {
            return Err(RepoError::Unsupported {
                operation: "version listing".to_owned(),
                repository: format!("{unsupported} configured repositories"),
            });
        }
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    fn fetch_metadata(&self, coordinate: &Coordinate) -> Result<ModuleMetadata, RepoError> {
        let main = coordinate.main();
        let what = format!("descriptor of {main}");
        match self.first_success(&what, |b| b.fetch_descriptor(&main, self.ctx()))? {
            Descriptor::Pom { xml, location } => {
                let parsed = pom::parse(&xml, &location)?;
                pom::to_metadata(&main, &parsed, |parent| self.load_pom(parent))
            }
            Descriptor::Ivy { xml, location } => crate::ivy::to_metadata(&main, &xml, &location),
        }
    }

    fn fetch_artifact(&self, coordinate: &Coordinate, refresh: bool) -> Result<PathBuf, RepoError> {
        let cell = Arc::clone(&self.downloads.entry(coordinate.clone()).or_default());
        let outcome = cell.get_or_init(|| self.fetch_artifact_uncached(coordinate, refresh));
        self.downloads
            .remove_if(coordinate, |_, in_flight| Arc::ptr_eq(in_flight, &cell));
        match outcome {
            Ok(path) => Ok(path.clone()),
            Err(failure) if failure.not_found => Err(RepoError::NotFound {
                what: failure.message.clone(),
            }),
            Err(failure) => Err(RepoError::Failed {
                what: format!("artifact {coordinate}"),
                message: failure.message.clone(),
            }),
        }
    }
}
