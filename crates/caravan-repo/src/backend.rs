//! Repository backends, selected once from an endpoint's URL scheme.

use std::fmt;
use std::path::{Path, PathBuf};

use caravan_model::{Coordinate, ModuleId, Version};
use caravan_util::artifact::{ensure_artifact, validate_segment, ArtifactRequest};
use caravan_util::download::{BasicAuth, HttpClient};
use caravan_util::error::UtilError;
use caravan_util::hash::parse_sidecar;

use crate::error::RepoError;

/// Maven Central, used when no repository is configured.
pub const MAVEN_CENTRAL: &str = "https://repo.maven.apache.org/maven2";

/// How modules are laid out inside a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// `group/path/name/version/name-version[-classifier].ext` with a `.pom` descriptor.
    #[default]
    Maven,
    /// `org/module/rev/ivys/ivy.xml` and `org/module/rev/{ext}s/module[-classifier].ext`.
    Ivy,
}

/// A configured repository location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub layout: Layout,
    pub auth: Option<BasicAuth>,
    /// Verify `.sha256` sidecars when the repository publishes them.
    pub checksums: bool,
}

impl Endpoint {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim().to_owned(),
            layout: Layout::Maven,
            auth: None,
            checksums: false,
        }
    }

    pub fn maven_central() -> Self {
        Self::new(MAVEN_CENTRAL)
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_checksums(mut self, checksums: bool) -> Self {
        self.checksums = checksums;
        self
    }
}

/// A module descriptor as fetched, before translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    Pom { xml: String, location: String },
    Ivy { xml: String, location: String },
}

/// Shared resources a backend needs to fetch anything remote.
#[derive(Debug, Clone, Copy)]
pub struct FetchContext<'a> {
    pub client: &'a HttpClient,
    pub cache_root: &'a Path,
}

/// One repository. Local backends serve files in place; HTTP backends
/// download into the shared cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryBackend {
    LocalFileSystem {
        root: PathBuf,
        layout: Layout,
    },
    HttpMavenLayout {
        base: String,
        auth: Option<BasicAuth>,
        checksums: bool,
    },
    HttpIvyLayout {
        base: String,
        auth: Option<BasicAuth>,
        checksums: bool,
    },
}

fn validate(coordinate: &Coordinate) -> Result<(), RepoError> {
    validate_segment(coordinate.module().group())?;
    validate_segment(coordinate.module().name())?;
    validate_segment(coordinate.version().as_str())?;
    if let Some(classifier) = coordinate.classifier() {
        validate_segment(classifier)?;
    }
    validate_segment(coordinate.extension())?;
    Ok(())
}

fn ivy_module_dir(module: &ModuleId) -> String {
    format!("{}/{}", module.group(), module.name())
}

fn ivy_descriptor_path(coordinate: &Coordinate) -> String {
    format!(
        "{}/{}/ivys/ivy.xml",
        ivy_module_dir(coordinate.module()),
        coordinate.version().as_str()
    )
}

fn ivy_artifact_path(coordinate: &Coordinate) -> String {
    let ext = coordinate.extension();
    let file = match coordinate.classifier() {
        Some(classifier) => format!("{}-{classifier}.{ext}", coordinate.module().name()),
        None => format!("{}.{ext}", coordinate.module().name()),
    };
    format!(
        "{}/{}/{ext}s/{file}",
        ivy_module_dir(coordinate.module()),
        coordinate.version().as_str()
    )
}

fn maven_descriptor_path(coordinate: &Coordinate) -> String {
    let main = coordinate.main();
    format!(
        "{}/{}",
        main.repository_dir(),
        main.filename_with_extension("pom")
    )
}

fn maven_listing_path(module: &ModuleId) -> String {
    format!("{}/{}/maven-metadata.xml", module.group_path(), module.name())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

fn read_text(path: &Path) -> Result<String, RepoError> {
    std::fs::read_to_string(path).map_err(|source| {
        RepoError::Util(UtilError::Io {
            path: path.display().to_string(),
            source,
        })
    })
}

fn not_found(what: impl fmt::Display) -> RepoError {
    RepoError::NotFound {
        what: what.to_string(),
    }
}

impl RepositoryBackend {
    /// Select the backend for `endpoint`: `http(s)://` URLs are remote,
    /// `file://` URLs and plain paths are local.
    ///
    /// # Errors
    /// Returns `RepoError::InvalidRepository` for an empty URL or an
    /// unsupported scheme.
    pub fn from_endpoint(endpoint: &Endpoint) -> Result<Self, RepoError> {
        let url = endpoint.url.as_str();
        let invalid = |reason: &str| RepoError::InvalidRepository {
            url: url.to_owned(),
            reason: reason.to_owned(),
        };
        if url.is_empty() {
            return Err(invalid("url is empty"));
        }

        if url.starts_with("http://") || url.starts_with("https://") {
            let base = url.trim_end_matches('/').to_owned();
            let auth = endpoint.auth.clone();
            let checksums = endpoint.checksums;
            return Ok(match endpoint.layout {
                Layout::Maven => Self::HttpMavenLayout {
                    base,
                    auth,
                    checksums,
                },
                Layout::Ivy => Self::HttpIvyLayout {
                    base,
                    auth,
                    checksums,
                },
            });
        }

        let root = match url.strip_prefix("file://") {
            Some(path) => PathBuf::from(path),
            None if url.contains("://") => return Err(invalid("unsupported url scheme")),
            None => PathBuf::from(url),
        };
        Ok(Self::LocalFileSystem {
            root,
            layout: endpoint.layout,
        })
    }

    /// Versions of `module` this repository holds, in no particular order.
    ///
    /// # Errors
    /// Returns `RepoError::Unsupported` for Ivy repositories over HTTP, and
    /// transport or parse errors otherwise.
    pub fn list_versions(
        &self,
        module: &ModuleId,
        ctx: FetchContext<'_>,
    ) -> Result<Vec<Version>, RepoError> {
        match self {
            Self::LocalFileSystem { root, layout } => {
                let dir = match layout {
                    Layout::Maven => root.join(module.group_path()).join(module.name()),
                    Layout::Ivy => root.join(module.group()).join(module.name()),
                };
                let names = caravan_util::fs::list_dirs(&dir)?;
                Ok(names.iter().map(|n| Version::new(n)).collect())
            }
            Self::HttpMavenLayout { base, auth, .. } => {
                let url = join_url(base, &maven_listing_path(module));
                let xml = ctx.client.get_text(&url, auth.as_ref())?;
                crate::pom::parse_versions(&xml, &url)
            }
            Self::HttpIvyLayout { base, .. } => Err(RepoError::Unsupported {
                operation: "version listing".to_owned(),
                repository: base.clone(),
            }),
        }
    }

    /// Fetch the descriptor of `coordinate`.
    ///
    /// # Errors
    /// Returns `RepoError::NotFound` (or a not-found `Util` error) when this
    /// repository has no descriptor for the module version.
    pub fn fetch_descriptor(
        &self,
        coordinate: &Coordinate,
        ctx: FetchContext<'_>,
    ) -> Result<Descriptor, RepoError> {
        validate(coordinate)?;
        let refresh = coordinate.version().is_snapshot();
        match self {
            Self::LocalFileSystem { root, layout } => {
                let path = match layout {
                    Layout::Maven => root.join(maven_descriptor_path(coordinate)),
                    Layout::Ivy => root.join(ivy_descriptor_path(coordinate)),
                };
                if !path.is_file() {
                    return Err(not_found(format_args!("descriptor of {coordinate}")));
                }
                let xml = read_text(&path)?;
                let location = path.display().to_string();
                Ok(match layout {
                    Layout::Maven => Descriptor::Pom { xml, location },
                    Layout::Ivy => Descriptor::Ivy { xml, location },
                })
            }
            Self::HttpMavenLayout {
                base,
                auth,
                checksums,
            } => {
                let rel = maven_descriptor_path(coordinate);
                let url = join_url(base, &rel);
                let dest = ctx.cache_root.join(&rel);
                download(ctx, &url, &dest, refresh, auth.as_ref(), *checksums)?;
                Ok(Descriptor::Pom {
                    xml: read_text(&dest)?,
                    location: url,
                })
            }
            Self::HttpIvyLayout {
                base,
                auth,
                checksums,
            } => {
                let rel = ivy_descriptor_path(coordinate);
                let url = join_url(base, &rel);
                let dest = ctx.cache_root.join(&rel);
                download(ctx, &url, &dest, refresh, auth.as_ref(), *checksums)?;
                Ok(Descriptor::Ivy {
                    xml: read_text(&dest)?,
                    location: url,
                })
            }
        }
    }

    /// Return a local path holding the artifact designated by `coordinate`.
    ///
    /// # Errors
    /// Returns a not-found error when this repository lacks the artifact, and
    /// transport, checksum or I/O errors otherwise.
    pub fn fetch_artifact(
        &self,
        coordinate: &Coordinate,
        refresh: bool,
        ctx: FetchContext<'_>,
    ) -> Result<PathBuf, RepoError> {
        validate(coordinate)?;
        let refresh = refresh || coordinate.version().is_snapshot();
        match self {
            Self::LocalFileSystem { root, layout } => {
                let path = match layout {
                    Layout::Maven => root.join(coordinate.repository_path()),
                    Layout::Ivy => root.join(ivy_artifact_path(coordinate)),
                };
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(not_found(format_args!("artifact {coordinate}")))
                }
            }
            Self::HttpMavenLayout {
                base,
                auth,
                checksums,
            } => {
                let url = coordinate.to_url(base);
                let dest = coordinate.cache_path(ctx.cache_root);
                download(ctx, &url, &dest, refresh, auth.as_ref(), *checksums)
            }
            Self::HttpIvyLayout {
                base,
                auth,
                checksums,
            } => {
                let rel = ivy_artifact_path(coordinate);
                let url = join_url(base, &rel);
                let dest = ctx.cache_root.join(&rel);
                download(ctx, &url, &dest, refresh, auth.as_ref(), *checksums)
            }
        }
    }
}

/// Download into the cache unless the file is already there.
fn download(
    ctx: FetchContext<'_>,
    url: &str,
    dest: &Path,
    refresh: bool,
    auth: Option<&BasicAuth>,
    checksums: bool,
) -> Result<PathBuf, RepoError> {
    if dest.is_file() && !refresh {
        return Ok(dest.to_path_buf());
    }
    let expected = if checksums {
        match ctx.client.get_text(&format!("{url}.sha256"), auth) {
            Ok(sidecar) => parse_sidecar(&sidecar),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        }
    } else {
        None
    };
    let result = ensure_artifact(
        ctx.client,
        &ArtifactRequest {
            url,
            dest,
            expected_sha256: expected.as_deref(),
            auth,
            refresh,
        },
    )?;
    log::debug!("cached {url} at {}", result.path.display());
    Ok(result.path)
}

impl fmt::Display for RepositoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalFileSystem { root, .. } => write!(f, "{}", root.display()),
            Self::HttpMavenLayout { base, .. } | Self::HttpIvyLayout { base, .. } => {
                f.write_str(base)
            }
        }
    }
}
