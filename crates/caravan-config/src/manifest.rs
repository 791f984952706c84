use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use caravan_engine::{ConflictStrategy, ResolutionParameters};
use caravan_model::{
    DependencyDeclaration, DependencySet, Exclusion, ModuleId, Transitivity, Version,
    VersionProvider,
};
use caravan_repo::{Endpoint, Layout};
use caravan_util::download::BasicAuth;
use serde::Deserialize;

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "caravan.toml";

/// The `caravan.toml` project manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub project: Project,
    /// Patterns excluded from every transitive edge.
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
    /// `"group:name"` (or `"group:prefix*"`) to version.
    #[serde(default)]
    pub versions: BTreeMap<String, String>,
    /// Where the manifest was read from.
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resolution {
    #[serde(default = "default_configuration")]
    pub configuration: String,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default)]
    pub refresh: bool,
}

fn default_configuration() -> String {
    "runtime".to_owned()
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            configuration: default_configuration(),
            strategy: None,
            fail_fast: false,
            refresh: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutName {
    #[default]
    Maven,
    Ivy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryEntry {
    /// `http(s)://` URL, `file://` URL, or a plain path relative to the manifest.
    pub url: String,
    #[serde(default)]
    pub layout: LayoutName,
    #[serde(default)]
    pub username: Option<String>,
    /// Environment variable holding the password.
    #[serde(default)]
    pub password_env: Option<String>,
    #[serde(default)]
    pub checksums: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitivityName {
    None,
    Compile,
    Runtime,
}

impl From<TransitivityName> for Transitivity {
    fn from(name: TransitivityName) -> Self {
        match name {
            TransitivityName::None => Self::None,
            TransitivityName::Compile => Self::Compile,
            TransitivityName::Runtime => Self::Runtime,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComputedEntry {
    pub description: String,
    pub files: Vec<PathBuf>,
}

/// One `[[dependencies]]` entry. Exactly one of `coordinate`, `files`, and
/// `computed` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyEntry {
    #[serde(default)]
    pub coordinate: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<PathBuf>>,
    #[serde(default)]
    pub computed: Option<ComputedEntry>,
    #[serde(default)]
    pub mapping: Option<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub transitivity: Option<TransitivityName>,
}

impl Manifest {
    /// Read, parse, and validate a `caravan.toml` from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// has an entry that does not validate.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Parse and validate manifest `content` as if read from `path`.
    ///
    /// # Errors
    /// Returns an error for invalid TOML or an entry that does not validate.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let mut manifest: Manifest = toml::from_str(content).map_err(|e| ManifestError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        manifest.path = path.to_path_buf();
        manifest.dependency_set()?;
        manifest.parameters()?;
        manifest.check_repositories()?;
        Ok(manifest)
    }

    fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    fn invalid(&self, entry: &str, message: impl ToString) -> ManifestError {
        ManifestError::Invalid {
            path: self.path.display().to_string(),
            entry: entry.to_owned(),
            message: message.to_string(),
        }
    }

    fn declaration(
        &self,
        entry: &DependencyEntry,
        name: &str,
    ) -> Result<DependencyDeclaration, ManifestError> {
        let base = self.base_dir();
        let declaration = match (&entry.coordinate, &entry.files, &entry.computed) {
            (Some(coordinate), None, None) => {
                DependencyDeclaration::parse(coordinate).map_err(|e| self.invalid(name, e))?
            }
            (None, Some(files), None) => {
                DependencyDeclaration::files(files.iter().map(|f| base.join(f)).collect())
            }
            (None, None, Some(computed)) => DependencyDeclaration::computed(
                &computed.description,
                computed.files.iter().map(|f| base.join(f)).collect(),
            ),
            _ => {
                return Err(self.invalid(
                    name,
                    "expected exactly one of `coordinate`, `files`, or `computed`",
                ))
            }
        };

        let mut declaration = match &entry.mapping {
            Some(expression) => declaration
                .mapped(expression)
                .map_err(|e| self.invalid(name, e))?,
            None => declaration,
        };
        if !entry.exclusions.is_empty() && entry.coordinate.is_none() {
            return Err(self.invalid(name, "exclusions only apply to `coordinate` dependencies"));
        }
        for pattern in &entry.exclusions {
            let exclusion = Exclusion::parse(pattern).map_err(|e| self.invalid(name, e))?;
            declaration = declaration.with_exclusion(exclusion);
        }
        if let Some(transitivity) = entry.transitivity {
            declaration = declaration.with_transitivity(transitivity.into());
        }
        Ok(declaration)
    }

    /// The declared dependencies with global exclusions and `[versions]`.
    ///
    /// Relative file paths are resolved against the manifest's directory.
    ///
    /// # Errors
    /// Returns `ManifestError::Invalid` naming the first entry that does not parse.
    pub fn dependency_set(&self) -> Result<DependencySet, ManifestError> {
        let declarations = self
            .dependencies
            .iter()
            .enumerate()
            .map(|(index, entry)| self.declaration(entry, &format!("dependencies[{index}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let mut set = DependencySet::of(declarations);
        for (index, pattern) in self.exclusions.iter().enumerate() {
            let exclusion = Exclusion::parse(pattern)
                .map_err(|e| self.invalid(&format!("exclusions[{index}]"), e))?;
            set = set.with_global_exclusion(exclusion);
        }

        let mut provider = VersionProvider::new();
        for (module, version) in &self.versions {
            let id = ModuleId::parse(module)
                .map_err(|e| self.invalid(&format!("versions.\"{module}\""), e))?;
            if version.trim().is_empty() {
                return Err(self.invalid(&format!("versions.\"{module}\""), "version is empty"));
            }
            provider = provider.and(id, Version::new(version));
        }
        Ok(set.with_version_provider(provider))
    }

    /// Resolution parameters from `[resolution]`.
    ///
    /// # Errors
    /// Returns `ManifestError::Invalid` for an unknown strategy.
    pub fn parameters(&self) -> Result<ResolutionParameters, ManifestError> {
        let strategy = match &self.resolution.strategy {
            Some(name) => name
                .parse::<ConflictStrategy>()
                .map_err(|e| self.invalid("resolution.strategy", e))?,
            None => ConflictStrategy::default(),
        };
        Ok(ResolutionParameters::default()
            .with_strategy(strategy)
            .with_fail_fast(self.resolution.fail_fast)
            .with_refresh(self.resolution.refresh))
    }

    pub fn configuration(&self) -> &str {
        &self.resolution.configuration
    }

    fn check_repositories(&self) -> Result<(), ManifestError> {
        for (index, repository) in self.repositories.iter().enumerate() {
            let name = format!("repositories[{index}]");
            if repository.url.trim().is_empty() {
                return Err(self.invalid(&name, "url is empty"));
            }
            if repository.username.is_some() != repository.password_env.is_some() {
                return Err(self.invalid(
                    &name,
                    "`username` and `password_env` must be set together",
                ));
            }
        }
        Ok(())
    }

    /// Repository endpoints in declaration order, Maven Central when none is
    /// listed. Passwords are read from the process environment.
    ///
    /// # Errors
    /// Returns `ManifestError::MissingPassword` if a `password_env` variable is unset.
    pub fn endpoints(&self) -> Result<Vec<Endpoint>, ManifestError> {
        self.endpoints_with(|name| std::env::var(name).ok())
    }

    /// Like [`endpoints`](Self::endpoints), looking variables up with `env`.
    ///
    /// # Errors
    /// Returns `ManifestError::MissingPassword` if `env` has no value for a
    /// `password_env` variable.
    pub fn endpoints_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Vec<Endpoint>, ManifestError> {
        if self.repositories.is_empty() {
            return Ok(vec![Endpoint::maven_central()]);
        }
        self.repositories
            .iter()
            .map(|repository| {
                let url = if repository.url.contains("://")
                    || Path::new(&repository.url).is_absolute()
                {
                    repository.url.clone()
                } else {
                    self.base_dir().join(&repository.url).display().to_string()
                };
                let layout = match repository.layout {
                    LayoutName::Maven => Layout::Maven,
                    LayoutName::Ivy => Layout::Ivy,
                };
                let mut endpoint = Endpoint::new(&url)
                    .with_layout(layout)
                    .with_checksums(repository.checksums);
                if let (Some(username), Some(variable)) =
                    (&repository.username, &repository.password_env)
                {
                    let password = env(variable).ok_or_else(|| ManifestError::MissingPassword {
                        path: self.path.display().to_string(),
                        url: repository.url.clone(),
                        variable: variable.clone(),
                    })?;
                    endpoint = endpoint.with_auth(BasicAuth::new(username, &password));
                }
                Ok(endpoint)
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid caravan.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid caravan.toml at {path}: {entry}: {message}")]
    Invalid {
        path: String,
        entry: String,
        message: String,
    },
    #[error("{path}: repository {url} reads its password from ${variable}, which is not set")]
    MissingPassword {
        path: String,
        url: String,
        variable: String,
    },
}
