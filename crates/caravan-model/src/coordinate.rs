//! Fully qualified artifact coordinates and their repository layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ModelError;
use crate::module_id::ModuleId;
use crate::version::Version;

/// Extension used when a coordinate does not name one.
pub const DEFAULT_EXTENSION: &str = "jar";

/// Which artifact of a module a coordinate designates.
///
/// Both fields `None` stands for the module's main artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactSpec {
    pub classifier: Option<String>,
    pub extension: Option<String>,
}

impl ArtifactSpec {
    /// Blank strings are treated as absent.
    pub fn new(classifier: Option<&str>, extension: Option<&str>) -> Self {
        let clean = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Self {
            classifier: clean(classifier),
            extension: clean(extension),
        }
    }

    pub fn is_main(&self) -> bool {
        self.classifier.is_none() && self.extension.is_none()
    }
}

/// A module at a given version, optionally narrowed to one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    module: ModuleId,
    version: Version,
    artifact: ArtifactSpec,
}

impl Coordinate {
    /// Create a coordinate for the main artifact of `module`.
    pub fn new(module: ModuleId, version: Version) -> Self {
        Self {
            module,
            version,
            artifact: ArtifactSpec::default(),
        }
    }

    /// Parse a coordinate string.
    ///
    /// Accepted formats:
    /// - `"group:name"` (unspecified version)
    /// - `"group:name:version"`
    /// - `"group:name:classifier:version"`
    /// - `"group:name:classifier:type:version"` (version may be empty)
    ///
    /// A version of `?` means unspecified; an empty classifier or type means
    /// the default one.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidCoordinate` when the string has fewer than 2
    /// or more than 5 colon-separated parts, contains whitespace, or has an
    /// empty group or name.
    pub fn parse(coord: &str) -> Result<Self, ModelError> {
        let trimmed = coord.trim();
        if trimmed.contains(char::is_whitespace) {
            return Err(ModelError::InvalidCoordinate {
                coordinate: coord.to_owned(),
                reason: "whitespace is not allowed".to_owned(),
            });
        }
        let parts: Vec<&str> = trimmed.split(':').collect();
        let (Some(group), Some(name)) = (parts.first(), parts.get(1)) else {
            return Err(shape_error(coord, parts.len()));
        };
        let module = ModuleId::parse(&format!("{group}:{name}")).map_err(|e| match e {
            ModelError::InvalidCoordinate { reason, .. } => ModelError::InvalidCoordinate {
                coordinate: coord.to_owned(),
                reason,
            },
            other => other,
        })?;

        let (version, classifier, extension) = match parts.as_slice() {
            [_, _] => ("", None, None),
            [_, _, version] => (*version, None, None),
            [_, _, classifier, version] => (*version, Some(*classifier), None),
            [_, _, classifier, extension, version] => {
                (*version, Some(*classifier), Some(*extension))
            }
            _ => return Err(shape_error(coord, parts.len())),
        };

        Ok(Self {
            module,
            version: Version::new(version),
            artifact: ArtifactSpec::new(classifier, extension),
        })
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn artifact(&self) -> &ArtifactSpec {
        &self.artifact
    }

    pub fn classifier(&self) -> Option<&str> {
        self.artifact.classifier.as_deref()
    }

    /// The file extension, `"jar"` unless overridden.
    pub fn extension(&self) -> &str {
        self.artifact.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }

    /// `true` if both coordinates name the same module, whatever the version.
    pub fn same_module(&self, other: &Coordinate) -> bool {
        self.module == other.module
    }

    pub fn with_version(&self, version: Version) -> Self {
        Self {
            module: self.module.clone(),
            version,
            artifact: self.artifact.clone(),
        }
    }

    pub fn with_artifact(&self, artifact: ArtifactSpec) -> Self {
        Self {
            module: self.module.clone(),
            version: self.version.clone(),
            artifact,
        }
    }

    /// Same coordinate stripped to its main artifact.
    pub fn main(&self) -> Self {
        self.with_artifact(ArtifactSpec::default())
    }

    /// The artifact file name: `"{name}-{version}[-{classifier}].{ext}"`.
    pub fn filename(&self) -> String {
        self.filename_with_extension(self.extension())
    }

    /// The file name with another extension, e.g. for the module's `pom`.
    pub fn filename_with_extension(&self, extension: &str) -> String {
        match self.classifier() {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.module.name(),
                self.version.as_str(),
                classifier,
                extension
            ),
            None => format!(
                "{}-{}.{}",
                self.module.name(),
                self.version.as_str(),
                extension
            ),
        }
    }

    /// The Maven-layout directory of this version:
    /// `"{group_path}/{name}/{version}"`.
    pub fn repository_dir(&self) -> String {
        format!(
            "{}/{}/{}",
            self.module.group_path(),
            self.module.name(),
            self.version.as_str()
        )
    }

    /// The Maven-layout repository-relative path of the artifact.
    pub fn repository_path(&self) -> String {
        format!("{}/{}", self.repository_dir(), self.filename())
    }

    /// Build the full download URL for this artifact.
    ///
    /// Strips any trailing `/` from `repository` before appending the path.
    pub fn to_url(&self, repository: &str) -> String {
        let base = repository.trim_end_matches('/');
        format!("{}/{}", base, self.repository_path())
    }

    /// The local cache path for this artifact, rooted at `cache_root`.
    pub fn cache_path(&self, cache_root: &Path) -> PathBuf {
        cache_root
            .join(self.module.group_path())
            .join(self.module.name())
            .join(self.version.as_str())
            .join(self.filename())
    }
}

fn shape_error(coord: &str, count: usize) -> ModelError {
    ModelError::InvalidCoordinate {
        coordinate: coord.to_owned(),
        reason: format!(
            "expected 2 to 5 colon-separated parts (group:name[:classifier[:type]]:version), got {count}"
        ),
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.artifact.is_main() {
            if self.version.is_unspecified() {
                return write!(f, "{}", self.module);
            }
            return write!(f, "{}:{}", self.module, self.version.as_str());
        }
        write!(
            f,
            "{}:{}:{}:{}",
            self.module,
            self.artifact.classifier.as_deref().unwrap_or_default(),
            self.artifact.extension.as_deref().unwrap_or_default(),
            self.version.as_str()
        )
    }
}

impl FromStr for Coordinate {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
