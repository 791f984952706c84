//! Filesystem utilities for Caravan.

use std::path::{Path, PathBuf};

use crate::error::UtilError;

/// Environment variable overriding the Caravan home directory.
pub const HOME_ENV: &str = "CARAVAN_HOME";

/// Create a directory and all parent directories if they do not exist.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<(), UtilError> {
    std::fs::create_dir_all(path).map_err(|source| UtilError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Return the Caravan home directory.
///
/// `$CARAVAN_HOME` when set, otherwise `~/.caravan` resolved via `HOME`
/// (Unix) or `USERPROFILE` (Windows).
///
/// # Errors
/// Returns `UtilError::NoHomeDir` if none of the variables is set.
pub fn caravan_home() -> Result<PathBuf, UtilError> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".caravan"))
        .ok_or(UtilError::NoHomeDir)
}

/// Names of the sub-directories of `dir`, sorted. An absent `dir` yields an
/// empty list.
///
/// # Errors
/// Returns an error if `dir` exists but cannot be read.
pub fn list_dirs(dir: &Path) -> Result<Vec<String>, UtilError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(UtilError::Io {
                path: dir.display().to_string(),
                source,
            })
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| UtilError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
    }
    names.sort();
    Ok(names)
}
