//! Downloaded artifact files grouped by resolved module version.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use caravan_model::{ArtifactSpec, Coordinate, ModuleId, Version};

use crate::logger::Logger;

/// Outcome of materializing one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReport {
    pub coordinate: Coordinate,
    /// Local file, when the fetch succeeded.
    pub path: Option<PathBuf>,
    /// Why the fetch failed.
    pub failure: Option<String>,
}

impl ArtifactReport {
    pub fn fetched(coordinate: Coordinate, path: PathBuf) -> Self {
        Self {
            coordinate,
            path: Some(path),
            failure: None,
        }
    }

    pub fn failed(coordinate: Coordinate, failure: String) -> Self {
        Self {
            coordinate,
            path: None,
            failure: Some(failure),
        }
    }
}

type Key = (ModuleId, Version);

/// Files per `(module, version)`, in report order, each tagged with the
/// artifact it was fetched for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactContainer {
    order: Vec<Key>,
    files: HashMap<Key, Vec<(ArtifactSpec, PathBuf)>>,
}

impl ArtifactContainer {
    /// Index `reports`, skipping any whose file is not on disk.
    pub fn of(reports: &[ArtifactReport], logger: &dyn Logger) -> Self {
        let mut container = Self::default();
        for report in reports {
            match &report.path {
                Some(path) if path.is_file() => container.insert(&report.coordinate, path.clone()),
                Some(path) => logger.warn(&format!(
                    "artifact {} skipped: {} does not exist",
                    report.coordinate,
                    path.display()
                )),
                None => logger.warn(&format!(
                    "artifact {} skipped: {}",
                    report.coordinate,
                    report.failure.as_deref().unwrap_or("not downloaded")
                )),
            }
        }
        container
    }

    fn insert(&mut self, coordinate: &Coordinate, path: PathBuf) {
        let key = (coordinate.module().clone(), coordinate.version().clone());
        let entry = self.files.entry(key.clone()).or_insert_with(|| {
            self.order.push(key);
            Vec::new()
        });
        if !entry.iter().any(|(_, known)| *known == path) {
            entry.push((coordinate.artifact().clone(), path));
        }
    }

    fn entries(&self, coordinate: &Coordinate) -> &[(ArtifactSpec, PathBuf)] {
        self.files
            .get(&(coordinate.module().clone(), coordinate.version().clone()))
            .map_or(&[], Vec::as_slice)
    }

    /// Files for the module version of `coordinate`, whatever its artifact.
    /// Unknown coordinates yield an empty list.
    pub fn artifacts(&self, coordinate: &Coordinate) -> Vec<PathBuf> {
        self.entries(coordinate)
            .iter()
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// The file fetched for exactly the artifact `coordinate` designates.
    pub fn artifact(&self, coordinate: &Coordinate) -> Option<&Path> {
        self.entries(coordinate)
            .iter()
            .find(|(spec, _)| spec == coordinate.artifact())
            .map(|(_, path)| path.as_path())
    }

    /// Every `(module, version)` with at least one file, in report order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.order
            .iter()
            .map(|(module, version)| module.at(version.clone()))
    }

    pub fn all_files(&self) -> Vec<PathBuf> {
        self.order
            .iter()
            .filter_map(|key| self.files.get(key))
            .flatten()
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// Union of both containers; `other`'s entries follow this one's.
    pub fn merge(&self, other: &ArtifactContainer) -> Self {
        let mut merged = self.clone();
        for key in &other.order {
            for (spec, path) in other.files.get(key).into_iter().flatten() {
                let coordinate = key.0.at(key.1.clone()).with_artifact(spec.clone());
                merged.insert(&coordinate, path.clone());
            }
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
