//! Parse and validate `caravan.toml`.

pub mod manifest;

pub use manifest::{Manifest, ManifestError, MANIFEST_FILE};
