//! Parse and validate the `bumpcheck.toml` experiment manifest.

pub mod manifest;

pub use manifest::{Experiment, ManifestError};
