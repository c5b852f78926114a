use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the experiment manifest.
pub const MANIFEST_FILE: &str = "bumpcheck.toml";

/// The `bumpcheck.toml` experiment manifest.
///
/// ```toml
/// [client]
/// artifact = "maracas-data:comp-changes-client:0.0.1"
///
/// [library]
/// group = "maracas-data"
/// artifact = "comp-changes"
/// from = "0.0.1"
/// to = "0.0.2"
///
/// [maven]
/// executable = "/usr/bin/mvn"
/// args = ["-Dmaven.repo.local=local-repo"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Experiment {
    pub client: Client,
    pub library: Library,
    #[serde(default)]
    pub maven: MavenSettings,
}

/// The client whose build is re-run against the new library version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Client {
    /// Local JAR path or `group:artifact:version` coordinate.
    pub artifact: String,
}

/// The library dependency being bumped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Library {
    pub group: String,
    pub artifact: String,
    /// Version the client was built against.
    pub from: String,
    /// Version to compile the client against.
    pub to: String,
}

/// Build tool and repository settings. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct MavenSettings {
    /// Path to the `mvn` executable. Detected when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    /// JAVA_HOME to run the build with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_home: Option<PathBuf>,
    /// Remote repository base URL for resolving a client coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Local cache directory for downloaded clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<PathBuf>,
    /// Extra arguments passed to `mvn` after `clean compile --fail-at-end`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Fail when the client does not declare the library.
    #[serde(default)]
    pub strict: bool,
}

impl Experiment {
    /// Read and parse a `bumpcheck.toml` from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or leaves a required value empty.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_str_at(&content, path)
    }

    fn from_str_at(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let experiment: Experiment = toml::from_str(content).map_err(|e| ManifestError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        experiment.validate(path)?;
        Ok(experiment)
    }

    fn validate(&self, path: &Path) -> Result<(), ManifestError> {
        let required = [
            ("client.artifact", &self.client.artifact),
            ("library.group", &self.library.group),
            ("library.artifact", &self.library.artifact),
            ("library.from", &self.library.from),
            ("library.to", &self.library.to),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ManifestError::EmptyField {
                    path: path.display().to_string(),
                    field,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid bumpcheck.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid bumpcheck.toml at {path}: `{field}` must not be empty")]
    EmptyField { path: String, field: &'static str },
}
