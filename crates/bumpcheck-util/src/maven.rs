//! Maven coordinate parsing and repository layout.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::artifact::validate_component;
use crate::error::UtilError;

/// Maven Central repository URL.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";

/// A `(group, artifact)` pair identifying a library independent of its version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    /// Maven group identifier, e.g. `"com.google.guava"`.
    pub group_id: String,
    /// Maven artifact identifier, e.g. `"guava"`.
    pub artifact_id: String,
}

impl ArtifactKey {
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            group_id: group_id.to_owned(),
            artifact_id: artifact_id.to_owned(),
        }
    }

    /// Parse `"group:artifact"`.
    ///
    /// # Errors
    /// Returns `UtilError::InvalidMavenCoordinate` unless the string has exactly
    /// two non-empty colon-separated parts.
    pub fn parse(key: &str) -> Result<Self, UtilError> {
        match key.split(':').collect::<Vec<_>>().as_slice() {
            [group, artifact] if !group.is_empty() && !artifact.is_empty() => {
                Ok(Self::new(group, artifact))
            }
            parts => Err(UtilError::InvalidMavenCoordinate {
                coordinate: key.to_owned(),
                reason: format!(
                    "expected group:artifact with both parts non-empty, got {} part(s)",
                    parts.len()
                ),
            }),
        }
    }

}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A parsed Maven coordinate identifying a single artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenCoordinate {
    /// Maven group identifier, e.g. `"com.google.guava"`.
    pub group_id: String,
    /// Maven artifact identifier, e.g. `"guava"`.
    pub artifact_id: String,
    /// Artifact version, e.g. `"18.0"`.
    pub version: String,
    /// File extension / packaging type (defaults to `"jar"`).
    pub packaging: String,
    /// Optional classifier, e.g. `"sources"`.
    pub classifier: Option<String>,
}

impl MavenCoordinate {
    /// Create a new coordinate with default packaging ("jar") and no classifier.
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_owned(),
            artifact_id: artifact_id.to_owned(),
            version: version.to_owned(),
            packaging: "jar".to_owned(),
            classifier: None,
        }
    }

    /// Builder method to override the packaging type.
    pub fn with_packaging(mut self, packaging: &str) -> Self {
        self.packaging = packaging.to_owned();
        self
    }

    /// Builder method to set a classifier.
    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = Some(classifier.to_owned());
        self
    }

    /// The `(group, artifact)` part of this coordinate.
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::new(&self.group_id, &self.artifact_id)
    }

    /// Parse a Maven coordinate string, version last:
    ///
    /// - `"group:artifact:version"` (packaging defaults to "jar")
    /// - `"group:artifact:packaging:version"`
    /// - `"group:artifact:packaging:classifier:version"`
    ///
    /// Every part is validated so the coordinate is safe to turn into a cache path.
    ///
    /// # Errors
    /// Returns `UtilError::InvalidMavenCoordinate` when the string has fewer
    /// than 3 or more than 5 colon-separated parts or any part is empty, and
    /// `UtilError::UnsafeComponent` when a part contains unsafe characters.
    pub fn parse(coord: &str) -> Result<Self, UtilError> {
        let parts: Vec<&str> = coord.split(':').collect();

        if let Some(i) = parts.iter().position(|p| p.is_empty()) {
            return Err(UtilError::InvalidMavenCoordinate {
                coordinate: coord.to_owned(),
                reason: format!("part {} is empty", i.saturating_add(1)),
            });
        }

        let result = match parts.as_slice() {
            [group, artifact, version] => Self::new(group, artifact, version),
            [group, artifact, packaging, version] => {
                Self::new(group, artifact, version).with_packaging(packaging)
            }
            [group, artifact, packaging, classifier, version] => {
                Self::new(group, artifact, version)
                    .with_packaging(packaging)
                    .with_classifier(classifier)
            }
            _ => {
                return Err(UtilError::InvalidMavenCoordinate {
                    coordinate: coord.to_owned(),
                    reason: format!(
                        "expected 3 to 5 colon-separated parts (group:artifact[:packaging[:classifier]]:version), got {}",
                        parts.len()
                    ),
                })
            }
        };

        validate_component("group_id", &result.group_id)?;
        validate_component("artifact_id", &result.artifact_id)?;
        validate_component("version", &result.version)?;
        validate_component("packaging", &result.packaging)?;
        if let Some(classifier) = &result.classifier {
            validate_component("classifier", classifier)?;
        }

        Ok(result)
    }

    /// The filename for this artifact: `"{artifact_id}-{version}[-{classifier}].{packaging}"`.
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.packaging
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }

    /// The repository-relative path for this artifact.
    ///
    /// Dots in `group_id` are replaced with `/`, then:
    /// `"{group_path}/{artifact_id}/{version}/{filename}"`.
    pub fn repository_path(&self) -> String {
        let group_path = self.group_id.replace('.', "/");
        format!(
            "{}/{}/{}/{}",
            group_path,
            self.artifact_id,
            self.version,
            self.filename()
        )
    }

    /// Build the full download URL for this artifact.
    ///
    /// Strips any trailing `/` from `repository` before appending the path.
    pub fn to_url(&self, repository: &str) -> String {
        let base = repository.trim_end_matches('/');
        format!("{}/{}", base, self.repository_path())
    }

    /// Return the local cache path for this artifact, rooted at `cache_root`.
    pub fn cache_path(&self, cache_root: &Path) -> PathBuf {
        let group_path = self.group_id.replace('.', "/");
        cache_root
            .join(group_path)
            .join(&self.artifact_id)
            .join(&self.version)
            .join(self.filename())
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if self.packaging != "jar" || self.classifier.is_some() {
            write!(f, ":{}", self.packaging)?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}
