//! Client archive references: a local JAR, or a coordinate fetched from a repository.

use std::fmt;
use std::path::{Path, PathBuf};

use bumpcheck_util::maven::MavenCoordinate;

use crate::error::EngineError;

/// Where the client archive comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRef {
    /// A JAR already on disk.
    Local(PathBuf),
    /// A `group:artifact[:packaging[:classifier]]:version` coordinate.
    Remote(MavenCoordinate),
}

/// A client archive available on the local filesystem.
#[derive(Debug, Clone)]
pub struct ResolvedClient {
    pub archive: PathBuf,
    /// Hex SHA-256 of the archive.
    pub sha256: String,
    /// `true` if the archive was downloaded by this call.
    pub freshly_downloaded: bool,
}

impl ClientRef {
    /// Interpret a user-supplied client reference.
    ///
    /// Anything that exists on disk, or looks like a path (contains a path
    /// separator or ends in `.jar`/`.zip`), is a local archive. Otherwise it
    /// must parse as a Maven coordinate.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidClient` if the reference is a missing path or
    /// an invalid coordinate.
    pub fn parse(reference: &str) -> Result<Self, EngineError> {
        let path = Path::new(reference);
        if path.exists() {
            return Ok(Self::Local(path.to_path_buf()));
        }

        if looks_like_path(reference) {
            return Err(EngineError::InvalidClient {
                reference: reference.to_owned(),
                reason: "file does not exist".to_owned(),
            });
        }

        MavenCoordinate::parse(reference)
            .map(Self::Remote)
            .map_err(|e| EngineError::InvalidClient {
                reference: reference.to_owned(),
                reason: format!("not an existing file, and {e}"),
            })
    }

    /// Make the client archive available locally.
    ///
    /// Remote clients are downloaded from `repository` into `cache` using the
    /// Maven repository layout; an archive already in the cache is reused.
    ///
    /// # Errors
    /// Returns an error if a local archive is not a file or a download fails.
    pub fn resolve(&self, repository: &str, cache: &Path) -> Result<ResolvedClient, EngineError> {
        match self {
            Self::Local(path) => {
                if !path.is_file() {
                    return Err(EngineError::InvalidClient {
                        reference: path.display().to_string(),
                        reason: "not a regular file".to_owned(),
                    });
                }
                Ok(ResolvedClient {
                    archive: path.clone(),
                    sha256: bumpcheck_util::hash::sha256_file(path)?,
                    freshly_downloaded: false,
                })
            }
            Self::Remote(coordinate) => {
                let url = coordinate.to_url(repository);
                let dest = coordinate.cache_path(cache);
                tracing::debug!(url = %url, dest = %dest.display(), "resolving remote client");
                let result = bumpcheck_util::artifact::ensure_artifact(
                    &url,
                    &dest,
                    &coordinate.to_string(),
                )?;
                Ok(ResolvedClient {
                    archive: result.path,
                    sha256: result.sha256,
                    freshly_downloaded: result.freshly_downloaded,
                })
            }
        }
    }
}

impl fmt::Display for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(coordinate) => write!(f, "{coordinate}"),
        }
    }
}

fn looks_like_path(reference: &str) -> bool {
    reference.contains('/')
        || reference.contains(std::path::MAIN_SEPARATOR)
        || reference.ends_with(".jar")
        || reference.ends_with(".zip")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_existing_file_is_local() {
        let tmp = tempfile::tempdir().unwrap();
        let jar = tmp.path().join("client.jar");
        std::fs::write(&jar, b"PK").unwrap();

        let client = ClientRef::parse(&jar.display().to_string()).unwrap();
        assert_eq!(client, ClientRef::Local(jar));
    }

    #[test]
    fn parse_missing_path_errors() {
        let err = ClientRef::parse("data/missing-client.jar").unwrap_err();
        assert!(err.to_string().contains("file does not exist"), "error was: {err}");
    }

    #[test]
    fn parse_coordinate_is_remote() {
        let client = ClientRef::parse("maracas-data:comp-changes-client:0.0.1").unwrap();
        assert_eq!(
            client,
            ClientRef::Remote(MavenCoordinate::new(
                "maracas-data",
                "comp-changes-client",
                "0.0.1"
            ))
        );
        assert_eq!(client.to_string(), "maracas-data:comp-changes-client:0.0.1");
    }

    #[test]
    fn parse_garbage_errors() {
        let err = ClientRef::parse("not-a-client").unwrap_err().to_string();
        assert!(err.contains("invalid client \"not-a-client\""), "error was: {err}");
        assert!(err.contains("invalid Maven coordinate"), "error was: {err}");
    }

    #[test]
    fn resolve_local_returns_path() {
        let tmp = tempfile::tempdir().unwrap();
        let jar = tmp.path().join("client.jar");
        std::fs::write(&jar, b"PK").unwrap();

        let resolved = ClientRef::Local(jar.clone())
            .resolve(bumpcheck_util::maven::MAVEN_CENTRAL, tmp.path())
            .unwrap();
        assert_eq!(resolved.archive, jar);
        assert_eq!(resolved.sha256, bumpcheck_util::hash::sha256_bytes(b"PK"));
        assert!(!resolved.freshly_downloaded);
    }

    #[test]
    fn resolve_local_directory_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ClientRef::Local(tmp.path().to_path_buf())
            .resolve(bumpcheck_util::maven::MAVEN_CENTRAL, tmp.path())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidClient { .. }));
    }

    #[test]
    fn resolve_remote_reuses_cached_archive() {
        let cache = tempfile::tempdir().unwrap();
        let coordinate = MavenCoordinate::new("maracas-data", "comp-changes-client", "0.0.1");
        let cached = cache
            .path()
            .join("maracas-data/comp-changes-client/0.0.1/comp-changes-client-0.0.1.jar");
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, b"PK").unwrap();

        // The repository URL is never contacted when the cache already holds the archive.
        let resolved = ClientRef::Remote(coordinate)
            .resolve("http://127.0.0.1:9/unreachable", cache.path())
            .unwrap();
        assert_eq!(resolved.archive, cached);
        assert_eq!(resolved.sha256, bumpcheck_util::hash::sha256_bytes(b"PK"));
        assert!(!resolved.freshly_downloaded);
    }
}
