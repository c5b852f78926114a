//! Artifact download into a local repository cache with atomic placement.

use std::path::{Path, PathBuf};

use crate::error::UtilError;

/// Result of ensuring an artifact is available locally.
#[derive(Debug, Clone)]
pub struct ArtifactResult {
    /// Path to the artifact on disk.
    pub path: PathBuf,
    /// Hex-encoded SHA-256 hash of the artifact.
    pub sha256: String,
    /// `true` if the artifact was downloaded this call, `false` if it was already cached.
    pub freshly_downloaded: bool,
}

/// Validate that a coordinate component is safe for filesystem paths and URLs.
///
/// Allows only `[a-zA-Z0-9._-]`, must be non-empty, and may not be `.` or `..`.
///
/// # Errors
/// Returns `UtilError::UnsafeComponent` if the value is empty, a relative path
/// segment, or contains characters outside the allowed set.
pub fn validate_component(field: &'static str, value: &str) -> Result<(), UtilError> {
    let charset_ok = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
    if value.is_empty() || value == "." || value == ".." || !charset_ok {
        return Err(UtilError::UnsafeComponent {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

/// Ensure a single-file artifact exists at `dest`, downloading from `url` if needed.
///
/// 1. If `dest` already exists it is reused as-is and only hashed.
/// 2. Otherwise parent directories are created, the artifact is downloaded to a
///    temp file beside `dest`, and renamed into place.
/// 3. If the rename fails but `dest` now exists, another run placed it first;
///    the placed file wins.
/// 4. The temp file is removed on every error path.
///
/// # Errors
/// Returns an error if the download fails or an I/O operation fails.
pub fn ensure_artifact(url: &str, dest: &Path, label: &str) -> Result<ArtifactResult, UtilError> {
    if dest.exists() {
        tracing::debug!(path = %dest.display(), "artifact already cached");
        return Ok(ArtifactResult {
            path: dest.to_path_buf(),
            sha256: crate::hash::sha256_file(dest)?,
            freshly_downloaded: false,
        });
    }

    if let Some(parent) = dest.parent() {
        crate::fs::ensure_dir(parent)?;
    }

    let pid = std::process::id();
    let ext = dest.extension().and_then(|e| e.to_str()).unwrap_or("tmp");
    let tmp_name = format!(".tmp-{pid}.{ext}");
    let tmp_path = dest
        .parent()
        .map_or_else(|| PathBuf::from(&tmp_name), |p| p.join(&tmp_name));

    let download_hash = match crate::download::download_with_progress(url, &tmp_path, label) {
        Ok(hash) => hash,
        Err(e) => {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }
    };

    match std::fs::rename(&tmp_path, dest) {
        Ok(()) => {}
        Err(_) if dest.exists() => {
            let _ = std::fs::remove_file(&tmp_path);
            return Ok(ArtifactResult {
                path: dest.to_path_buf(),
                sha256: crate::hash::sha256_file(dest)?,
                freshly_downloaded: false,
            });
        }
        Err(source) => {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(UtilError::Io {
                path: dest.display().to_string(),
                source,
            });
        }
    }

    Ok(ArtifactResult {
        path: dest.to_path_buf(),
        sha256: download_hash,
        freshly_downloaded: true,
    })
}
