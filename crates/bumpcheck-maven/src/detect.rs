//! Maven detection and version parsing.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::MavenError;

/// Information about a detected Maven installation.
#[derive(Debug, Clone)]
pub struct MavenInfo {
    /// Path to the `mvn` launcher.
    pub path: PathBuf,
    /// Parsed version (e.g. "3.9.6").
    pub version: String,
}

/// Locate `mvn` and determine its version.
///
/// # Errors
/// Returns an error if `mvn` is not found, is not executable, or reports an
/// unparseable version string.
pub fn detect_maven(explicit: Option<&Path>) -> Result<MavenInfo, MavenError> {
    let path = resolve_maven(explicit)?;
    let version = query_version(&path)?;
    Ok(MavenInfo { path, version })
}

/// Find the `mvn` launcher without running it.
///
/// Resolution order:
/// 1. `explicit`, when given (must exist)
/// 2. `MAVEN_HOME` environment variable (`$MAVEN_HOME/bin/mvn`)
/// 3. `PATH` lookup via `which`
///
/// # Errors
/// Returns an error if no candidate exists or the chosen one is not executable.
pub fn resolve_maven(explicit: Option<&Path>) -> Result<PathBuf, MavenError> {
    let maven_home = std::env::var_os("MAVEN_HOME").map(PathBuf::from);
    let path = resolve_from(explicit, maven_home.as_deref(), which_mvn)?;
    check_executable(&path)?;
    Ok(path)
}

fn resolve_from(
    explicit: Option<&Path>,
    maven_home: Option<&Path>,
    which: impl FnOnce() -> Option<PathBuf>,
) -> Result<PathBuf, MavenError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(MavenError::Missing {
            path: path.to_path_buf(),
        });
    }

    if let Some(home) = maven_home {
        let p = home.join("bin").join("mvn");
        if p.exists() {
            return Ok(p);
        }
        tracing::debug!(path = %p.display(), "MAVEN_HOME set but bin/mvn missing, trying PATH");
    }

    which().ok_or(MavenError::NotFound)
}

fn which_mvn() -> Option<PathBuf> {
    let output = Command::new("which").arg("mvn").output().ok()?;
    if output.status.success() {
        let path_str = String::from_utf8_lossy(&output.stdout);
        let trimmed = path_str.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(PathBuf::from(trimmed))
    } else {
        None
    }
}

fn check_executable(path: &Path) -> Result<(), MavenError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path).map_err(|_| MavenError::NotExecutable {
            path: path.to_path_buf(),
        })?;
        if metadata.is_dir() || metadata.permissions().mode() & 0o111 == 0 {
            return Err(MavenError::NotExecutable {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn query_version(path: &Path) -> Result<String, MavenError> {
    let output = bumpcheck_util::process::run_command(Command::new(path).arg("--version"))
        .map_err(|e| match e {
            bumpcheck_util::error::UtilError::CommandExec { source } => MavenError::Exec {
                program: path.display().to_string(),
                source,
            },
            other => MavenError::Util(other),
        })?;

    let raw = output.primary_text();
    parse_version(raw).ok_or_else(|| MavenError::VersionParse {
        output: raw.to_owned(),
    })
}

/// Parse the Maven version from raw `mvn --version` output.
///
/// Handles formats like:
/// - `Apache Maven 3.9.6 (bc0240f3c744dd6b6ec2920b3cd08dcc295161ae)`
/// - `Apache Maven 4.0.0-rc-2`
/// - the same with ANSI bold escapes around the banner
pub fn parse_version(raw: &str) -> Option<String> {
    let plain = strip_ansi(raw);
    let banner = plain
        .lines()
        .find(|l| l.contains("Maven"))
        .unwrap_or(plain.as_str());
    banner
        .split_whitespace()
        .map(|token| token.trim_start_matches('v'))
        .find(|token| is_version_like(token))
        .map(str::to_owned)
}

/// Drop `ESC [ ... <letter>` control sequences.
fn strip_ansi(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn is_version_like(s: &str) -> bool {
    let core = s.split('-').next().unwrap_or(s);
    let parts: Vec<&str> = core.split('.').collect();
    (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
