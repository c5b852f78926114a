//! Error types for bumpcheck-maven.

use std::path::PathBuf;

/// Errors produced by Maven detection and invocation.
#[derive(Debug, thiserror::Error)]
pub enum MavenError {
    /// No `mvn` executable was found on the system.
    #[error("mvn not found — install Apache Maven and add it to PATH, set MAVEN_HOME, or pass --maven")]
    NotFound,

    /// An explicitly configured executable does not exist.
    #[error("mvn not found at {path} — check the configured Maven path")]
    Missing { path: PathBuf },

    /// An executable was found but cannot be run.
    #[error("mvn found at {path} but is not executable — check file permissions")]
    NotExecutable { path: PathBuf },

    /// The build process could not be started.
    #[error("cannot execute {program}: {source}")]
    Exec {
        program: String,
        source: std::io::Error,
    },

    /// `mvn --version` returned an unexpected format.
    #[error("cannot parse Maven version from output: {output}")]
    VersionParse { output: String },

    /// Reading the build output or writing the build log failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// An error propagated from bumpcheck-util.
    #[error("{0}")]
    Util(#[from] bumpcheck_util::error::UtilError),
}
