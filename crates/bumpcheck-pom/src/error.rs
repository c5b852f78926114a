//! Error types for bumpcheck-pom.

/// Errors produced while locating, reading, mutating, or writing a POM.
#[derive(Debug, thiserror::Error)]
pub enum PomError {
    /// A filesystem operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A utility operation failed.
    #[error("{0}")]
    Util(#[from] bumpcheck_util::error::UtilError),

    /// The descriptor is not well-formed XML.
    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },

    /// The document element is not `<project>`.
    #[error("{path} is not a Maven POM — root element is <{root}>, expected <project>")]
    NotAProject { path: String, root: String },

    /// No descriptor exists anywhere under the searched root.
    #[error("no pom.xml found under {root} — is this a Maven-built JAR?")]
    NotFound { root: String },

    /// The project does not declare enough of its own coordinate.
    #[error("{path} does not declare a {field} (on the project or its parent)")]
    MissingCoordinate { path: String, field: &'static str },

    /// The requested dependency is not declared and the policy forbids ignoring it.
    #[error("{path} does not declare a dependency on {dependency}")]
    DependencyNotFound { path: String, dependency: String },
}
