//! Error types for bumpcheck-engine.

/// Errors produced by experiment orchestration.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A filesystem operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A utility operation failed.
    #[error("{0}")]
    Util(#[from] bumpcheck_util::error::UtilError),

    /// Locating or rewriting the client's POM failed.
    #[error("{0}")]
    Pom(#[from] bumpcheck_pom::PomError),

    /// Running Maven failed.
    #[error("{0}")]
    Maven(#[from] bumpcheck_maven::MavenError),

    /// The client reference is neither an existing archive nor a coordinate.
    #[error("invalid client \"{reference}\": {reason}")]
    InvalidClient { reference: String, reason: String },

    /// Report serialization failed.
    #[error("cannot render report: {message}")]
    Report { message: String },
}
