//! Error types for bumpcheck-util.

/// Errors produced by utility functions.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// An I/O operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A glob pattern was invalid.
    #[error("invalid glob pattern `{pattern}`: {message}")]
    GlobPattern { pattern: String, message: String },

    /// A command failed to execute.
    #[error("cannot execute command: {source}")]
    CommandExec { source: std::io::Error },

    /// A download failed.
    #[error("download failed: {message}")]
    Download { message: String },

    /// A Maven coordinate string is malformed.
    #[error("invalid Maven coordinate \"{coordinate}\": {reason}")]
    InvalidMavenCoordinate { coordinate: String, reason: String },

    /// A coordinate component contains characters unsafe for paths and URLs.
    #[error("invalid {field} \"{value}\": only alphanumeric characters, dots, hyphens, and underscores are allowed")]
    UnsafeComponent { field: &'static str, value: String },

    /// An archive could not be read.
    #[error("cannot read archive {path}: {message}")]
    Archive { path: String, message: String },

    /// An archive entry attempted to escape the extraction directory.
    #[error("archive contains path traversal entry \"{entry_path}\" that escapes {dest}")]
    PathTraversal { entry_path: String, dest: String },
}
