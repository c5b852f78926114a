#![forbid(unsafe_code)]
//! Maven detection, streaming build invocation, and compiler diagnostic extraction.

pub mod detect;
pub mod diagnostics;
pub mod error;
pub mod invoke;

pub use detect::{detect_maven, resolve_maven, MavenInfo};
pub use diagnostics::{extract_diagnostics, CompilationDiagnostic, DiagnosticExtractor};
pub use error::MavenError;
pub use invoke::{BuildProcess, BuildStatus, MavenCommand};
