//! The compatibility experiment pipeline.
//!
//! resolve client → extract archive → promote pom.xml → rewrite pom.xml →
//! `mvn clean compile` → extract diagnostics.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bumpcheck_maven::{extract_diagnostics, BuildStatus, CompilationDiagnostic, MavenCommand};
use bumpcheck_pom::{upgrade_descriptor, DependencyUpdate, MissingDependencyPolicy, MutationReport, Upgrade};

use crate::client::ClientRef;
use crate::error::EngineError;

/// Everything needed to run one experiment.
#[derive(Debug, Clone)]
pub struct ExperimentOptions {
    pub client: ClientRef,
    pub upgrade: Upgrade,
    /// The `mvn` launcher to run.
    pub maven: PathBuf,
    /// JAVA_HOME for the build, if it should differ from the environment's.
    pub java_home: Option<PathBuf>,
    /// Passed to `mvn` after the standard goals and flags.
    pub maven_args: Vec<String>,
    /// Remote repository base URL for coordinate clients.
    pub repository: String,
    /// Download cache for coordinate clients.
    pub cache_dir: PathBuf,
    /// Directory to extract the client into; defaults to `<cwd>/<archive stem>`.
    pub work_dir: Option<PathBuf>,
    /// Remove the working directory before extracting.
    pub fresh: bool,
    pub policy: MissingDependencyPolicy,
    /// Copy Maven's raw output here.
    pub build_log: Option<PathBuf>,
}

/// Outcome of a completed experiment. A failed compilation is still a completed experiment.
#[derive(Debug)]
pub struct ExperimentResult {
    pub client: ClientRef,
    /// The client archive on disk.
    pub archive: PathBuf,
    /// Hex SHA-256 of `archive`.
    pub sha256: String,
    pub upgrade: Upgrade,
    pub work_dir: PathBuf,
    pub descriptor: PathBuf,
    pub mutation: MutationReport,
    pub status: BuildStatus,
    pub diagnostics: Vec<CompilationDiagnostic>,
    pub duration: Duration,
}

/// Run the full experiment pipeline.
///
/// Steps:
/// 1. Resolve the client archive (download coordinate clients into the cache)
/// 2. Extract it into the working directory
/// 3. Promote the embedded `pom.xml` to the working directory root
/// 4. Add the source-unpacking plugins and bump the library version
/// 5. Run `mvn --batch-mode clean compile --fail-at-end` and extract diagnostics
///    while the build streams its output
///
/// # Errors
/// Returns an error if any step fails. A build that exits non-zero is not an error.
pub fn run_experiment(options: &ExperimentOptions) -> Result<ExperimentResult, EngineError> {
    let start = Instant::now();

    // 1. Resolve client.
    let resolved = options
        .client
        .resolve(&options.repository, &options.cache_dir)?;
    if resolved.freshly_downloaded {
        tracing::info!(archive = %resolved.archive.display(), "downloaded client");
    }
    tracing::debug!(sha256 = %resolved.sha256, archive = %resolved.archive.display(), "client archive ready");

    // 2. Extract.
    let work_dir = match &options.work_dir {
        Some(dir) => dir.clone(),
        None => default_work_dir(&resolved.archive)?,
    };
    if options.fresh {
        bumpcheck_util::fs::remove_dir_all_if_exists(&work_dir)?;
    }
    eprintln!(
        "    Extracting {} into {}",
        resolved.archive.display(),
        work_dir.display()
    );
    let summary = bumpcheck_util::archive::extract_zip(&resolved.archive, &work_dir)?;
    tracing::info!(files = summary.files, dir = %work_dir.display(), "extracted client");

    // 3. Promote pom.xml.
    let descriptor = bumpcheck_pom::promote_descriptor(&work_dir)?;

    // 4. Rewrite pom.xml.
    eprintln!(
        "    Upgrading {} {} -> {}",
        options.upgrade.library, options.upgrade.from, options.upgrade.to
    );
    let mutation = upgrade_descriptor(&descriptor, &options.upgrade, options.policy)?;
    if mutation.dependency == DependencyUpdate::NotFound {
        eprintln!(
            "    warning: {} does not declare {}; building with its original dependencies",
            options.client, options.upgrade.library
        );
    }

    // 5. Build and extract diagnostics.
    let build_dir = descriptor_dir(&descriptor, &work_dir);
    let mut command = MavenCommand::new().args(&options.maven_args);
    if let Some(java_home) = &options.java_home {
        command = command.java_home(java_home);
    }
    if let Some(log) = &options.build_log {
        command = command.build_log(log);
    }

    eprintln!("   Compiling {} with {}", options.client, options.maven.display());
    let mut process = command.spawn(&options.maven, build_dir)?;
    let diagnostics: Vec<CompilationDiagnostic> = extract_diagnostics(process.by_ref()).collect();
    let status = process.wait()?;

    Ok(ExperimentResult {
        client: options.client.clone(),
        archive: resolved.archive,
        sha256: resolved.sha256,
        upgrade: options.upgrade.clone(),
        work_dir,
        descriptor,
        mutation,
        status,
        diagnostics,
        duration: start.elapsed(),
    })
}

/// `<cwd>/<archive file stem>`, e.g. `./comp-changes-client-0.0.1` for `comp-changes-client-0.0.1.jar`.
fn default_work_dir(archive: &Path) -> Result<PathBuf, EngineError> {
    let cwd = std::env::current_dir().map_err(|source| EngineError::Io {
        path: ".".to_owned(),
        source,
    })?;
    Ok(work_dir_for(&cwd, archive))
}

fn work_dir_for(base: &Path, archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .map_or_else(|| "client".into(), |s| s.to_string_lossy().into_owned());
    base.join(stem)
}

fn descriptor_dir<'a>(descriptor: &'a Path, fallback: &'a Path) -> &'a Path {
    descriptor.parent().unwrap_or(fallback)
}
