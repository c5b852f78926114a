//! Rewrite a client's POM so its next build compiles the client's published
//! sources against a different library version.

use std::path::Path;

use bumpcheck_util::maven::{ArtifactKey, MavenCoordinate};

use crate::error::PomError;
use crate::model::{DependencyUpdate, Pom};
use crate::plugin::{dependency_unpack_plugin, source_root_plugin};

/// A library version bump: the client was built against `from`, compile it against `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upgrade {
    pub library: ArtifactKey,
    pub from: String,
    pub to: String,
}

/// What to do when the client does not declare the library being bumped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingDependencyPolicy {
    /// Warn and carry on; the build then runs against the client's original dependencies.
    #[default]
    Ignore,
    /// Abort with `PomError::DependencyNotFound` before anything is written.
    Fail,
}

/// Summary of a descriptor mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    /// Outcome of the dependency version rewrite.
    pub dependency: DependencyUpdate,
    /// Coordinate whose `sources` artifact the build will unpack.
    pub sources_of: MavenCoordinate,
    /// Number of plugin declarations appended.
    pub plugins_added: usize,
}

/// Apply `upgrade` to an in-memory POM.
///
/// Both plugin declarations are appended unconditionally, so mutating the same
/// POM twice leaves duplicate declarations behind.
///
/// # Errors
/// Returns `PomError::MissingCoordinate` if the client's own coordinate cannot be
/// resolved, or `PomError::DependencyNotFound` under [`MissingDependencyPolicy::Fail`].
pub fn apply_upgrade(
    pom: &mut Pom,
    upgrade: &Upgrade,
    policy: MissingDependencyPolicy,
) -> Result<MutationReport, PomError> {
    let client = pom.coordinate()?;

    if policy == MissingDependencyPolicy::Fail
        && !pom.dependencies().iter().any(|d| {
            d.group_id == upgrade.library.group_id && d.artifact_id == upgrade.library.artifact_id
        })
    {
        return Err(PomError::DependencyNotFound {
            path: pom.origin().to_owned(),
            dependency: upgrade.library.to_string(),
        });
    }

    let plugins = [dependency_unpack_plugin(&client), source_root_plugin()];
    for plugin in &plugins {
        pom.add_plugin(plugin);
    }

    let dependency = pom.update_dependency_version(&upgrade.library, &upgrade.to);
    match &dependency {
        DependencyUpdate::Updated { previous } => {
            if previous.as_deref() != Some(upgrade.from.as_str()) {
                tracing::warn!(
                    dependency = %upgrade.library,
                    declared = previous.as_deref().unwrap_or("<none>"),
                    expected = %upgrade.from,
                    "declared version differs from the expected old version"
                );
            }
            tracing::info!(dependency = %upgrade.library, version = %upgrade.to, "updated dependency");
        }
        DependencyUpdate::NotFound => {
            tracing::warn!(
                dependency = %upgrade.library,
                pom = %pom.origin(),
                "dependency not declared, version left unchanged"
            );
        }
    }

    Ok(MutationReport {
        dependency,
        sources_of: client,
        plugins_added: plugins.len(),
    })
}

/// Read the POM at `path`, apply `upgrade`, and write it back in place.
///
/// On error the file is left untouched.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, mutated, or written.
pub fn upgrade_descriptor(
    path: &Path,
    upgrade: &Upgrade,
    policy: MissingDependencyPolicy,
) -> Result<MutationReport, PomError> {
    let mut pom = Pom::from_path(path)?;
    let report = apply_upgrade(&mut pom, upgrade, policy)?;
    pom.write_to(path)?;
    Ok(report)
}
