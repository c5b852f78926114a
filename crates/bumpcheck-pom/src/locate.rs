//! Find the POM buried in an extracted JAR and promote it to the root.
//!
//! Maven-built JARs carry their descriptor at
//! `META-INF/maven/<group>/<artifact>/pom.xml`; the build must instead find it
//! next to the extracted tree.

use std::path::{Path, PathBuf};

use crate::error::PomError;
use crate::model::DESCRIPTOR_FILE;

/// Copy the most likely `pom.xml` under `root` to `<root>/pom.xml` and return that path.
///
/// Candidates are every nested `pom.xml`; a descriptor already at the root is
/// only used when nothing else exists. The shallowest candidate wins, ties go to
/// the lexicographically smallest path.
///
/// # Errors
/// Returns `PomError::NotFound` if there is no `pom.xml` anywhere under `root`,
/// or an I/O error if the search or copy fails.
pub fn promote_descriptor(root: &Path) -> Result<PathBuf, PomError> {
    let dest = root.join(DESCRIPTOR_FILE);
    let found = bumpcheck_util::fs::find_named_files(root, DESCRIPTOR_FILE)?;
    let candidates: Vec<PathBuf> = found.into_iter().filter(|p| *p != dest).collect();

    let Some(chosen) = select_candidate(&candidates) else {
        if dest.is_file() {
            tracing::debug!(path = %dest.display(), "descriptor already at root");
            return Ok(dest);
        }
        return Err(PomError::NotFound {
            root: root.display().to_string(),
        });
    };

    if candidates.len() > 1 {
        let listed: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        tracing::warn!(
            chosen = %chosen.display(),
            candidates = %listed.join(", "),
            "multiple pom.xml files found, using the shallowest"
        );
    }

    bumpcheck_util::fs::copy_replacing(chosen, &dest)?;
    tracing::info!(from = %chosen.display(), to = %dest.display(), "promoted descriptor");
    Ok(dest)
}

fn select_candidate(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates
        .iter()
        .min_by(|a, b| depth(a).cmp(&depth(b)).then_with(|| a.cmp(b)))
}

fn depth(path: &Path) -> usize {
    path.components().count()
}
