//! Materialize ZIP-based archives (JARs) into a directory tree.

use std::path::{Component, Path};

use crate::error::UtilError;

/// Summary of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractSummary {
    /// Number of regular files written.
    pub files: usize,
    /// Number of directory entries created.
    pub directories: usize,
}

/// Extract every entry of the ZIP archive at `archive` into `dest`.
///
/// `dest` is created if missing. Entries are written in archive order; existing
/// files are overwritten. Each entry's path is validated to stay within `dest`,
/// so absolute names and `..` components are rejected before anything is written
/// for that entry.
///
/// # Errors
/// Returns an error if the archive cannot be opened or decoded, an entry escapes
/// `dest`, or a file cannot be written.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<ExtractSummary, UtilError> {
    crate::fs::ensure_dir(dest)?;

    let file = std::fs::File::open(archive).map_err(|source| UtilError::Io {
        path: archive.display().to_string(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(std::io::BufReader::new(file)).map_err(|e| {
        UtilError::Archive {
            path: archive.display().to_string(),
            message: e.to_string(),
        }
    })?;

    let mut summary = ExtractSummary::default();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| UtilError::Archive {
            path: archive.display().to_string(),
            message: e.to_string(),
        })?;

        let entry_name = entry.name().to_owned();
        let relative = Path::new(&entry_name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(UtilError::PathTraversal {
                entry_path: entry_name,
                dest: dest.display().to_string(),
            });
        }

        let target = dest.join(relative);

        if entry.is_dir() {
            crate::fs::ensure_dir(&target)?;
            summary.directories = summary.directories.saturating_add(1);
            continue;
        }

        if let Some(parent) = target.parent() {
            crate::fs::ensure_dir(parent)?;
        }

        let mut out = std::fs::File::create(&target).map_err(|source| UtilError::Io {
            path: target.display().to_string(),
            source,
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|source| UtilError::Io {
            path: target.display().to_string(),
            source,
        })?;
        summary.files = summary.files.saturating_add(1);
    }

    tracing::debug!(
        archive = %archive.display(),
        dest = %dest.display(),
        files = summary.files,
        directories = summary.directories,
        "extracted archive"
    );

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    /// Entries ending in `/` become directories; everything else is a file.
    fn create_test_zip(entries: &[(&str, &[u8])]) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut writer = zip::ZipWriter::new(tmp.reopen().unwrap());
        for &(name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(name, options).unwrap();
            } else {
                writer.start_file(name, options).unwrap();
                writer.write_all(content).unwrap();
            }
        }
        writer.finish().unwrap();
        tmp
    }

    #[test]
    fn extract_zip_materializes_tree() {
        let jar = create_test_zip(&[
            ("META-INF/", b""),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
            ("META-INF/maven/g/a/pom.xml", b"<project/>"),
            ("com/example/Foo.class", b"\xca\xfe\xba\xbe"),
        ]);
        let dest = tempfile::tempdir().unwrap();

        let summary = extract_zip(jar.path(), dest.path()).unwrap();

        assert_eq!(summary.files, 3);
        assert_eq!(summary.directories, 1);
        assert_eq!(
            std::fs::read(dest.path().join("META-INF/maven/g/a/pom.xml")).unwrap(),
            b"<project/>"
        );
        assert!(dest.path().join("com/example/Foo.class").is_file());
    }

    #[test]
    fn extract_zip_creates_missing_destination() {
        let jar = create_test_zip(&[("a.txt", b"a")]);
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("client.jar.d");

        extract_zip(jar.path(), &dest).unwrap();
        assert!(dest.join("a.txt").is_file());
    }

    #[test]
    fn extract_zip_overwrites_existing_files() {
        let jar = create_test_zip(&[("pom.xml", b"new")]);
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(dest.path().join("pom.xml"), b"old").unwrap();

        extract_zip(jar.path(), dest.path()).unwrap();
        assert_eq!(std::fs::read(dest.path().join("pom.xml")).unwrap(), b"new");
    }

    #[test]
    fn extract_zip_rejects_parent_dir_traversal() {
        let jar = create_test_zip(&[("../../etc/evil.txt", b"pwned")]);
        let dest = tempfile::tempdir().unwrap();

        let err = extract_zip(jar.path(), dest.path()).unwrap_err().to_string();
        assert!(err.contains("path traversal"), "error was: {err}");
    }

    #[test]
    fn extract_zip_rejects_dotdot_in_middle() {
        let jar = create_test_zip(&[("a/../../evil.txt", b"pwned")]);
        let dest = tempfile::tempdir().unwrap();
        assert!(extract_zip(jar.path(), dest.path()).is_err());
    }

    #[test]
    fn extract_zip_rejects_non_zip_input() {
        let tmp = tempfile::tempdir().unwrap();
        let bogus = tmp.path().join("client.jar");
        std::fs::write(&bogus, b"definitely not a zip").unwrap();

        let err = extract_zip(&bogus, &tmp.path().join("out"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("cannot read archive"), "error was: {err}");
    }

    #[test]
    fn extract_zip_missing_archive_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = extract_zip(&tmp.path().join("nope.jar"), tmp.path())
            .unwrap_err()
            .to_string();
        assert!(err.contains("cannot access"), "error was: {err}");
    }
}
