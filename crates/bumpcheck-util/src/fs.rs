//! Filesystem utilities for bumpcheck.

use std::path::{Path, PathBuf};

use crate::error::UtilError;

/// Create a directory and all parent directories if they do not exist.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<(), UtilError> {
    std::fs::create_dir_all(path).map_err(|source| UtilError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Copy `src` to `dest`, replacing whatever is at `dest`.
///
/// Parent directories of `dest` are created as needed.
///
/// # Errors
/// Returns an error if the parent directory cannot be created or the copy fails.
pub fn copy_replacing(src: &Path, dest: &Path) -> Result<(), UtilError> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }

    std::fs::copy(src, dest).map_err(|source| UtilError::Io {
        path: dest.display().to_string(),
        source,
    })?;

    Ok(())
}

/// Remove a directory and all its contents. No error if the directory is absent.
///
/// # Errors
/// Returns an error if the directory exists but cannot be removed.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<(), UtilError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(UtilError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Find every regular file called `file_name` under `dir`, recursively, sorted by path.
///
/// `dir` itself is escaped, so glob metacharacters in the root path are matched literally.
///
/// # Errors
/// Returns an error if the resulting glob pattern is invalid.
pub fn find_named_files(dir: &Path, file_name: &str) -> Result<Vec<PathBuf>, UtilError> {
    let root = glob::Pattern::escape(&dir.display().to_string());
    let pattern = format!("{root}/**/{}", glob::Pattern::escape(file_name));

    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| UtilError::GlobPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b").join("c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn copy_replacing_overwrites_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src.xml");
        let dest = tmp.path().join("dest.xml");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        copy_replacing(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"new");
        assert_eq!(fs::read(&src).unwrap(), b"new");
    }

    #[test]
    fn copy_replacing_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src.xml");
        let dest = tmp.path().join("sub").join("dir").join("dest.xml");
        fs::write(&src, b"data").unwrap();

        copy_replacing(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"data");
    }

    #[test]
    fn remove_dir_all_if_exists_removes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("work");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("file.txt"), b"x").unwrap();

        remove_dir_all_if_exists(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn remove_dir_all_if_exists_absent_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        remove_dir_all_if_exists(&tmp.path().join("nonexistent")).unwrap();
    }

    #[test]
    fn find_named_files_recurses_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        let deep = tmp.path().join("META-INF").join("maven").join("g").join("a");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("pom.xml"), b"").unwrap();
        fs::write(tmp.path().join("pom.xml"), b"").unwrap();
        fs::write(deep.join("pom.properties"), b"").unwrap();

        let files = find_named_files(tmp.path(), "pom.xml").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.windows(2).all(|w| w.first() <= w.get(1)));
        assert!(files.iter().all(|f| f.ends_with("pom.xml")));
    }

    #[test]
    fn find_named_files_ignores_directories_with_that_name() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("pom.xml")).unwrap();
        let files = find_named_files(tmp.path(), "pom.xml").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn find_named_files_escapes_root() {
        let tmp = tempfile::tempdir().unwrap();
        let odd = tmp.path().join("client[1]");
        fs::create_dir_all(&odd).unwrap();
        fs::write(odd.join("pom.xml"), b"").unwrap();

        let files = find_named_files(&odd, "pom.xml").unwrap();
        assert_eq!(files, vec![odd.join("pom.xml")]);
    }
}
