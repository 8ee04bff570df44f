//! Artifact location boundary.
//!
//! A [`Locator`] opens an artifact root (directory, archive, remote bundle)
//! and yields its unit entries as byte streams. The crate ships a filesystem
//! locator; archive or virtual corpora plug in through the traits. Resources
//! held by an opened root are released when the [`ArtifactDir`] drops, on
//! every exit path.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{IndexError, Result};

/// One unit entry inside an opened artifact root.
pub trait ArtifactFile {
    /// Path relative to the root, `/`-separated.
    fn relative_path(&self) -> &str;

    /// Open the entry's byte stream.
    fn open(&self) -> std::io::Result<Box<dyn Read>>;
}

/// An opened artifact root. Dropping it releases any held resources.
pub trait ArtifactDir {
    /// Enumerate the root's unit entries.
    fn files(&mut self) -> Box<dyn Iterator<Item = Box<dyn ArtifactFile>> + '_>;
}

impl std::fmt::Debug for dyn ArtifactDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ArtifactDir")
    }
}

/// Locates and opens artifact roots.
pub trait Locator: Send + Sync {
    fn open(&self, root: &Path) -> Result<Box<dyn ArtifactDir>>;
}

// ─── Filesystem Locator ─────────────────────────────────────────

/// Walks a directory tree on the local filesystem, honoring .gitignore.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLocator;

impl Locator for FsLocator {
    fn open(&self, root: &Path) -> Result<Box<dyn ArtifactDir>> {
        if !root.is_dir() {
            return Err(IndexError::RootOpen {
                root: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not a directory",
                ),
            });
        }
        Ok(Box::new(FsDir {
            root: root.to_path_buf(),
        }))
    }
}

struct FsDir {
    root: PathBuf,
}

impl ArtifactDir for FsDir {
    fn files(&mut self) -> Box<dyn Iterator<Item = Box<dyn ArtifactFile>> + '_> {
        let root = self.root.clone();
        let walk = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        Box::new(walk.filter_map(move |entry| {
            let entry = entry.ok()?;
            if !entry.file_type()?.is_file() {
                return None;
            }
            let absolute = entry.into_path();
            let relative = absolute
                .strip_prefix(&root)
                .ok()?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some(Box::new(FsFile { absolute, relative }) as Box<dyn ArtifactFile>)
        }))
    }
}

struct FsFile {
    absolute: PathBuf,
    relative: String,
}

impl ArtifactFile for FsFile {
    fn relative_path(&self) -> &str {
        &self.relative
    }

    fn open(&self) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(&self.absolute)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_missing_root_fails() {
        let err = FsLocator.open(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, IndexError::RootOpen { .. }));
    }

    #[test]
    fn test_walk_yields_relative_slash_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg/A.tyd"), r#"{"name":"pkg.A"}"#).unwrap();
        fs::write(dir.path().join("top.tyd"), r#"{"name":"top"}"#).unwrap();

        let mut opened = FsLocator.open(dir.path()).unwrap();
        let mut paths: Vec<String> = opened
            .files()
            .map(|f| f.relative_path().to_string())
            .collect();
        paths.sort();
        assert_eq!(paths, vec!["pkg/A.tyd", "top.tyd"]);
    }

    #[test]
    fn test_file_streams_are_readable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("u.tyd"), "payload").unwrap();

        let mut opened = FsLocator.open(dir.path()).unwrap();
        let file = opened.files().next().unwrap();
        let mut content = String::new();
        file.open().unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "payload");
    }
}
