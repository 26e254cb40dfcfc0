//! Filesystem capability.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::trace;
use walkdir::WalkDir;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// File name of the entry.
    pub name: String,
    /// True if the entry is a directory, following symlinks.
    pub is_dir: bool,
    /// True if the entry itself is a symlink.
    pub is_symlink: bool,
}

/// Access to the filesystem, abstracted so discovery and rules can be tested
/// against fixtures.
pub trait Filesystem: Send + Sync {
    /// Lists a directory, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Lists every entry below `path`, depth first in sorted order, without
    /// following symlinks. `path` itself is not included.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be read.
    fn walk(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Reads a whole file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Returns true if `path` exists, following symlinks.
    fn exists(&self, path: &Path) -> bool;

    /// Returns true if `path` is a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns true if `path` is a regular file, following symlinks.
    fn is_file(&self, path: &Path) -> bool {
        self.exists(path) && !self.is_dir(path)
    }

    /// Returns true if `path` itself is a symlink.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Creates an empty scratch folder, removed when the handle drops.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be created.
    fn temp_dir(&self, prefix: &str) -> io::Result<TempDir>;

    /// Reads a file as UTF-8 text (lossy).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.read(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// [`Filesystem`] backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFilesystem;

impl OsFilesystem {
    fn entry(path: PathBuf) -> DirEntry {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let is_symlink = std::fs::symlink_metadata(&path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        let is_dir = path.is_dir();
        DirEntry {
            path,
            name,
            is_dir,
            is_symlink,
        }
    }
}

impl Filesystem for OsFilesystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| Self::entry(e.path())))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn walk(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(path)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            match entry {
                Ok(e) => entries.push(Self::entry(e.into_path())),
                Err(e) if e.depth() == 0 => {
                    return Err(e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("walk failed")));
                }
                Err(e) => trace!("Skipping unreadable entry under {}: {}", path.display(), e),
            }
        }
        Ok(entries)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn temp_dir(&self, prefix: &str) -> io::Result<TempDir> {
        tempfile::Builder::new().prefix(prefix).tempdir()
    }
}
