//! Library data: `library.properties` and the source layout.

use crate::capabilities::Filesystem;
use crate::classify::{has_header_extension, LIBRARY_METADATA_FILE};
use crate::properties::Properties;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Library source layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Sources in the library root.
    Flat,
    /// Sources under `src/`.
    Recursive,
}

/// Prefetched data of a library project.
#[derive(Debug, Clone)]
pub struct LibraryData {
    properties: Properties,
    load_error: Option<String>,
    legacy: bool,
    layout: Layout,
    source_dir: PathBuf,
    source_headers: Vec<String>,
}

impl LibraryData {
    /// Loads the library at `root`.
    pub fn load(fs: &dyn Filesystem, root: &Path) -> Self {
        let metadata_path = root.join(LIBRARY_METADATA_FILE);
        let legacy = !fs.is_file(&metadata_path);

        let (properties, load_error) = if legacy {
            debug!("{} has no {}", root.display(), LIBRARY_METADATA_FILE);
            (Properties::default(), None)
        } else {
            match fs.read_to_string(&metadata_path) {
                Ok(text) => match Properties::parse(&text) {
                    Ok(properties) => (properties, None),
                    Err(e) => {
                        warn!("Invalid {}: {}", metadata_path.display(), e);
                        (Properties::default(), Some(e.to_string()))
                    }
                },
                Err(e) => {
                    warn!("Can't read {}: {}", metadata_path.display(), e);
                    (Properties::default(), Some(e.to_string()))
                }
            }
        };

        let layout = if !legacy && fs.is_dir(&root.join("src")) {
            Layout::Recursive
        } else {
            Layout::Flat
        };
        let source_dir = match layout {
            Layout::Recursive => root.join("src"),
            Layout::Flat => root.to_path_buf(),
        };

        let mut source_headers: Vec<String> = fs
            .read_dir(&source_dir)
            .unwrap_or_default()
            .into_iter()
            .filter(|e| !e.is_dir && has_header_extension(&e.path))
            .map(|e| e.name)
            .collect();
        source_headers.sort();

        Self {
            properties,
            load_error,
            legacy,
            layout,
            source_dir,
            source_headers,
        }
    }

    /// Parsed `library.properties`; empty if absent or invalid.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Error from reading or parsing `library.properties`.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// True if `library.properties` loaded without error.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.load_error.is_none()
    }

    /// True if the library has no `library.properties` (1.0 format).
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// The source layout.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Folder holding the library sources.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// File names of the headers directly in the source folder, sorted.
    #[must_use]
    pub fn source_headers(&self) -> &[String] {
        &self.source_headers
    }

    /// True if `dot_a_linkage` is enabled.
    #[must_use]
    pub fn dot_a_linkage(&self) -> bool {
        self.properties.get("dot_a_linkage") == Some("true")
    }

    /// True if `precompiled` is enabled.
    #[must_use]
    pub fn is_precompiled(&self) -> bool {
        matches!(self.properties.get("precompiled"), Some("true" | "full"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::OsFilesystem;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn legacy_library_is_flat_and_loaded() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Foo.h"), "").unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();

        let data = LibraryData::load(&OsFilesystem, tmp.path());
        assert!(data.is_legacy());
        assert!(data.is_loaded());
        assert_eq!(data.layout(), Layout::Flat);
        assert_eq!(data.source_headers(), ["Foo.h".to_string()]);
    }

    #[test]
    fn recursive_layout_uses_src_headers() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("library.properties"),
            "name=Foo\nprecompiled=full\ndot_a_linkage=true\n",
        )
        .unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/Foo.h"), "").unwrap();
        fs::write(tmp.path().join("src/Bar.hpp"), "").unwrap();
        fs::write(tmp.path().join("src/Foo.cpp"), "").unwrap();

        let data = LibraryData::load(&OsFilesystem, tmp.path());
        assert_eq!(data.layout(), Layout::Recursive);
        assert_eq!(data.source_dir(), tmp.path().join("src"));
        assert_eq!(data.source_headers(), ["Bar.hpp".to_string(), "Foo.h".to_string()]);
        assert!(data.is_precompiled());
        assert!(data.dot_a_linkage());
    }

    #[test]
    fn invalid_properties_are_captured() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("library.properties"), "name=Foo\nbroken\n").unwrap();

        let data = LibraryData::load(&OsFilesystem, tmp.path());
        assert!(!data.is_legacy());
        assert!(!data.is_loaded());
        assert!(data.load_error().unwrap().contains("line 2"));
        assert!(data.properties().is_empty());
    }
}
