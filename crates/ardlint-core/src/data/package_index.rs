//! Package index data: the resolved index file and its parsed contents.

use crate::capabilities::Filesystem;
use crate::classify::{has_package_index_extension, has_valid_package_index_filename};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A Boards Manager package index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageIndex {
    /// Packages in the index.
    pub packages: Vec<Package>,
}

/// One vendor package.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    pub maintainer: String,
    #[serde(rename = "websiteURL")]
    pub website_url: String,
    pub email: String,
    pub help: Help,
    pub platforms: Vec<Platform>,
    pub tools: Vec<Tool>,
}

/// Package help links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Help {
    /// Online help URL.
    pub online: String,
}

/// One platform release.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub name: String,
    pub architecture: String,
    pub version: String,
    pub category: String,
    pub url: String,
    pub archive_file_name: String,
    pub checksum: String,
    pub size: Size,
    pub boards: Vec<Board>,
    pub tools_dependencies: Vec<ToolDependency>,
}

/// A board listed by a platform release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Board {
    /// Board name.
    pub name: String,
}

/// A tool required by a platform release.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolDependency {
    pub packager: String,
    pub name: String,
    pub version: String,
}

/// One tool release.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tool {
    pub name: String,
    pub version: String,
    pub systems: Vec<ToolSystem>,
}

/// A host-specific tool archive.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSystem {
    pub host: String,
    pub url: String,
    pub archive_file_name: String,
    pub checksum: String,
    pub size: Size,
}

/// Archive size, written as a string by most indexes.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Size {
    Text(String),
    Number(u64),
}

/// Prefetched data of a package index project.
#[derive(Debug, Clone)]
pub struct PackageIndexData {
    path: Option<PathBuf>,
    json_error: Option<String>,
    index: Result<PackageIndex, String>,
}

impl PackageIndexData {
    /// Resolves and loads the package index of a project at `path`.
    ///
    /// A file path is the index itself. In a folder the first file with a
    /// valid index name wins, then the first `.json` file.
    pub fn load(fs: &dyn Filesystem, path: &Path) -> Self {
        let Some(path) = resolve(fs, path) else {
            debug!("No package index file at {}", path.display());
            return Self {
                path: None,
                json_error: Some("Package index file not found".to_string()),
                index: Err("Package index file not found".to_string()),
            };
        };

        let raw = match fs.read(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Can't read {}: {}", path.display(), e);
                return Self {
                    path: Some(path),
                    json_error: Some(e.to_string()),
                    index: Err(e.to_string()),
                };
            }
        };

        let json_error = serde_json::from_slice::<serde_json::Value>(&raw)
            .err()
            .map(|e| e.to_string());
        let index = serde_json::from_slice::<PackageIndex>(&raw).map_err(|e| e.to_string());

        Self {
            path: Some(path),
            json_error,
            index,
        }
    }

    /// The resolved index file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Error if the file is not valid JSON.
    #[must_use]
    pub fn json_error(&self) -> Option<&str> {
        self.json_error.as_deref()
    }

    /// The parsed index, if it has the index structure.
    #[must_use]
    pub fn index(&self) -> Option<&PackageIndex> {
        self.index.as_ref().ok()
    }

    /// Error if the file does not have the index structure.
    #[must_use]
    pub fn index_error(&self) -> Option<&str> {
        self.index.as_ref().err().map(String::as_str)
    }
}

fn resolve(fs: &dyn Filesystem, path: &Path) -> Option<PathBuf> {
    if !fs.is_dir(path) {
        return fs.is_file(path).then(|| path.to_path_buf());
    }

    let files: Vec<_> = fs
        .read_dir(path)
        .unwrap_or_default()
        .into_iter()
        .filter(|e| !e.is_dir)
        .collect();
    files
        .iter()
        .find(|e| has_valid_package_index_filename(&e.path, true))
        .or_else(|| files.iter().find(|e| has_package_index_extension(&e.path)))
        .map(|e| e.path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::OsFilesystem;
    use std::fs;
    use tempfile::TempDir;

    const VALID: &str = r#"{
        "packages": [{
            "name": "foo",
            "maintainer": "Foo",
            "websiteURL": "https://example.com",
            "email": "foo@example.com",
            "help": {"online": "https://example.com/help"},
            "platforms": [{
                "name": "Foo Boards",
                "architecture": "avr",
                "version": "1.0.0",
                "category": "Contributed",
                "url": "https://example.com/foo-1.0.0.tar.bz2",
                "archiveFileName": "foo-1.0.0.tar.bz2",
                "checksum": "SHA-256:00",
                "size": "1234",
                "boards": [{"name": "Foo Uno"}],
                "toolsDependencies": []
            }],
            "tools": []
        }]
    }"#;

    #[test]
    fn loads_typed_index() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("package_foo_index.json");
        fs::write(&file, VALID).unwrap();

        let data = PackageIndexData::load(&OsFilesystem, &file);
        assert!(data.json_error().is_none());
        let index = data.index().unwrap();
        assert_eq!(index.packages[0].platforms[0].architecture, "avr");
        assert_eq!(index.packages[0].platforms[0].size, Size::Text("1234".into()));
    }

    #[test]
    fn invalid_json_fails_both_levels() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("package_foo_index.json");
        fs::write(&file, "{ not json").unwrap();

        let data = PackageIndexData::load(&OsFilesystem, &file);
        assert!(data.json_error().is_some());
        assert!(data.index_error().is_some());
    }

    #[test]
    fn valid_json_with_wrong_structure() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("package_foo_index.json");
        fs::write(&file, r#"{"packages": [{"name": "foo"}]}"#).unwrap();

        let data = PackageIndexData::load(&OsFilesystem, &file);
        assert!(data.json_error().is_none());
        assert!(data.index_error().unwrap().contains("maintainer"));
    }

    #[test]
    fn folder_prefers_valid_filename() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.json"), "{}").unwrap();
        fs::write(tmp.path().join("package_foo_index.json"), VALID).unwrap();

        let data = PackageIndexData::load(&OsFilesystem, tmp.path());
        assert_eq!(data.path(), Some(tmp.path().join("package_foo_index.json").as_path()));
    }

    #[test]
    fn folder_without_index() {
        let tmp = TempDir::new().unwrap();
        let data = PackageIndexData::load(&OsFilesystem, tmp.path());
        assert!(data.path().is_none());
        assert!(data.index().is_none());
    }
}
