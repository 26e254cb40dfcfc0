//! The Library Manager index, shared by every project of a run.

use crate::capabilities::{Capabilities, HttpError};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Default location of the Library Manager index.
pub const DEFAULT_LIBRARY_INDEX_URL: &str =
    "https://downloads.arduino.cc/libraries/library_index.json";

/// Failures loading the Library Manager index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Download failed.
    #[error("Failed to download Library Manager index: {0}")]
    Http(#[from] HttpError),

    /// Local file could not be read.
    #[error("Failed to read Library Manager index {path}: {source}")]
    Io {
        /// Index file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Contents are not an index.
    #[error("Failed to parse Library Manager index: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One release listed in the index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexedRelease {
    /// Library name.
    pub name: String,
    /// Release version.
    #[serde(default)]
    pub version: String,
}

/// The Library Manager index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryIndex {
    releases: Vec<IndexedRelease>,
    names: HashSet<String>,
}

#[derive(Deserialize)]
struct RawIndex {
    libraries: Vec<IndexedRelease>,
}

impl LibraryIndex {
    /// Parses index JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not an index document.
    pub fn parse(bytes: &[u8]) -> Result<Self, IndexError> {
        let raw: RawIndex = serde_json::from_slice(bytes)?;
        Ok(Self::from_releases(raw.libraries))
    }

    /// Builds an index from releases.
    #[must_use]
    pub fn from_releases(releases: Vec<IndexedRelease>) -> Self {
        let names = releases.iter().map(|r| r.name.clone()).collect();
        Self { releases, names }
    }

    /// Builds an index holding one release of each named library.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_releases(
            names
                .into_iter()
                .map(|name| IndexedRelease {
                    name: name.into(),
                    version: "1.0.0".to_string(),
                })
                .collect(),
        )
    }

    /// Returns true if a library named exactly `name` is indexed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of releases in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Returns true if the index lists no release.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

/// Where the index is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSource {
    /// Downloaded over HTTP.
    Url(String),
    /// Read from a local file.
    File(PathBuf),
}

impl IndexSource {
    /// Interprets `text` as a URL if it has an HTTP scheme, else as a path.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.starts_with("http://") || text.starts_with("https://") {
            Self::Url(text.to_string())
        } else {
            Self::File(PathBuf::from(text))
        }
    }
}

impl Default for IndexSource {
    fn default() -> Self {
        Self::Url(DEFAULT_LIBRARY_INDEX_URL.to_string())
    }
}

/// The index loaded at most once, on first use, and then read-only.
///
/// A load failure is kept too, so later users see the same error.
#[derive(Debug, Default)]
pub struct SharedLibraryIndex {
    source: IndexSource,
    cell: OnceCell<Result<LibraryIndex, String>>,
}

impl SharedLibraryIndex {
    /// Creates an unloaded index reading from `source`.
    #[must_use]
    pub fn new(source: IndexSource) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Creates an already-loaded index.
    #[must_use]
    pub fn preloaded(index: LibraryIndex) -> Self {
        Self {
            source: IndexSource::default(),
            cell: OnceCell::with_value(Ok(index)),
        }
    }

    /// Returns true once a load has been attempted.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Returns the index, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns the load error text if the index could not be loaded.
    pub fn get(&self, capabilities: &Capabilities) -> Result<&LibraryIndex, &str> {
        self.cell
            .get_or_init(|| {
                let loaded = self.load(capabilities);
                match &loaded {
                    Ok(index) => info!("Loaded Library Manager index with {} releases", index.len()),
                    Err(e) => warn!("{}", e),
                }
                loaded.map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(String::as_str)
    }

    fn load(&self, capabilities: &Capabilities) -> Result<LibraryIndex, IndexError> {
        let bytes = match &self.source {
            IndexSource::Url(url) => capabilities.http.fetch(url)?,
            IndexSource::File(path) => {
                capabilities
                    .fs
                    .read(path)
                    .map_err(|source| IndexError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
        };
        LibraryIndex::parse(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::FakeHttp;
    use std::sync::Arc;

    const INDEX: &str = r#"{"libraries": [
        {"name": "Servo", "version": "1.1.8", "author": "Arduino"},
        {"name": "Servo", "version": "1.2.0"},
        {"name": "Adafruit GFX Library", "version": "1.11.0"}
    ]}"#;

    #[test]
    fn parses_names() {
        let index = LibraryIndex::parse(INDEX.as_bytes()).unwrap();
        assert_eq!(index.len(), 3);
        assert!(index.contains("Servo"));
        assert!(index.contains("Adafruit GFX Library"));
        assert!(!index.contains("servo"));
    }

    #[test]
    fn source_from_text() {
        assert_eq!(
            IndexSource::parse("https://example.com/i.json"),
            IndexSource::Url("https://example.com/i.json".into())
        );
        assert_eq!(
            IndexSource::parse("/tmp/index.json"),
            IndexSource::File("/tmp/index.json".into())
        );
    }

    #[test]
    fn loads_once_over_http() {
        let http = Arc::new(FakeHttp::new().body("https://example.com/i.json", INDEX));
        let mut capabilities = Capabilities::default();
        capabilities.http = http.clone();

        let shared = SharedLibraryIndex::new(IndexSource::parse("https://example.com/i.json"));
        assert!(!shared.is_loaded());
        assert!(shared.get(&capabilities).unwrap().contains("Servo"));
        assert!(shared.get(&capabilities).unwrap().contains("Servo"));
        assert_eq!(http.requests().len(), 1);
    }

    #[test]
    fn keeps_load_error() {
        let capabilities = Capabilities::default().with_http(FakeHttp::new());
        let shared = SharedLibraryIndex::new(IndexSource::parse("https://example.com/i.json"));

        let first = shared.get(&capabilities).unwrap_err().to_string();
        assert!(first.starts_with("Failed to download Library Manager index"));
        assert_eq!(shared.get(&capabilities).unwrap_err(), first);
    }

    #[test]
    fn preloaded_index_needs_no_capability() {
        let shared = SharedLibraryIndex::preloaded(LibraryIndex::from_names(["Servo"]));
        let capabilities = Capabilities::default().with_http(FakeHttp::new());
        assert!(shared.is_loaded());
        assert!(shared.get(&capabilities).unwrap().contains("Servo"));
    }
}
