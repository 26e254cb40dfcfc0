//! Platform data: the configuration files.

use crate::capabilities::Filesystem;
use crate::properties::Properties;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One platform configuration file.
#[derive(Debug, Clone)]
pub struct ConfigurationFile {
    path: PathBuf,
    exists: bool,
    properties: Properties,
    load_error: Option<String>,
}

impl ConfigurationFile {
    fn load(fs: &dyn Filesystem, path: PathBuf) -> Self {
        if !fs.is_file(&path) {
            return Self {
                path,
                exists: false,
                properties: Properties::default(),
                load_error: None,
            };
        }

        let parsed = fs
            .read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| Properties::parse(&text).map_err(|e| e.to_string()));
        let (properties, load_error) = match parsed {
            Ok(properties) => (properties, None),
            Err(e) => {
                warn!("Can't load {}: {}", path.display(), e);
                (Properties::default(), Some(e))
            }
        };

        Self {
            path,
            exists: true,
            properties,
            load_error,
        }
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Parsed contents; empty if absent or invalid.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Error from reading or parsing the file.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }
}

/// Prefetched data of a platform project.
#[derive(Debug, Clone)]
pub struct PlatformData {
    /// `boards.txt`.
    pub boards: ConfigurationFile,
    /// `platform.txt`.
    pub platform: ConfigurationFile,
    /// `programmers.txt`.
    pub programmers: ConfigurationFile,
}

impl PlatformData {
    /// Loads the platform at `root`.
    pub fn load(fs: &dyn Filesystem, root: &Path) -> Self {
        Self {
            boards: ConfigurationFile::load(fs, root.join("boards.txt")),
            platform: ConfigurationFile::load(fs, root.join("platform.txt")),
            programmers: ConfigurationFile::load(fs, root.join("programmers.txt")),
        }
    }
}
