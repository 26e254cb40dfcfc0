//! Sketch data: main file and `sketch.json`.

use crate::capabilities::Filesystem;
use crate::classify::MAIN_SKETCH_EXTENSIONS;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the sketch metadata file.
pub const SKETCH_METADATA_FILE: &str = "sketch.json";

/// State of `sketch.json`.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchMetadata {
    /// No metadata file.
    Absent,
    /// Valid JSON.
    Parsed(serde_json::Value),
    /// Unreadable or not JSON.
    Invalid(String),
}

/// Prefetched data of a sketch project.
#[derive(Debug, Clone)]
pub struct SketchData {
    main_file: Option<PathBuf>,
    metadata: SketchMetadata,
}

impl SketchData {
    /// Loads the sketch at `root`.
    pub fn load(fs: &dyn Filesystem, root: &Path) -> Self {
        let folder_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Matched against the listing so the check is case-sensitive on every filesystem.
        let files: Vec<String> = fs
            .read_dir(root)
            .unwrap_or_default()
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name)
            .collect();
        let main_file = MAIN_SKETCH_EXTENSIONS
            .iter()
            .map(|ext| format!("{folder_name}.{ext}"))
            .find(|name| files.contains(name))
            .map(|name| root.join(name));

        let metadata_path = root.join(SKETCH_METADATA_FILE);
        let metadata = if fs.is_file(&metadata_path) {
            match fs.read(&metadata_path) {
                Ok(bytes) => match serde_json::from_slice(&bytes) {
                    Ok(value) => SketchMetadata::Parsed(value),
                    Err(e) => SketchMetadata::Invalid(e.to_string()),
                },
                Err(e) => SketchMetadata::Invalid(e.to_string()),
            }
        } else {
            SketchMetadata::Absent
        };
        debug!("Loaded sketch data for {}", root.display());

        Self {
            main_file,
            metadata,
        }
    }

    /// The `<folder>.ino` or `<folder>.pde` file, if present.
    #[must_use]
    pub fn main_file(&self) -> Option<&Path> {
        self.main_file.as_deref()
    }

    /// State of `sketch.json`.
    #[must_use]
    pub fn metadata(&self) -> &SketchMetadata {
        &self.metadata
    }
}
