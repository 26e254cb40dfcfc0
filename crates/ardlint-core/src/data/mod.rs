//! Per-project data, loaded once before any rule runs.
//!
//! Loading never fails: every problem is kept as a value so that the rule
//! checking that artifact can report it.

mod library;
mod library_index;
mod package_index;
mod platform;
mod sketch;

pub use library::{LibraryData, Layout};
pub use library_index::{
    IndexError, IndexSource, IndexedRelease, LibraryIndex, SharedLibraryIndex,
    DEFAULT_LIBRARY_INDEX_URL,
};
pub use package_index::{
    Board, Help, Package, PackageIndex, PackageIndexData, Platform, Size, Tool, ToolDependency,
    ToolSystem,
};
pub use platform::{ConfigurationFile, PlatformData};
pub use sketch::{SketchData, SketchMetadata, SKETCH_METADATA_FILE};

use crate::capabilities::{Capabilities, DirEntry, GitState, GitTag};
use crate::project::{Project, ProjectType};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What is known about the project as a git working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitData {
    /// The project folder is not the root of a repository.
    NotRepository,
    /// The project folder is a repository.
    Repository(GitState),
    /// The repository could not be read.
    Error(String),
}

impl GitData {
    /// True if the project folder is a repository.
    #[must_use]
    pub fn is_repo(&self) -> bool {
        !matches!(self, Self::NotRepository)
    }

    /// Tags reachable from HEAD, newest first.
    #[must_use]
    pub fn tags(&self) -> &[GitTag] {
        match self {
            Self::Repository(state) => &state.tags,
            Self::NotRepository | Self::Error(_) => &[],
        }
    }

    /// The tag closest to HEAD.
    #[must_use]
    pub fn latest_tag(&self) -> Option<&GitTag> {
        self.tags().first()
    }
}

/// Data specific to the project type.
#[derive(Debug, Clone)]
pub enum ArtifactData {
    /// Sketch data.
    Sketch(SketchData),
    /// Library data.
    Library(LibraryData),
    /// Platform data.
    Platform(PlatformData),
    /// Package index data.
    PackageIndex(PackageIndexData),
}

/// Everything rules may read about one project.
#[derive(Debug, Clone)]
pub struct ProjectData {
    folder: PathBuf,
    entries: Vec<DirEntry>,
    tree: Vec<DirEntry>,
    artifact: ArtifactData,
    git: GitData,
}

impl ProjectData {
    /// Loads the data of `project`.
    pub fn load(project: &Project, capabilities: &Capabilities) -> Self {
        let fs = capabilities.fs.as_ref();
        let path = project.path();
        let folder = if fs.is_dir(path) {
            path.to_path_buf()
        } else {
            path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        };
        debug!("Loading {} data from {}", project.project_type(), path.display());

        let entries = fs.read_dir(&folder).unwrap_or_else(|e| {
            warn!("Can't list {}: {}", folder.display(), e);
            Vec::new()
        });

        let tree = match project.project_type() {
            ProjectType::Sketch | ProjectType::Library => fs.walk(&folder).unwrap_or_default(),
            _ => Vec::new(),
        };

        let artifact = match project.project_type() {
            ProjectType::Library => ArtifactData::Library(LibraryData::load(fs, &folder)),
            ProjectType::Platform => ArtifactData::Platform(PlatformData::load(fs, &folder)),
            ProjectType::PackageIndex => {
                ArtifactData::PackageIndex(PackageIndexData::load(fs, path))
            }
            _ => ArtifactData::Sketch(SketchData::load(fs, &folder)),
        };

        let git = match capabilities.git.open(&folder) {
            Ok(Some(state)) => GitData::Repository(state),
            Ok(None) => GitData::NotRepository,
            Err(e) => {
                warn!("Can't read repository at {}: {}", folder.display(), e);
                GitData::Error(e.to_string())
            }
        };

        Self {
            folder,
            entries,
            tree,
            artifact,
            git,
        }
    }

    /// The project folder; the containing folder for a package index file.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Base name of the project folder.
    #[must_use]
    pub fn folder_name(&self) -> String {
        self.folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Entries directly in the project folder, sorted by name.
    #[must_use]
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Every entry below the project folder, without following symlinks.
    ///
    /// Only collected for sketches and libraries.
    #[must_use]
    pub fn tree(&self) -> &[DirEntry] {
        &self.tree
    }

    /// Type-specific data.
    #[must_use]
    pub fn artifact(&self) -> &ArtifactData {
        &self.artifact
    }

    /// Library data, if the project is a library.
    #[must_use]
    pub fn library(&self) -> Option<&LibraryData> {
        match &self.artifact {
            ArtifactData::Library(data) => Some(data),
            _ => None,
        }
    }

    /// Sketch data, if the project is a sketch.
    #[must_use]
    pub fn sketch(&self) -> Option<&SketchData> {
        match &self.artifact {
            ArtifactData::Sketch(data) => Some(data),
            _ => None,
        }
    }

    /// Platform data, if the project is a platform.
    #[must_use]
    pub fn platform(&self) -> Option<&PlatformData> {
        match &self.artifact {
            ArtifactData::Platform(data) => Some(data),
            _ => None,
        }
    }

    /// Package index data, if the project is a package index.
    #[must_use]
    pub fn package_index(&self) -> Option<&PackageIndexData> {
        match &self.artifact {
            ArtifactData::PackageIndex(data) => Some(data),
            _ => None,
        }
    }

    /// Git state of the project folder.
    #[must_use]
    pub fn git(&self) -> &GitData {
        &self.git
    }
}
