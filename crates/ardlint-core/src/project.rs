//! Project types and discovered project values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The kind of Arduino artifact a path holds.
///
/// `All` is a filter value matching every real type; `None` marks a path
/// that is not a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    /// An Arduino sketch.
    Sketch,
    /// An Arduino library.
    Library,
    /// A boards platform.
    Platform,
    /// A Boards Manager package index.
    PackageIndex,
    /// Wildcard filter matching every real type.
    All,
    /// Not a project.
    None,
}

impl ProjectType {
    /// The real project types, in classification priority order.
    pub const REAL: [Self; 4] = [Self::Sketch, Self::Library, Self::Platform, Self::PackageIndex];

    /// Returns whether `self` and `other` match.
    ///
    /// Matching is reflexive, `All` matches every type except `None`, and
    /// `None` matches only `None`.
    #[must_use]
    pub fn matches(self, other: Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::None, _) | (_, Self::None) => false,
            (Self::All, _) | (_, Self::All) => true,
            (a, b) => a == b,
        }
    }

    /// Returns the kebab-case name used on the command line and in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sketch => "sketch",
            Self::Library => "library",
            Self::Platform => "platform",
            Self::PackageIndex => "package-index",
            Self::All => "all",
            Self::None => "none",
        }
    }

    /// Returns the rule ID prefix for this type, if it is a real type.
    #[must_use]
    pub fn id_prefix(self) -> Option<char> {
        match self {
            Self::Sketch => Some('S'),
            Self::Library => Some('L'),
            Self::Platform => Some('P'),
            Self::PackageIndex => Some('I'),
            Self::All | Self::None => None,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown project type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No matching project type for string {0}")]
pub struct ParseProjectTypeError(pub String);

impl FromStr for ProjectType {
    type Err = ParseProjectTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sketch" => Ok(Self::Sketch),
            "library" => Ok(Self::Library),
            "platform" => Ok(Self::Platform),
            "package-index" | "package_index" | "packageindex" => Ok(Self::PackageIndex),
            "all" => Ok(Self::All),
            _ => Err(ParseProjectTypeError(s.to_string())),
        }
    }
}

/// A discovered project. Immutable after discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    path: PathBuf,
    project_type: ProjectType,
    superproject_type: ProjectType,
}

impl Project {
    /// Creates a root project; its superproject type is its own type.
    #[must_use]
    pub fn root(path: impl Into<PathBuf>, project_type: ProjectType) -> Self {
        Self {
            path: path.into(),
            project_type,
            superproject_type: project_type,
        }
    }

    /// Creates a subproject of a project tree whose apex has `superproject_type`.
    #[must_use]
    pub fn subproject(
        path: impl Into<PathBuf>,
        project_type: ProjectType,
        superproject_type: ProjectType,
    ) -> Self {
        Self {
            path: path.into(),
            project_type,
            superproject_type,
        }
    }

    /// Path of the project folder, or of the file for a package index.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Type of this project.
    #[must_use]
    pub fn project_type(&self) -> ProjectType {
        self.project_type
    }

    /// Type of the topmost ancestor project.
    #[must_use]
    pub fn superproject_type(&self) -> ProjectType {
        self.superproject_type
    }

    /// Returns true if this project was found inside a project of another type.
    #[must_use]
    pub fn is_subproject(&self) -> bool {
        self.superproject_type != self.project_type
    }
}
