//! Project classification by indicator files.
//!
//! Detection is intent-based: the presence of an indicator file is enough,
//! the validity of its contents is left to rules.

use crate::capabilities::Filesystem;
use crate::project::ProjectType;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::trace;

/// Extensions of a sketch's main file.
pub const MAIN_SKETCH_EXTENSIONS: [&str; 2] = ["ino", "pde"];

/// Extensions of the other source files of a sketch.
pub const ADDITIONAL_SKETCH_EXTENSIONS: [&str; 8] = ["h", "c", "hpp", "hh", "cpp", "S", "tpp", "ipp"];

/// Extensions of library header files.
pub const HEADER_EXTENSIONS: [&str; 3] = ["h", "hpp", "hh"];

/// Name of the library metadata file.
pub const LIBRARY_METADATA_FILE: &str = "library.properties";

/// Folders holding library example sketches.
pub const EXAMPLES_FOLDER_NAMES: [&str; 2] = ["examples", "example"];

/// Folders holding libraries bundled with a platform.
pub const BUNDLED_LIBRARIES_FOLDER_NAMES: [&str; 1] = ["libraries"];

/// Platform configuration files.
pub const PLATFORM_CONFIGURATION_FILES: [&str; 5] = [
    "boards.txt",
    "boards.local.txt",
    "platform.txt",
    "platform.local.txt",
    "programmers.txt",
];

/// The platform configuration file every platform must have.
pub const REQUIRED_PLATFORM_CONFIGURATION_FILE: &str = "boards.txt";

static PACKAGE_INDEX_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^package_(.+_)+index\.json$").expect("valid regex"));

static OFFICIAL_PACKAGE_INDEX_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^package_(.+_)*index\.json$").expect("valid regex"));

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or_default()
}

/// Returns true if `path` has a sketch main-file extension.
#[must_use]
pub fn has_main_sketch_extension(path: &Path) -> bool {
    MAIN_SKETCH_EXTENSIONS.contains(&extension(path))
}

/// Returns true if `path` has any sketch source extension.
#[must_use]
pub fn has_sketch_source_extension(path: &Path) -> bool {
    has_main_sketch_extension(path) || ADDITIONAL_SKETCH_EXTENSIONS.contains(&extension(path))
}

/// Returns true if `path` is named `library.properties`.
#[must_use]
pub fn is_library_metadata_file(path: &Path) -> bool {
    file_name(path) == LIBRARY_METADATA_FILE
}

/// Returns true if `path` has a header extension.
#[must_use]
pub fn has_header_extension(path: &Path) -> bool {
    HEADER_EXTENSIONS.contains(&extension(path))
}

/// Returns true if `path` is any platform configuration file.
#[must_use]
pub fn is_platform_configuration_file(path: &Path) -> bool {
    PLATFORM_CONFIGURATION_FILES.contains(&file_name(path))
}

/// Returns true if `path` has the package index extension.
#[must_use]
pub fn has_package_index_extension(path: &Path) -> bool {
    extension(path) == "json"
}

/// Returns true if the file name of `path` is a valid package index name.
///
/// Official indexes may drop the vendor part (`package_index.json`).
#[must_use]
pub fn has_valid_package_index_filename(path: &Path, official: bool) -> bool {
    let pattern = if official {
        &OFFICIAL_PACKAGE_INDEX_FILENAME
    } else {
        &PACKAGE_INDEX_FILENAME
    };
    pattern.is_match(file_name(path))
}

/// Classifies a file given directly as a target.
///
/// Returns the first type, in the order sketch, library, platform, package
/// index, that both matches `filter` and for which `path` is an indicator.
#[must_use]
pub fn classify_file(path: &Path, filter: ProjectType) -> Option<ProjectType> {
    trace!("Checking if {} is {} indicator file", path.display(), filter);

    let found = ProjectType::REAL.into_iter().find(|candidate| {
        filter.matches(*candidate)
            && match candidate {
                ProjectType::Sketch => has_main_sketch_extension(path),
                ProjectType::Library => is_library_metadata_file(path) || has_header_extension(path),
                ProjectType::Platform => is_platform_configuration_file(path),
                ProjectType::PackageIndex => has_package_index_extension(path),
                ProjectType::All | ProjectType::None => false,
            }
    });

    match found {
        Some(project_type) => trace!("{} is {} indicator file", path.display(), project_type),
        None => trace!("{} is not indicator file", path.display()),
    }
    found
}

/// Classifies a directory by the files directly inside it.
///
/// Platforms require `boards.txt` and package indexes a valid index file
/// name. An unreadable directory is not a project.
#[must_use]
pub fn classify_dir(fs: &dyn Filesystem, path: &Path, filter: ProjectType) -> Option<ProjectType> {
    trace!("Checking if {} is {}", path.display(), filter);

    let Ok(entries) = fs.read_dir(path) else {
        trace!("Can't read {}", path.display());
        return None;
    };
    let files: Vec<_> = entries.iter().filter(|e| !e.is_dir).map(|e| e.path.as_path()).collect();
    let any = |predicate: fn(&Path) -> bool| files.iter().any(|f| predicate(f));

    let found = ProjectType::REAL.into_iter().find(|candidate| {
        filter.matches(*candidate)
            && match candidate {
                ProjectType::Sketch => any(has_main_sketch_extension),
                ProjectType::Library => {
                    any(is_library_metadata_file) || any(has_header_extension)
                }
                ProjectType::Platform => {
                    any(|f| file_name(f) == REQUIRED_PLATFORM_CONFIGURATION_FILE)
                }
                ProjectType::PackageIndex => {
                    any(|f| has_valid_package_index_filename(f, true))
                }
                ProjectType::All | ProjectType::None => false,
            }
    });

    if let Some(project_type) = found {
        trace!("{} is {}", path.display(), project_type);
    }
    found
}
