//! Project discovery.
//!
//! Turns target paths into the ordered list of projects to lint: each root
//! project is immediately followed by its subprojects, depth first.

use crate::capabilities::Filesystem;
use crate::classify::{
    classify_dir, classify_file, BUNDLED_LIBRARIES_FOLDER_NAMES, EXAMPLES_FOLDER_NAMES,
};
use crate::project::{Project, ProjectType};
use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Number of symlinks a single descent may follow before discovery gives up.
pub const MAX_SYMLINK_DEPTH: usize = 10;

/// Fatal discovery failures.
#[derive(Debug, Error, Diagnostic)]
pub enum DiscoveryError {
    /// A target path does not exist.
    #[error("Target path {} does not exist", path.display())]
    #[diagnostic(code(ardlint::discovery::target_not_found))]
    TargetNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A file target is not a project indicator file.
    #[error("Specified path {} is not an Arduino project", path.display())]
    #[diagnostic(
        code(ardlint::discovery::not_a_project),
        help("Pass the project folder, or use --project-type to select the project type")
    )]
    NotAProject {
        /// The file target.
        path: PathBuf,
    },

    /// Too many symlinks followed in one descent.
    #[error("Symlink loop detected at {}", path.display())]
    #[diagnostic(
        code(ardlint::discovery::symlink_loop),
        help("Remove the symlinks pointing to parent folders, or use --recursive false")
    )]
    SymlinkDepthExceeded {
        /// The directory where the limit was exceeded.
        path: PathBuf,
    },

    /// No project was found under a target path.
    #[error("No projects found with project path {}", path.display())]
    #[diagnostic(
        code(ardlint::discovery::no_projects),
        help("Check the --project-type and --recursive settings")
    )]
    NoProjectsFound {
        /// The target path.
        path: PathBuf,
    },

    /// A project folder could not be listed.
    #[error("Failed to read {}", path.display())]
    #[diagnostic(code(ardlint::discovery::io))]
    Io {
        /// The unreadable path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Discovers the projects under each target path, in target order.
///
/// # Errors
///
/// Returns an error if a target does not exist, a symlink loop is found, or
/// a target yields no projects.
pub fn discover(
    fs: &dyn Filesystem,
    targets: &[PathBuf],
    filter: ProjectType,
    recursive: bool,
) -> Result<Vec<Project>, DiscoveryError> {
    let mut projects = Vec::new();
    for target in targets {
        let found = discover_target(fs, target, filter, recursive)?;
        debug!("Found {} project(s) under {}", found.len(), target.display());
        projects.extend(found);
    }
    Ok(projects)
}

fn discover_target(
    fs: &dyn Filesystem,
    target: &Path,
    filter: ProjectType,
    recursive: bool,
) -> Result<Vec<Project>, DiscoveryError> {
    if !fs.exists(target) {
        return Err(DiscoveryError::TargetNotFound {
            path: target.to_path_buf(),
        });
    }

    let mut projects = Vec::new();

    if !fs.is_dir(target) {
        // An explicit type is taken as given; only `All` detects it.
        let detected = if filter == ProjectType::All {
            classify_file(target, filter)
        } else {
            Some(filter)
        };
        let Some(project_type) = detected else {
            return Err(DiscoveryError::NotAProject {
                path: target.to_path_buf(),
            });
        };
        let path = if project_type == ProjectType::PackageIndex {
            target.to_path_buf()
        } else {
            target.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        };
        push_with_subprojects(fs, &mut projects, Project::root(path, project_type))?;
    } else if filter == ProjectType::All || recursive {
        for root in find_projects_under(fs, target, filter, recursive, 0)? {
            push_with_subprojects(fs, &mut projects, root)?;
        }
    } else {
        // An explicit type on a non-recursive directory target is taken as given.
        push_with_subprojects(fs, &mut projects, Project::root(target, filter))?;
    }

    if projects.is_empty() {
        return Err(DiscoveryError::NoProjectsFound {
            path: target.to_path_buf(),
        });
    }
    Ok(projects)
}

fn push_with_subprojects(
    fs: &dyn Filesystem,
    projects: &mut Vec<Project>,
    root: Project,
) -> Result<(), DiscoveryError> {
    let subprojects = find_subprojects(fs, &root, root.project_type())?;
    projects.push(root);
    projects.extend(subprojects);
    Ok(())
}

fn find_projects_under(
    fs: &dyn Filesystem,
    path: &Path,
    filter: ProjectType,
    recursive: bool,
    symlink_depth: usize,
) -> Result<Vec<Project>, DiscoveryError> {
    if let Some(project_type) = classify_dir(fs, path, filter) {
        return Ok(vec![Project::root(path, project_type)]);
    }
    if !recursive {
        return Ok(Vec::new());
    }
    if symlink_depth > MAX_SYMLINK_DEPTH {
        return Err(DiscoveryError::SymlinkDepthExceeded {
            path: path.to_path_buf(),
        });
    }

    let Ok(entries) = fs.read_dir(path) else {
        trace!("Can't read {}", path.display());
        return Ok(Vec::new());
    };

    let mut projects = Vec::new();
    for entry in entries.into_iter().filter(|e| e.is_dir) {
        let depth = symlink_depth + usize::from(entry.is_symlink);
        projects.extend(find_projects_under(fs, &entry.path, filter, recursive, depth)?);
    }
    Ok(projects)
}

fn find_subprojects(
    fs: &dyn Filesystem,
    superproject: &Project,
    apex_type: ProjectType,
) -> Result<Vec<Project>, DiscoveryError> {
    let (folder_names, subproject_type, recursive): (&[&str], _, _) =
        match superproject.project_type() {
            // Example sketches may be nested in category folders.
            ProjectType::Library => (&EXAMPLES_FOLDER_NAMES, ProjectType::Sketch, true),
            ProjectType::Platform => (&BUNDLED_LIBRARIES_FOLDER_NAMES, ProjectType::Library, false),
            _ => return Ok(Vec::new()),
        };

    let mut immediate = Vec::new();
    for folder_name in folder_names {
        let folder = superproject.path().join(folder_name);
        if !fs.is_dir(&folder) {
            continue;
        }
        let entries = fs.read_dir(&folder).map_err(|source| DiscoveryError::Io {
            path: folder.clone(),
            source,
        })?;
        for entry in entries.into_iter().filter(|e| e.is_dir) {
            immediate.extend(find_projects_under(
                fs,
                &entry.path,
                subproject_type,
                recursive,
                0,
            )?);
        }
    }

    let mut all = Vec::new();
    for found in immediate {
        let subproject = Project::subproject(found.path(), found.project_type(), apex_type);
        let nested = find_subprojects(fs, &subproject, apex_type)?;
        all.push(subproject);
        all.extend(nested);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::OsFilesystem;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn summary(projects: &[Project], root: &Path) -> Vec<(String, ProjectType, ProjectType)> {
        projects
            .iter()
            .map(|p| {
                let rel = p.path().strip_prefix(root).unwrap_or(p.path());
                (
                    rel.to_string_lossy().replace('\\', "/"),
                    p.project_type(),
                    p.superproject_type(),
                )
            })
            .collect()
    }

    #[test]
    fn sketch_file_target_uses_parent_folder() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Foo/Foo.ino");
        touch(&file);

        let projects = discover(&OsFilesystem, &[file], ProjectType::All, true).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].path(), tmp.path().join("Foo"));
        assert_eq!(projects[0].project_type(), ProjectType::Sketch);
        assert!(!projects[0].is_subproject());
    }

    #[test]
    fn package_index_file_target_keeps_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("package_foo_index.json");
        touch(&file);

        let projects = discover(&OsFilesystem, &[file.clone()], ProjectType::All, true).unwrap();
        assert_eq!(projects[0].path(), file);
        assert_eq!(projects[0].project_type(), ProjectType::PackageIndex);
    }

    #[test]
    fn non_indicator_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("README.md");
        touch(&file);

        let err = discover(&OsFilesystem, &[file], ProjectType::All, true).unwrap_err();
        assert!(matches!(err, DiscoveryError::NotAProject { .. }));
    }

    #[test]
    fn explicit_type_accepts_any_file_target() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Foo/keywords.txt");
        touch(&file);

        let projects = discover(&OsFilesystem, &[file], ProjectType::Library, true).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].path(), tmp.path().join("Foo"));
        assert_eq!(projects[0].project_type(), ProjectType::Library);

        let index = tmp.path().join("boards.json");
        touch(&index);
        let projects =
            discover(&OsFilesystem, &[index.clone()], ProjectType::PackageIndex, true).unwrap();
        assert_eq!(projects[0].path(), index);
        assert_eq!(projects[0].project_type(), ProjectType::PackageIndex);
    }

    #[test]
    fn library_is_followed_by_its_examples() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("MyLib");
        touch(&lib.join("library.properties"));
        touch(&lib.join("examples/Basic/Basic.ino"));
        touch(&lib.join("examples/Advanced/Nested/Nested.ino"));
        touch(&lib.join("example/Other/Other.ino"));

        let projects = discover(&OsFilesystem, &[lib.clone()], ProjectType::All, true).unwrap();
        assert_eq!(
            summary(&projects, &lib),
            vec![
                (String::new(), ProjectType::Library, ProjectType::Library),
                (
                    "examples/Advanced/Nested".into(),
                    ProjectType::Sketch,
                    ProjectType::Library
                ),
                ("examples/Basic".into(), ProjectType::Sketch, ProjectType::Library),
                ("example/Other".into(), ProjectType::Sketch, ProjectType::Library),
            ]
        );
    }

    #[test]
    fn platform_bundled_libraries_and_their_examples() {
        let tmp = TempDir::new().unwrap();
        let platform = tmp.path().join("avr");
        touch(&platform.join("boards.txt"));
        touch(&platform.join("libraries/Wire/library.properties"));
        touch(&platform.join("libraries/Wire/examples/Scan/Scan.ino"));
        touch(&platform.join("libraries/Group/Deep/Deep.h"));

        let projects =
            discover(&OsFilesystem, &[platform.clone()], ProjectType::All, true).unwrap();
        assert_eq!(
            summary(&projects, &platform),
            vec![
                (String::new(), ProjectType::Platform, ProjectType::Platform),
                ("libraries/Wire".into(), ProjectType::Library, ProjectType::Platform),
                (
                    "libraries/Wire/examples/Scan".into(),
                    ProjectType::Sketch,
                    ProjectType::Platform
                ),
            ]
        );
    }

    #[test]
    fn recursive_walk_stops_at_projects_in_sorted_order() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("b/SketchB/SketchB.ino"));
        touch(&tmp.path().join("a/LibA/LibA.h"));
        touch(&tmp.path().join("a/LibA/inner/Inner.ino"));

        let projects =
            discover(&OsFilesystem, &[tmp.path().to_path_buf()], ProjectType::All, true).unwrap();
        assert_eq!(
            summary(&projects, tmp.path()),
            vec![
                ("a/LibA".into(), ProjectType::Library, ProjectType::Library),
                ("b/SketchB".into(), ProjectType::Sketch, ProjectType::Sketch),
            ]
        );
    }

    #[test]
    fn explicit_type_without_recursion_takes_target_as_given() {
        let tmp = TempDir::new().unwrap();
        let projects = discover(
            &OsFilesystem,
            &[tmp.path().to_path_buf()],
            ProjectType::Sketch,
            false,
        )
        .unwrap();
        assert_eq!(projects, vec![Project::root(tmp.path(), ProjectType::Sketch)]);
    }

    #[test]
    fn empty_target_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("empty")).unwrap();

        let err = discover(&OsFilesystem, &[tmp.path().to_path_buf()], ProjectType::All, true)
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::NoProjectsFound { .. }));
        assert!(err.to_string().starts_with("No projects found with project path"));
    }

    #[test]
    fn missing_target_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = discover(&OsFilesystem, &[tmp.path().join("nope")], ProjectType::All, true)
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::TargetNotFound { .. }));
    }

    #[test]
    fn discovery_is_repeatable() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("One/One.ino"));
        touch(&tmp.path().join("Two/library.properties"));
        let targets = [tmp.path().to_path_buf()];

        let first = discover(&OsFilesystem, &targets, ProjectType::All, true).unwrap();
        let second = discover(&OsFilesystem, &targets, ProjectType::All, true).unwrap();
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_is_fatal() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("SymlinkLoop");
        fs::create_dir_all(root.join("examples")).unwrap();
        symlink("..", root.join("examples/UpGoer1")).unwrap();
        symlink("..", root.join("examples/UpGoer2")).unwrap();

        let err = discover(&OsFilesystem, &[root], ProjectType::All, true).unwrap_err();
        assert!(matches!(err, DiscoveryError::SymlinkDepthExceeded { .. }));
    }
}
