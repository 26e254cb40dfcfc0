//! Configuration file resolution.
//!
//! The first of these wins:
//!
//! 1. `--config <path>`
//! 2. `ardlint.toml` or `.ardlint.toml` in the target's project folder
//! 3. the same names in the enclosing library, when the target is one of its example sketches
//! 4. `config.toml` in the global config directory
//! 5. built-in defaults

use ardlint_core::{EXAMPLES_FOLDER_NAMES, LIBRARY_METADATA_FILE};
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Next to the linted project.
    Project(PathBuf),
    /// In the library whose example is being linted.
    Library(PathBuf),
    /// In the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Library(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["ardlint.toml", ".ardlint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file for a lint of `target`.
///
/// File targets (a sketch or a package index) are looked up from their folder.
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    let project_dir = if target.is_dir() {
        target
    } else {
        target.parent().unwrap_or(target)
    };
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = config_in(project_dir) {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    if let Some(found) = enclosing_library(project_dir).and_then(|lib| config_in(&lib)) {
        tracing::debug!("Found library config: {}", found.display());
        return ConfigSource::Library(found);
    }

    if let Some(candidate) = global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        if candidate.is_file() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

fn config_in(dir: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// The library holding `sketch_dir` under one of its examples folders.
///
/// Example sketches may sit in nested category folders.
fn enclosing_library(sketch_dir: &Path) -> Option<PathBuf> {
    sketch_dir.ancestors().skip(1).find_map(|dir| {
        let examples = dir.file_name()?.to_str()?;
        if !EXAMPLES_FOLDER_NAMES.contains(&examples) {
            return None;
        }
        let library = dir.parent()?;
        library
            .join(LIBRARY_METADATA_FILE)
            .is_file()
            .then(|| library.to_path_buf())
    })
}

/// Returns the global config directory: `$ARDUINO_LINT_CONFIG_DIR`, else `~/.ardlint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    match std::env::var("ARDUINO_LINT_CONFIG_DIR") {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home::home_dir().map(|h| h.join(".ardlint")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn project_config_beats_global() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        touch(&global.path().join("config.toml"));
        assert!(resolve_inner(project.path(), None, Some(global.path().to_path_buf())).is_global());

        touch(&project.path().join(".ardlint.toml"));
        touch(&project.path().join("ardlint.toml"));
        assert_eq!(
            resolve_inner(project.path(), None, Some(global.path().to_path_buf())),
            ConfigSource::Project(project.path().join("ardlint.toml"))
        );
    }

    #[test]
    fn example_sketch_uses_library_config() {
        let tmp = TempDir::new().unwrap();
        let library = tmp.path().join("Servo");
        touch(&library.join("library.properties"));
        touch(&library.join(".ardlint.toml"));
        let sketch = library.join("examples/Basics/Sweep");
        touch(&sketch.join("Sweep.ino"));

        assert_eq!(
            resolve(&sketch.join("Sweep.ino"), None),
            ConfigSource::Library(library.join(".ardlint.toml"))
        );

        touch(&sketch.join("ardlint.toml"));
        assert_eq!(
            resolve_inner(&sketch, None, None),
            ConfigSource::Project(sketch.join("ardlint.toml"))
        );
    }

    #[test]
    fn examples_folder_outside_a_library_is_ignored() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("ardlint.toml"));
        let sketch = tmp.path().join("examples/Blink");
        touch(&sketch.join("Blink.ino"));

        assert_eq!(enclosing_library(&sketch), None);
        assert_eq!(resolve_inner(&sketch, None, None), ConfigSource::Default);
    }
}
