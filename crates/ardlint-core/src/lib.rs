//! # ardlint-core
//!
//! Core pipeline for linting Arduino projects: sketches, libraries, boards
//! platforms and Boards Manager package indexes.
//!
//! This crate provides:
//!
//! - [`discover`] to turn target paths into an ordered list of [`Project`]s
//! - [`ProjectData`] holding everything rules read about one project
//! - [`Rule`] trait and [`Descriptor`] for defining rules
//! - [`Engine`] for running rules and building a [`Report`]
//! - [`Capabilities`] abstracting the filesystem, git, HTTP and spell checking
//!
//! ## Example
//!
//! ```ignore
//! use ardlint_core::{discover, Engine, OsFilesystem, ProjectType};
//!
//! let projects = discover(&OsFilesystem, &targets, ProjectType::All, true)?;
//! let engine = Engine::builder().rules(my_rules()).build()?;
//! let report = engine.run(&projects);
//! std::process::exit(report.exit_code());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod config;
mod context;
mod discovery;
mod engine;
mod mode;
mod project;
mod properties;
mod report;
mod rule;
mod types;

/// Interfaces to the filesystem, git, HTTP, spell checking and time.
pub mod capabilities;
/// Prefetched per-project data.
pub mod data;
/// Relaxed semantic version helpers.
pub mod version;

pub use capabilities::{Capabilities, OsFilesystem};
pub use classify::{
    classify_dir, classify_file, has_header_extension, has_main_sketch_extension,
    has_package_index_extension, has_sketch_source_extension, has_valid_package_index_filename,
    is_library_metadata_file, is_platform_configuration_file, EXAMPLES_FOLDER_NAMES,
    HEADER_EXTENSIONS, LIBRARY_METADATA_FILE, MAIN_SKETCH_EXTENSIONS,
};
pub use config::{Config, ConfigError, HttpConfig, LibraryIndexConfig, LintConfig};
pub use context::RuleContext;
pub use data::ProjectData;
pub use discovery::{discover, DiscoveryError, MAX_SYMLINK_DEPTH};
pub use engine::{Engine, EngineBuilder, EngineError};
pub use mode::{
    Compliance, LibraryManagerMode, Mode, ModeConfig, ModeConfigError, ModeParseError, ModeSet,
    ModeSettings, ReferenceLevel,
};
pub use project::{ParseProjectTypeError, Project, ProjectType};
pub use properties::{Properties, PropertiesError};
pub use report::{
    FailOn, ProjectReport, ProjectSummary, Report, RuleRecord, RunConfiguration, RunSummary,
};
pub use rule::{render_message, CheckFn, Descriptor, Rule, RuleBox, RuleOutput};
pub use types::{Level, Outcome, Severity};
