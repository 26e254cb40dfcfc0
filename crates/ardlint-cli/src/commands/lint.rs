//! Lint command implementation.

use anyhow::{Context, Result};
use ardlint_core::data::IndexSource;
use ardlint_core::{discover, Capabilities, Config, Engine, ModeSettings, OsFilesystem, ProjectType};
use ardlint_rules::all_rules;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config_resolver::{self, ConfigSource};
use crate::{LintArgs, OutputFormat};

/// Settings of one run after merging flags, environment and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolved {
    paths: Vec<PathBuf>,
    project_type: ProjectType,
    recursive: bool,
    settings: ModeSettings,
    index_source: IndexSource,
}

impl Resolved {
    fn new(args: &LintArgs, config: &Config) -> Self {
        let lint = &config.lint;
        let paths = if args.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            args.paths.clone()
        };

        Self {
            paths,
            project_type: args
                .project_type
                .or(lint.project_type)
                .unwrap_or(ProjectType::All),
            recursive: args.recursive.or(lint.recursive).unwrap_or(true),
            settings: ModeSettings {
                compliance: args.compliance.or(lint.compliance).unwrap_or_default(),
                library_manager: args.library_manager.or(lint.library_manager),
                official: args.official.or(lint.official).unwrap_or(false),
                library_manager_indexing: args.library_manager_indexing,
            },
            index_source: args
                .library_manager_index
                .as_deref()
                .map_or_else(|| config.library_index.index_source(), IndexSource::parse),
        }
    }
}

/// Runs the lint command.
pub fn run(args: &LintArgs, format: OutputFormat, config_path: Option<&Path>) -> Result<ExitCode> {
    let first_target = args.paths.first().map_or(Path::new("."), PathBuf::as_path);
    let source = config_resolver::resolve(first_target, config_path);
    let config = load_config(&source)?;
    let resolved = Resolved::new(args, &config);

    let projects = discover(
        &OsFilesystem,
        &resolved.paths,
        resolved.project_type,
        resolved.recursive,
    )?;

    let engine = Engine::builder()
        .rules(all_rules())
        .capabilities(Capabilities::system(config.http.timeout()))
        .settings(resolved.settings.clone())
        .library_index_source(resolved.index_source.clone())
        .fail_on(config.lint.fail_on.unwrap_or_default())
        .build()
        .context("Failed to build rule engine")?;

    tracing::info!(
        "Linting {} project(s) with {} rules",
        projects.len(),
        engine.rule_count()
    );

    let mut report = engine.run(&projects);
    report.configuration.paths_checked = resolved.paths;
    report.configuration.project_type = Some(resolved.project_type);
    report.configuration.recursive = resolved.recursive;

    super::output::print(&report, format, args.verbose)?;

    if let Some(path) = &args.report_file {
        super::output::write_report_file(&report, path)?;
    }

    if report.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ardlint_core::{Compliance, LibraryManagerMode};

    #[test]
    fn defaults_without_flags_or_config() {
        let resolved = Resolved::new(&LintArgs::default(), &Config::default());

        assert_eq!(resolved.paths, vec![PathBuf::from(".")]);
        assert_eq!(resolved.project_type, ProjectType::All);
        assert!(resolved.recursive);
        assert_eq!(resolved.settings, ModeSettings::default());
        assert_eq!(resolved.index_source, IndexSource::default());
    }

    #[test]
    fn config_file_fills_unset_flags() {
        let config = Config::parse(
            "[lint]\ncompliance = \"strict\"\nrecursive = false\nofficial = true\n\
             [library_index]\nsource = \"/srv/index.json\"\n",
        )
        .unwrap();

        let resolved = Resolved::new(&LintArgs::default(), &config);

        assert_eq!(resolved.settings.compliance, Compliance::Strict);
        assert!(resolved.settings.official);
        assert!(!resolved.recursive);
        assert_eq!(
            resolved.index_source,
            IndexSource::File("/srv/index.json".into())
        );
    }

    #[test]
    fn flags_override_config_file() {
        let config = Config::parse(
            "[lint]\ncompliance = \"strict\"\nlibrary_manager = \"submit\"\nproject_type = \"sketch\"\n",
        )
        .unwrap();
        let args = LintArgs {
            paths: vec![PathBuf::from("Foo")],
            compliance: Some(Compliance::Permissive),
            library_manager: Some(LibraryManagerMode::Update),
            project_type: Some(ProjectType::Library),
            library_manager_index: Some("https://example.com/index.json".into()),
            ..LintArgs::default()
        };

        let resolved = Resolved::new(&args, &config);

        assert_eq!(resolved.paths, vec![PathBuf::from("Foo")]);
        assert_eq!(resolved.settings.compliance, Compliance::Permissive);
        assert_eq!(
            resolved.settings.library_manager,
            Some(LibraryManagerMode::Update)
        );
        assert_eq!(resolved.project_type, ProjectType::Library);
        assert_eq!(
            resolved.index_source,
            IndexSource::Url("https://example.com/index.json".into())
        );
    }

    #[test]
    fn unreadable_explicit_config_is_an_error() {
        let source = ConfigSource::Explicit(PathBuf::from("/nonexistent/ardlint.toml"));
        let err = load_config(&source).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
