//! ardlint CLI tool.
//!
//! Usage:
//! ```bash
//! ardlint [OPTIONS] [PATH]...
//! ardlint rules
//! ```

use anyhow::Result;
use ardlint_core::{Compliance, DiscoveryError, LibraryManagerMode, ProjectType};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Exit code for fatal errors: bad arguments, unreadable targets, discovery failures.
const EXIT_FATAL: u8 = 2;

/// Linter for Arduino sketches, libraries, boards platforms and package indexes
#[derive(Parser)]
#[command(name = "ardlint")]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Print the version and exit
    #[arg(long)]
    version: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, env = "ARDUINO_LINT_FORMAT", default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    lint: LintArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the rule catalogue
    Rules,
}

/// Options of a lint run.
///
/// Every option left unset falls back to the configuration file, then the
/// built-in default.
#[derive(clap::Args, Debug, Default)]
pub struct LintArgs {
    /// Paths to lint (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Only lint projects of this type: sketch, library, platform, package-index or all
    #[arg(long, env = "ARDUINO_LINT_PROJECT_TYPE")]
    pub project_type: Option<ProjectType>,

    /// Search the paths recursively for projects
    #[arg(long, env = "ARDUINO_LINT_RECURSIVE", action = ArgAction::Set)]
    pub recursive: Option<bool>,

    /// Compliance level: permissive, specification or strict
    #[arg(long, env = "ARDUINO_LINT_COMPLIANCE")]
    pub compliance: Option<Compliance>,

    /// Library Manager context: submit, update or false
    #[arg(long, env = "ARDUINO_LINT_LIBRARY_MANAGER")]
    pub library_manager: Option<LibraryManagerMode>,

    /// Lint as an official Arduino project
    #[arg(long, env = "ARDUINO_LINT_OFFICIAL", action = ArgAction::Set)]
    pub official: Option<bool>,

    /// Report every rule result, not only failures
    #[arg(short, long, env = "ARDUINO_LINT_VERBOSE")]
    pub verbose: bool,

    /// Write the full JSON report to this file
    #[arg(long, env = "ARDUINO_LINT_REPORT_FILE")]
    pub report_file: Option<PathBuf>,

    /// URL or local path of the Library Manager index
    #[arg(long, env = "ARDUINO_LINT_LIBRARY_MANAGER_INDEX")]
    pub library_manager_index: Option<String>,

    /// Lint as the Library Manager indexer does
    #[arg(long, hide = true, env = "ARDUINO_LINT_LIBRARY_MANAGER_INDEXING")]
    pub library_manager_indexing: bool,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

fn init_tracing(verbose: bool) {
    let filter = match std::env::var("ARDUINO_LINT_LOG_LEVEL") {
        Ok(level) if !level.is_empty() => EnvFilter::new(level),
        _ if verbose => EnvFilter::new("debug"),
        _ => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.version {
        commands::output::print_version(cli.format)?;
        return Ok(ExitCode::SUCCESS);
    }

    match cli.command {
        Some(Commands::Rules) => {
            commands::list_rules::run(cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
        None => commands::lint::run(&cli.lint, cli.format, cli.config.as_deref()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.lint.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            match err.downcast::<DiscoveryError>() {
                Ok(discovery) => eprintln!("{:?}", miette::Report::new(discovery)),
                Err(err) => eprintln!("Error: {err:?}"),
            }
            ExitCode::from(EXIT_FATAL)
        }
    }
}
