//! Shared output formatting for lint reports.

use anyhow::{Context, Result};
use ardlint_core::{FailOn, ProjectReport, Report};
use std::fmt::Write as _;
use std::path::Path;

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &Report, format: OutputFormat, verbose: bool) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(report, verbose)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report.to_json(verbose))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Renders the human-readable report.
pub fn render_text(report: &Report, verbose: bool) -> String {
    let mut out = String::new();

    for project in &report.projects {
        render_project(&mut out, project, report.fail_on, verbose);
    }

    if report.projects.len() > 1 {
        let summary = report.summary();
        let _ = writeln!(out, "Finished linting projects.");
        let _ = writeln!(out, "Warning count: {}", summary.warning_count);
        let _ = writeln!(out, "Error count: {}", summary.error_count);
        let _ = writeln!(out, "Rules passed: {}", summary.pass);
    }

    out
}

fn render_project(out: &mut String, project: &ProjectReport, fail_on: FailOn, verbose: bool) {
    let _ = writeln!(
        out,
        "Linting {} in {}",
        project.project.project_type(),
        project.project.path().display()
    );

    for record in &project.records {
        if verbose {
            let _ = writeln!(out, "Rule {} result: {}", record.id, record.outcome);
            if !record.message.is_empty() {
                let _ = writeln!(out, "{}: {}", record.level(), record.message);
            }
        } else if record.is_failure() {
            let _ = writeln!(
                out,
                "{}: {} (Rule {})",
                record.level(),
                record.message,
                record.id
            );
        }
    }

    let summary = project.summary(fail_on);
    let _ = writeln!(out);
    let _ = writeln!(out, "Finished linting project. Results:");
    let _ = writeln!(out, "Warning count: {}", summary.warning_count);
    let _ = writeln!(out, "Error count: {}", summary.error_count);
    let _ = writeln!(out, "Rules passed: {}", summary.pass);
    let _ = writeln!(out);
}

/// Writes the full JSON report to `path`, creating parent directories.
pub fn write_report_file(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(&report.to_json(true))?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write report file: {}", path.display()))?;

    tracing::info!("Report written to {}", path.display());
    Ok(())
}

/// Print the tool version.
pub fn print_version(format: OutputFormat) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    match format {
        OutputFormat::Text => println!("ardlint {version}"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&serde_json::json!({ "version": version }))?;
            println!("{json}");
        }
    }
    Ok(())
}
