//! Lint results: per-rule records grouped by project, and their summaries.

use crate::mode::{Compliance, LibraryManagerMode};
use crate::project::{Project, ProjectType};
use crate::types::{Level, Outcome, Severity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lowest failure severity that fails the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    /// Only error failures fail the run.
    #[default]
    Error,
    /// Warning failures fail the run too.
    Warning,
}

impl FailOn {
    /// Returns true if a failure at `severity` fails the run.
    #[must_use]
    pub fn fails(self, severity: Severity) -> bool {
        match self {
            Self::Error => severity == Severity::Error,
            Self::Warning => severity >= Severity::Warning,
        }
    }
}

impl std::str::FromStr for FailOn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            _ => Err(format!("No matching fail-on level for string {s}")),
        }
    }
}

/// Settings a run was made with, echoed in the JSON report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfiguration {
    /// Target paths.
    pub paths_checked: Vec<PathBuf>,
    /// Project type filter.
    pub project_type: Option<ProjectType>,
    /// Whether discovery was recursive.
    pub recursive: bool,
    /// Compliance level.
    pub compliance_mode: Compliance,
    /// Explicit Library Manager mode, if any.
    pub library_manager_mode: Option<LibraryManagerMode>,
    /// Official mode.
    pub official_mode: bool,
}

/// The result of one rule on one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    /// Rule ID.
    pub id: &'static str,
    /// Rule category.
    pub category: &'static str,
    /// Rule subcategory.
    pub subcategory: &'static str,
    /// Rule brief.
    pub brief: &'static str,
    /// Rule description.
    pub description: &'static str,
    /// What the rule decided.
    pub outcome: Outcome,
    /// Effective severity of a failure.
    pub severity: Severity,
    /// Rule detail.
    pub detail: String,
    /// User-facing message.
    pub message: String,
}

impl RuleRecord {
    /// Report level of the record.
    #[must_use]
    pub fn level(&self) -> Level {
        Level::of(self.outcome, self.severity)
    }

    /// True if the record is a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Fail
    }
}

/// Counts over the records of one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// True if no failure reaches the fail-on level.
    pub pass: bool,
    /// Number of records.
    pub count: usize,
    /// Number of failures.
    pub fail_count: usize,
    /// Number of passes.
    pub pass_count: usize,
    /// Number of warning-level failures.
    pub warning_count: usize,
    /// Number of error-level failures.
    pub error_count: usize,
    /// Number of rules that could not run.
    pub not_run_count: usize,
    /// Number of skipped rules.
    pub skip_count: usize,
}

/// The records of one project, in catalogue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReport {
    /// The project.
    pub project: Project,
    /// One record per executed rule.
    pub records: Vec<RuleRecord>,
}

impl ProjectReport {
    /// Summarizes the records.
    #[must_use]
    pub fn summary(&self, fail_on: FailOn) -> ProjectSummary {
        let mut summary = ProjectSummary {
            pass: true,
            count: self.records.len(),
            ..ProjectSummary::default()
        };

        for record in &self.records {
            match record.outcome {
                Outcome::Pass => summary.pass_count += 1,
                Outcome::Skip => summary.skip_count += 1,
                Outcome::NotRun => summary.not_run_count += 1,
                Outcome::Fail => {
                    summary.fail_count += 1;
                    match record.severity {
                        Severity::Error => summary.error_count += 1,
                        Severity::Warning => summary.warning_count += 1,
                        Severity::Info => {}
                    }
                    if fail_on.fails(record.severity) {
                        summary.pass = false;
                    }
                }
            }
        }

        summary
    }

    /// The record of rule `id`, if it ran.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<&RuleRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// Counts over every project of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// True if every project passed.
    pub pass: bool,
    /// Number of passed rules.
    pub pass_count: usize,
    /// Number of warning-level failures.
    pub warning_count: usize,
    /// Number of error-level failures.
    pub error_count: usize,
}

/// The result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Settings of the run.
    pub configuration: RunConfiguration,
    /// One section per project, in discovery order.
    pub projects: Vec<ProjectReport>,
    /// Lowest failing severity.
    pub fail_on: FailOn,
}

impl Report {
    /// Summarizes every project.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        self.projects.iter().map(|p| p.summary(self.fail_on)).fold(
            RunSummary {
                pass: true,
                ..RunSummary::default()
            },
            |mut run, project| {
                run.pass &= project.pass;
                run.pass_count += project.pass_count;
                run.warning_count += project.warning_count;
                run.error_count += project.error_count;
                run
            },
        )
    }

    /// Number of rule executions.
    #[must_use]
    pub fn rules_executed(&self) -> usize {
        self.projects.iter().map(|p| p.records.len()).sum()
    }

    /// True if the run passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.summary().pass
    }

    /// Process exit code: 0 if passed, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.passed())
    }

    /// Renders the machine-readable report.
    ///
    /// Unless `verbose`, only failed records are listed; summaries always
    /// count every record.
    #[must_use]
    pub fn to_json(&self, verbose: bool) -> serde_json::Value {
        let projects: Vec<_> = self
            .projects
            .iter()
            .map(|p| JsonProject {
                path: p.project.path().to_path_buf(),
                project_type: p.project.project_type(),
                configuration: JsonProjectConfiguration {
                    superproject_type: p.project.superproject_type(),
                },
                summary: p.summary(self.fail_on),
                reports: p
                    .records
                    .iter()
                    .filter(|r| verbose || r.is_failure())
                    .map(JsonRecord::from)
                    .collect(),
            })
            .collect();

        let report = JsonReport {
            configuration: &self.configuration,
            projects,
            summary: self.summary(),
        };
        serde_json::to_value(report).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    configuration: &'a RunConfiguration,
    projects: Vec<JsonProject<'a>>,
    summary: RunSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonProject<'a> {
    path: PathBuf,
    project_type: ProjectType,
    configuration: JsonProjectConfiguration,
    summary: ProjectSummary,
    reports: Vec<JsonRecord<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonProjectConfiguration {
    superproject_type: ProjectType,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    category: &'a str,
    subcategory: &'a str,
    #[serde(rename = "ID")]
    id: &'a str,
    brief: &'a str,
    description: &'a str,
    detail: &'a str,
    result: Outcome,
    level: Level,
    message: &'a str,
}

impl<'a> From<&'a RuleRecord> for JsonRecord<'a> {
    fn from(record: &'a RuleRecord) -> Self {
        Self {
            category: record.category,
            subcategory: record.subcategory,
            id: record.id,
            brief: record.brief,
            description: record.description,
            detail: &record.detail,
            result: record.outcome,
            level: record.level(),
            message: &record.message,
        }
    }
}
