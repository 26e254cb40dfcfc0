//! Core types for rule outcomes and severities.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Severity a rule failure is reported at.
///
/// A rule that is disabled in the active modes has no severity; the engine
/// represents that as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What a rule decided for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Condition satisfied.
    Pass,
    /// Violation detected.
    Fail,
    /// Rule not applicable to this project's shape.
    Skip,
    /// A precondition could not be met.
    NotRun,
}

impl Outcome {
    /// Returns the report string for this outcome.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skipped",
            Self::NotRun => "unable to run",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The level a rule record is reported at, combining outcome and severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// A failed rule at error severity.
    Error,
    /// A failed rule at warning severity.
    Warning,
    /// A failed rule at info severity, or a rule that could not run.
    Info,
    /// A passed or skipped rule.
    Notice,
}

impl Level {
    /// Derives the report level from an outcome and its effective severity.
    #[must_use]
    pub fn of(outcome: Outcome, severity: Severity) -> Self {
        match outcome {
            Outcome::Fail => match severity {
                Severity::Error => Self::Error,
                Severity::Warning => Self::Warning,
                Severity::Info => Self::Info,
            },
            Outcome::NotRun => Self::Info,
            Outcome::Pass | Outcome::Skip => Self::Notice,
        }
    }

    /// Returns the upper-case label used in text output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Notice => "NOTICE",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
