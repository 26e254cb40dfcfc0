//! Rule modes and the mode-to-severity tables of rule descriptors.

use crate::project::ProjectType;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A rule mode.
///
/// `Default` never appears in an active [`ModeSet`]; descriptors use it as
/// the fallback entry of their [`ModeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// Fallback entry of a mode table.
    Default,
    /// Only fail on severe issues.
    Permissive,
    /// Enforce the project specification.
    Specification,
    /// Enforce best practices beyond the specification.
    Strict,
    /// Library is being submitted to the Library Manager index.
    LibraryManagerSubmission,
    /// Library is already in the Library Manager index.
    LibraryManagerIndexed,
    /// Library Manager indexer is checking a release.
    LibraryManagerIndexing,
    /// Project is an official Arduino project.
    Official,
}

impl Mode {
    /// Every mode a run can activate, in a fixed order.
    pub const ACTIVE: [Self; 7] = [
        Self::Permissive,
        Self::Specification,
        Self::Strict,
        Self::LibraryManagerSubmission,
        Self::LibraryManagerIndexed,
        Self::LibraryManagerIndexing,
        Self::Official,
    ];

    /// Returns the kebab-case name of this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Permissive => "permissive",
            Self::Specification => "specification",
            Self::Strict => "strict",
            Self::LibraryManagerSubmission => "library-manager-submission",
            Self::LibraryManagerIndexed => "library-manager-indexed",
            Self::LibraryManagerIndexing => "library-manager-indexing",
            Self::Official => "official",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of modes active for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSet(BTreeSet<Mode>);

impl ModeSet {
    /// Creates a set from the given modes. `Mode::Default` is dropped.
    #[must_use]
    pub fn new(modes: impl IntoIterator<Item = Mode>) -> Self {
        Self(modes.into_iter().filter(|m| *m != Mode::Default).collect())
    }

    /// Returns true if `mode` is active.
    #[must_use]
    pub fn contains(&self, mode: Mode) -> bool {
        self.0.contains(&mode)
    }

    /// Iterates the active modes in order.
    pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
        self.0.iter().copied()
    }

    /// Returns the active compliance mode.
    #[must_use]
    pub fn compliance(&self) -> Compliance {
        if self.contains(Mode::Strict) {
            Compliance::Strict
        } else if self.contains(Mode::Permissive) {
            Compliance::Permissive
        } else {
            Compliance::Specification
        }
    }

    /// Returns the active Library Manager mode.
    #[must_use]
    pub fn library_manager(&self) -> LibraryManagerMode {
        if self.contains(Mode::LibraryManagerSubmission) {
            LibraryManagerMode::Submit
        } else if self.contains(Mode::LibraryManagerIndexed) {
            LibraryManagerMode::Update
        } else {
            LibraryManagerMode::False
        }
    }
}

/// Error returned when a setting string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeParseError {
    /// Unknown compliance level.
    #[error("No matching compliance mode for string {0}")]
    Compliance(String),
    /// Unknown Library Manager mode.
    #[error("No matching Library Manager mode for string {0}")]
    LibraryManager(String),
}

/// Compliance level selected with `--compliance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compliance {
    /// Only fail on severe issues.
    Permissive,
    /// Enforce the specification.
    #[default]
    Specification,
    /// Enforce best practices.
    Strict,
}

impl Compliance {
    /// Returns the lower-case name of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Specification => "specification",
            Self::Strict => "strict",
        }
    }

    fn mode(self) -> Mode {
        match self {
            Self::Permissive => Mode::Permissive,
            Self::Specification => Mode::Specification,
            Self::Strict => Mode::Strict,
        }
    }
}

impl fmt::Display for Compliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compliance {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "specification" => Ok(Self::Specification),
            "strict" => Ok(Self::Strict),
            _ => Err(ModeParseError::Compliance(s.to_string())),
        }
    }
}

/// Library Manager context selected with `--library-manager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryManagerMode {
    /// New submission to the index.
    Submit,
    /// Update of a library already in the index.
    Update,
    /// Not related to the Library Manager.
    False,
}

impl LibraryManagerMode {
    /// Returns the lower-case name of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Update => "update",
            Self::False => "false",
        }
    }
}

impl fmt::Display for LibraryManagerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LibraryManagerMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "submit" => Ok(Self::Submit),
            "update" => Ok(Self::Update),
            "false" => Ok(Self::False),
            _ => Err(ModeParseError::LibraryManager(s.to_string())),
        }
    }
}

/// User-selected mode settings of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSettings {
    /// Compliance level.
    pub compliance: Compliance,
    /// Library Manager context; `None` keeps the per-type default.
    pub library_manager: Option<LibraryManagerMode>,
    /// Official Arduino project.
    pub official: bool,
    /// Running inside the Library Manager indexer.
    pub library_manager_indexing: bool,
}

impl ModeSettings {
    /// Resolves the active modes for projects under a superproject of the given type.
    ///
    /// Libraries default to the submission context; every other type defaults
    /// to none.
    #[must_use]
    pub fn modes_for(&self, superproject_type: ProjectType) -> ModeSet {
        let mut modes = vec![self.compliance.mode()];

        let library_manager = self.library_manager.unwrap_or(match superproject_type {
            ProjectType::Library => LibraryManagerMode::Submit,
            _ => LibraryManagerMode::False,
        });
        match library_manager {
            LibraryManagerMode::Submit => modes.push(Mode::LibraryManagerSubmission),
            LibraryManagerMode::Update => modes.push(Mode::LibraryManagerIndexed),
            LibraryManagerMode::False => {}
        }

        if self.library_manager_indexing {
            modes.push(Mode::LibraryManagerIndexing);
        }
        if self.official {
            modes.push(Mode::Official);
        }

        ModeSet::new(modes)
    }
}

/// A mode table that does not resolve for some mode set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeConfigError {
    /// Neither an active mode nor `Default` appears in `enable` or `disable`.
    #[error("no enable/disable entry applies")]
    Enablement,
    /// Neither an active mode nor `Default` appears in a severity list.
    #[error("no severity entry applies")]
    Severity,
}

/// The mode-to-severity table of a rule descriptor.
///
/// Enablement: an active mode in `disable` disables the rule; otherwise an
/// active mode in `enable` enables it; otherwise `Default` decides. Severity
/// is the first of `error`, `warning`, `info` holding an active mode, falling
/// back to the first holding `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    /// Modes in which the rule is disabled.
    pub disable: &'static [Mode],
    /// Modes in which the rule is enabled.
    pub enable: &'static [Mode],
    /// Modes in which a failure is informational.
    pub info: &'static [Mode],
    /// Modes in which a failure is a warning.
    pub warning: &'static [Mode],
    /// Modes in which a failure is an error.
    pub error: &'static [Mode],
}

impl ModeConfig {
    /// Always enabled; failures are errors.
    pub const ERROR: Self = Self {
        disable: &[],
        enable: &[Mode::Default],
        info: &[],
        warning: &[],
        error: &[Mode::Default],
    };

    /// Always enabled; failures are warnings.
    pub const WARNING: Self = Self {
        disable: &[],
        enable: &[Mode::Default],
        info: &[],
        warning: &[Mode::Default],
        error: &[],
    };

    /// Always enabled; warnings, promoted to errors under strict compliance.
    pub const WARNING_STRICT_ERROR: Self = Self {
        disable: &[],
        enable: &[Mode::Default],
        info: &[],
        warning: &[Mode::Default],
        error: &[Mode::Strict],
    };

    /// Always enabled; informational, promoted to warnings under strict compliance.
    pub const INFO_STRICT_WARNING: Self = Self {
        disable: &[],
        enable: &[Mode::Default],
        info: &[Mode::Default],
        warning: &[Mode::Strict],
        error: &[],
    };

    /// Only enabled in a Library Manager context; failures are errors.
    pub const LIBRARY_MANAGER: Self = Self {
        disable: &[Mode::Default],
        enable: &[
            Mode::LibraryManagerSubmission,
            Mode::LibraryManagerIndexed,
            Mode::LibraryManagerIndexing,
        ],
        info: &[],
        warning: &[],
        error: &[Mode::Default],
    };

    /// Returns whether the rule is enabled for `modes`.
    ///
    /// # Errors
    ///
    /// Returns an error if no entry applies.
    pub fn is_enabled(&self, modes: &ModeSet) -> Result<bool, ModeConfigError> {
        let active = |list: &[Mode]| list.iter().any(|m| *m != Mode::Default && modes.contains(*m));

        if active(self.disable) {
            return Ok(false);
        }
        if active(self.enable) {
            return Ok(true);
        }
        if self.disable.contains(&Mode::Default) {
            return Ok(false);
        }
        if self.enable.contains(&Mode::Default) {
            return Ok(true);
        }
        Err(ModeConfigError::Enablement)
    }

    /// Returns the severity of a failure for `modes`.
    ///
    /// # Errors
    ///
    /// Returns an error if no entry applies.
    pub fn severity(&self, modes: &ModeSet) -> Result<Severity, ModeConfigError> {
        let tiers = [
            (self.error, Severity::Error),
            (self.warning, Severity::Warning),
            (self.info, Severity::Info),
        ];

        for (list, severity) in tiers {
            if list.iter().any(|m| *m != Mode::Default && modes.contains(*m)) {
                return Ok(severity);
            }
        }
        for (list, severity) in tiers {
            if list.contains(&Mode::Default) {
                return Ok(severity);
            }
        }
        Err(ModeConfigError::Severity)
    }

    /// Returns the effective severity for `modes`, or `None` when disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not resolve.
    pub fn resolve(&self, modes: &ModeSet) -> Result<Option<Severity>, ModeConfigError> {
        if self.is_enabled(modes)? {
            self.severity(modes).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Returns the compliance level from which a failure is an error.
    #[must_use]
    pub fn reference_level(&self) -> ReferenceLevel {
        let errors_under = |mode: Mode| {
            matches!(
                self.resolve(&ModeSet::new([mode])),
                Ok(Some(Severity::Error))
            )
        };

        if errors_under(Mode::Permissive) {
            ReferenceLevel::Permissive
        } else if errors_under(Mode::Specification) {
            ReferenceLevel::Specification
        } else {
            ReferenceLevel::Strict
        }
    }

    /// Returns the first mode listed in more than one list of the same kind.
    #[must_use]
    pub fn repeated_mode(&self) -> Option<Mode> {
        let repeated = |lists: &[&[Mode]]| {
            let mut seen = BTreeSet::new();
            lists
                .iter()
                .flat_map(|list| list.iter().copied())
                .find(|m| !seen.insert(*m))
        };

        repeated(&[self.disable, self.enable])
            .or_else(|| repeated(&[self.info, self.warning, self.error]))
    }
}

/// The compliance level from which a rule's failures are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceLevel {
    /// Error even under permissive compliance.
    Permissive,
    /// Error under specification compliance.
    Specification,
    /// Error only under strict compliance, if at all.
    Strict,
}

impl fmt::Display for ReferenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Permissive => "permissive",
            Self::Specification => "specification",
            Self::Strict => "strict",
        })
    }
}
