//! Rule trait and the static descriptor used by the built-in catalogue.

use crate::context::RuleContext;
use crate::mode::{ModeConfig, ReferenceLevel};
use crate::project::ProjectType;
use crate::types::Outcome;

/// What a rule decided, with the user-facing specifics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutput {
    /// The decision.
    pub outcome: Outcome,
    /// Specifics of the decision; filled into the message template on failure.
    pub detail: String,
}

impl RuleOutput {
    /// Condition satisfied.
    #[must_use]
    pub fn pass() -> Self {
        Self {
            outcome: Outcome::Pass,
            detail: String::new(),
        }
    }

    /// Violation detected.
    #[must_use]
    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail,
            detail: detail.into(),
        }
    }

    /// Rule not applicable to this project.
    #[must_use]
    pub fn skip(detail: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Skip,
            detail: detail.into(),
        }
    }

    /// A precondition could not be met.
    #[must_use]
    pub fn not_run(detail: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::NotRun,
            detail: detail.into(),
        }
    }
}

/// A lint rule checking one aspect of a project.
///
/// Rules read the project's prefetched data through [`RuleContext`]; they do
/// not mutate it and never call other rules.
pub trait Rule: Send + Sync {
    /// Stable identifier, e.g. `LP005`. The first letter names the project type.
    fn id(&self) -> &'static str;

    /// The project type the rule applies to.
    fn project_type(&self) -> ProjectType;

    /// Report category, e.g. `library.properties`.
    fn category(&self) -> &'static str;

    /// Report subcategory, e.g. `name field`.
    fn subcategory(&self) -> &'static str;

    /// Short description of the problem.
    fn brief(&self) -> &'static str;

    /// Longer description of what is checked.
    fn description(&self) -> &'static str;

    /// Failure message; `{}` is replaced by the rule detail.
    fn message_template(&self) -> &'static str;

    /// The mode-to-severity table.
    fn mode_config(&self) -> ModeConfig;

    /// Whether the rule is skipped for subprojects.
    fn disable_subproject(&self) -> bool {
        false
    }

    /// The compliance level from which failures are errors.
    fn reference_level(&self) -> ReferenceLevel {
        self.mode_config().reference_level()
    }

    /// Checks the project.
    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutput;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Function computing a rule's output.
pub type CheckFn = fn(&RuleContext<'_>) -> RuleOutput;

/// A rule written as a constant record plus a check function.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    /// See [`Rule::id`].
    pub id: &'static str,
    /// See [`Rule::project_type`].
    pub project_type: ProjectType,
    /// See [`Rule::category`].
    pub category: &'static str,
    /// See [`Rule::subcategory`].
    pub subcategory: &'static str,
    /// See [`Rule::brief`].
    pub brief: &'static str,
    /// See [`Rule::description`].
    pub description: &'static str,
    /// See [`Rule::message_template`].
    pub message_template: &'static str,
    /// See [`Rule::mode_config`].
    pub mode_config: ModeConfig,
    /// See [`Rule::disable_subproject`].
    pub disable_subproject: bool,
    /// See [`Rule::check`].
    pub check: CheckFn,
}

impl Rule for Descriptor {
    fn id(&self) -> &'static str {
        self.id
    }

    fn project_type(&self) -> ProjectType {
        self.project_type
    }

    fn category(&self) -> &'static str {
        self.category
    }

    fn subcategory(&self) -> &'static str {
        self.subcategory
    }

    fn brief(&self) -> &'static str {
        self.brief
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn message_template(&self) -> &'static str {
        self.message_template
    }

    fn mode_config(&self) -> ModeConfig {
        self.mode_config
    }

    fn disable_subproject(&self) -> bool {
        self.disable_subproject
    }

    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutput {
        (self.check)(ctx)
    }
}

/// Fills a message template with a rule detail.
#[must_use]
pub fn render_message(template: &str, detail: &str) -> String {
    template.replacen("{}", detail, 1)
}
