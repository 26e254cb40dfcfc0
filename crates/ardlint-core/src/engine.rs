//! The engine: runs the rule catalogue over discovered projects.

use crate::capabilities::Capabilities;
use crate::context::RuleContext;
use crate::data::{IndexSource, ProjectData, SharedLibraryIndex};
use crate::mode::{Mode, ModeConfigError, ModeSet, ModeSettings};
use crate::project::Project;
use crate::report::{FailOn, ProjectReport, Report, RuleRecord, RunConfiguration};
use crate::rule::{render_message, Rule, RuleBox, RuleOutput};
use crate::types::Outcome;
use std::any::Any;
use std::cell::Cell;
use std::collections::HashSet;
use std::panic::{self, catch_unwind, AssertUnwindSafe};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, error, info};

/// Inconsistencies in a rule catalogue, found by [`EngineBuilder::build`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two rules share an ID.
    #[error("Duplicate rule ID: {id}")]
    DuplicateRuleId {
        /// The repeated ID.
        id: &'static str,
    },

    /// An ID does not start with the letter of the rule's project type.
    #[error("Rule ID {id} does not match project type {project_type}")]
    InvalidRuleId {
        /// The rule ID.
        id: &'static str,
        /// The rule's project type.
        project_type: crate::project::ProjectType,
    },

    /// A descriptive text is empty.
    #[error("Rule {id} has an empty {field}")]
    MissingText {
        /// The rule ID.
        id: &'static str,
        /// Name of the empty field.
        field: &'static str,
    },

    /// The mode table does not resolve for some mode.
    #[error("Rule {id} is misconfigured for mode {mode}: {source}")]
    RuleMisconfigured {
        /// The rule ID.
        id: &'static str,
        /// The mode that does not resolve.
        mode: Mode,
        /// What is missing.
        source: ModeConfigError,
    },

    /// A mode is listed twice in the mode table.
    #[error("Rule {id} lists mode {mode} more than once")]
    RepeatedMode {
        /// The rule ID.
        id: &'static str,
        /// The repeated mode.
        mode: Mode,
    },
}

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    rules: Vec<RuleBox>,
    capabilities: Option<Capabilities>,
    settings: ModeSettings,
    library_index: Option<SharedLibraryIndex>,
    fail_on: FailOn,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds rules, keeping their order.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Sets the capabilities (default: the real system).
    #[must_use]
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Sets the user mode settings.
    #[must_use]
    pub fn settings(mut self, settings: ModeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets where the Library Manager index is loaded from.
    #[must_use]
    pub fn library_index_source(mut self, source: IndexSource) -> Self {
        self.library_index = Some(SharedLibraryIndex::new(source));
        self
    }

    /// Sets an already-loaded Library Manager index.
    #[must_use]
    pub fn library_index(mut self, index: SharedLibraryIndex) -> Self {
        self.library_index = Some(index);
        self
    }

    /// Sets the lowest failing severity (default: error).
    #[must_use]
    pub fn fail_on(mut self, fail_on: FailOn) -> Self {
        self.fail_on = fail_on;
        self
    }

    /// Builds the engine after validating the rules.
    ///
    /// # Errors
    ///
    /// Returns an error if rule IDs repeat or mismatch their project type, a
    /// text is empty, or a mode table does not resolve for a single mode.
    pub fn build(self) -> Result<Engine, EngineError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            validate(rule.as_ref())?;
            if !seen.insert(rule.id()) {
                return Err(EngineError::DuplicateRuleId { id: rule.id() });
            }
        }

        Ok(Engine {
            rules: self.rules,
            capabilities: self.capabilities.unwrap_or_default(),
            settings: self.settings,
            library_index: self.library_index.unwrap_or_default(),
            fail_on: self.fail_on,
        })
    }
}

fn validate(rule: &dyn Rule) -> Result<(), EngineError> {
    let id = rule.id();
    let prefix = rule.project_type().id_prefix();
    if prefix.is_none() || id.chars().next() != prefix {
        return Err(EngineError::InvalidRuleId {
            id,
            project_type: rule.project_type(),
        });
    }

    let texts = [
        ("category", rule.category()),
        ("subcategory", rule.subcategory()),
        ("brief", rule.brief()),
        ("description", rule.description()),
        ("message template", rule.message_template()),
    ];
    if let Some((field, _)) = texts.iter().find(|(_, text)| text.is_empty()) {
        return Err(EngineError::MissingText { id, field });
    }

    let config = rule.mode_config();
    if let Some(mode) = config.repeated_mode() {
        return Err(EngineError::RepeatedMode { id, mode });
    }
    for mode in Mode::ACTIVE {
        config
            .resolve(&ModeSet::new([mode]))
            .map_err(|source| EngineError::RuleMisconfigured { id, mode, source })?;
    }
    Ok(())
}

/// Runs rules over projects, one project and one rule at a time.
///
/// Use [`Engine::builder()`] to construct an instance.
pub struct Engine {
    rules: Vec<RuleBox>,
    capabilities: Capabilities,
    settings: ModeSettings,
    library_index: SharedLibraryIndex,
    fail_on: FailOn,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the registered rules in order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Lints `projects` in order.
    #[must_use]
    pub fn run(&self, projects: &[Project]) -> Report {
        info!("Linting {} project(s) with {} rules", projects.len(), self.rules.len());

        let projects = projects.iter().map(|p| self.run_project(p)).collect();

        Report {
            configuration: RunConfiguration {
                compliance_mode: self.settings.compliance,
                library_manager_mode: self.settings.library_manager,
                official_mode: self.settings.official,
                ..RunConfiguration::default()
            },
            projects,
            fail_on: self.fail_on,
        }
    }

    /// Lints one project.
    #[must_use]
    pub fn run_project(&self, project: &Project) -> ProjectReport {
        let started = self.capabilities.clock.now();
        let modes = self.settings.modes_for(project.superproject_type());
        info!("Linting {} in {}", project.project_type(), project.path().display());

        let data = ProjectData::load(project, &self.capabilities);
        let ctx = RuleContext::new(project, &data, &modes, &self.capabilities, &self.library_index);

        let _quiet = QuietPanics::enter();
        let mut records = Vec::new();
        for rule in &self.rules {
            if !rule.project_type().matches(project.project_type()) {
                continue;
            }
            if rule.disable_subproject() && project.is_subproject() {
                debug!("Skipping rule {} for subproject", rule.id());
                continue;
            }
            let severity = match rule.mode_config().resolve(&modes) {
                Ok(Some(severity)) => severity,
                Ok(None) => {
                    debug!("Skipping disabled rule: {}", rule.id());
                    continue;
                }
                Err(e) => {
                    error!("Skipping misconfigured rule {}: {}", rule.id(), e);
                    continue;
                }
            };

            debug!("Running rule {}", rule.id());
            let output = catch_unwind(AssertUnwindSafe(|| rule.check(&ctx)))
                .unwrap_or_else(|payload| RuleOutput::not_run(panic_message(payload.as_ref())));
            debug!("Rule {} result: {}", rule.id(), output.outcome);

            let message = if output.outcome == Outcome::Fail {
                render_message(rule.message_template(), &output.detail)
            } else {
                output.detail.clone()
            };
            records.push(RuleRecord {
                id: rule.id(),
                category: rule.category(),
                subcategory: rule.subcategory(),
                brief: rule.brief(),
                description: rule.description(),
                outcome: output.outcome,
                severity,
                detail: output.detail,
                message,
            });
        }

        if let Ok(elapsed) = self.capabilities.clock.now().duration_since(started) {
            debug!("Finished {} in {:?}", project.path().display(), elapsed);
        }
        ProjectReport {
            project: project.clone(),
            records,
        }
    }
}

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Keeps rule panics off stderr on this thread while alive.
///
/// The hook installed on first use forwards to the previous hook whenever no
/// guard is alive on the panicking thread.
struct QuietPanics {
    was_quiet: bool,
}

impl QuietPanics {
    fn enter() -> Self {
        QUIET_HOOK.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if QUIET_PANICS.with(Cell::get) {
                    debug!("Rule panicked: {}", info);
                } else {
                    previous(info);
                }
            }));
        });
        Self {
            was_quiet: QUIET_PANICS.with(|quiet| quiet.replace(true)),
        }
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        QUIET_PANICS.with(|quiet| quiet.set(self.was_quiet));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Rule panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{FakeHttp, FixedClock};
    use crate::mode::{Compliance, LibraryManagerMode, ModeConfig};
    use crate::project::ProjectType;
    use crate::rule::Descriptor;
    use crate::types::Severity;
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn descriptor(id: &'static str, project_type: ProjectType) -> Descriptor {
        Descriptor {
            id,
            project_type,
            category: "structure",
            subcategory: "general",
            brief: "test rule",
            description: "A rule used in tests.",
            message_template: "Problem: {}",
            mode_config: ModeConfig::ERROR,
            disable_subproject: false,
            check: |_| RuleOutput::pass(),
        }
    }

    fn engine(rules: Vec<Descriptor>, settings: ModeSettings) -> Engine {
        let capabilities = Capabilities::default()
            .with_http(FakeHttp::new())
            .with_clock(FixedClock(SystemTime::UNIX_EPOCH));
        Engine::builder()
            .rules(rules.into_iter().map(|r| Box::new(r) as RuleBox))
            .capabilities(capabilities)
            .settings(settings)
            .build()
            .unwrap()
    }

    fn sketch(tmp: &TempDir) -> Project {
        let root = tmp.path().join("Foo");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("Foo.ino"), "").unwrap();
        Project::root(root, ProjectType::Sketch)
    }

    #[test]
    fn only_matching_project_type_runs() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(
            vec![
                descriptor("SS001", ProjectType::Sketch),
                descriptor("LS001", ProjectType::Library),
                descriptor("SS002", ProjectType::Sketch),
            ],
            ModeSettings::default(),
        );

        let report = engine.run(&[sketch(&tmp)]);
        let ids: Vec<_> = report.projects[0].records.iter().map(|r| r.id).collect();
        assert_eq!(ids, ["SS001", "SS002"]);
    }

    #[test]
    fn disabled_rules_are_absent() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(
            vec![Descriptor {
                mode_config: ModeConfig {
                    disable: &[Mode::Default],
                    enable: &[Mode::Strict],
                    info: &[],
                    warning: &[Mode::Default],
                    error: &[],
                },
                ..descriptor("SD002", ProjectType::Sketch)
            }],
            ModeSettings::default(),
        );
        assert!(engine.run(&[sketch(&tmp)]).projects[0].records.is_empty());

        let strict = ModeSettings {
            compliance: Compliance::Strict,
            ..ModeSettings::default()
        };
        let engine = Engine {
            settings: strict,
            ..engine
        };
        let report = engine.run(&[sketch(&tmp)]);
        assert_eq!(report.projects[0].records[0].severity, Severity::Warning);
    }

    #[test]
    fn subproject_rules_are_skipped_silently() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(
            vec![Descriptor {
                disable_subproject: true,
                ..descriptor("SD001", ProjectType::Sketch)
            }],
            ModeSettings::default(),
        );
        let example = Project::subproject(
            sketch(&tmp).path(),
            ProjectType::Sketch,
            ProjectType::Library,
        );

        assert!(engine.run(&[example]).projects[0].records.is_empty());
    }

    #[test]
    fn panics_become_not_run() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(
            vec![
                Descriptor {
                    check: |_| panic!("unexpected layout"),
                    ..descriptor("SS001", ProjectType::Sketch)
                },
                descriptor("SS002", ProjectType::Sketch),
            ],
            ModeSettings::default(),
        );

        let report = engine.run(&[sketch(&tmp)]);
        let records = &report.projects[0].records;
        assert_eq!(records[0].outcome, Outcome::NotRun);
        assert_eq!(records[0].detail, "unexpected layout");
        assert_eq!(records[1].outcome, Outcome::Pass);
        assert!(report.passed());
    }

    #[test]
    fn panics_are_quiet_only_inside_the_rule_loop() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(
            vec![
                Descriptor {
                    check: |_| panic!("unexpected layout"),
                    ..descriptor("SS001", ProjectType::Sketch)
                },
                Descriptor {
                    check: |_| {
                        if QUIET_PANICS.with(Cell::get) {
                            RuleOutput::pass()
                        } else {
                            RuleOutput::fail("panics reach stderr")
                        }
                    },
                    ..descriptor("SS002", ProjectType::Sketch)
                },
            ],
            ModeSettings::default(),
        );

        assert!(!QUIET_PANICS.with(Cell::get));
        let report = engine.run(&[sketch(&tmp)]);
        assert_eq!(report.projects[0].records[0].outcome, Outcome::NotRun);
        assert_eq!(report.projects[0].records[1].outcome, Outcome::Pass);
        assert!(!QUIET_PANICS.with(Cell::get));
    }

    #[test]
    fn failure_message_uses_template() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(
            vec![Descriptor {
                check: |ctx| RuleOutput::fail(ctx.data.folder_name()),
                ..descriptor("SS001", ProjectType::Sketch)
            }],
            ModeSettings::default(),
        );

        let report = engine.run(&[sketch(&tmp)]);
        assert_eq!(report.projects[0].records[0].message, "Problem: Foo");
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn modes_follow_superproject_type() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(
            vec![Descriptor {
                mode_config: ModeConfig::LIBRARY_MANAGER,
                ..descriptor("SS001", ProjectType::Sketch)
            }],
            ModeSettings::default(),
        );
        let root = sketch(&tmp);
        let example =
            Project::subproject(root.path(), ProjectType::Sketch, ProjectType::Library);

        let report = engine.run(&[root, example]);
        assert!(report.projects[0].records.is_empty());
        assert_eq!(report.projects[1].records.len(), 1);

        let off = ModeSettings {
            library_manager: Some(LibraryManagerMode::False),
            ..ModeSettings::default()
        };
        let engine = Engine {
            settings: off,
            ..engine
        };
        let example =
            Project::subproject(sketch(&tmp).path(), ProjectType::Sketch, ProjectType::Library);
        assert!(engine.run(&[example]).projects[0].records.is_empty());
    }

    #[test]
    fn build_rejects_inconsistent_catalogues() {
        let build = |rules: Vec<Descriptor>| {
            Engine::builder()
                .rules(rules.into_iter().map(|r| Box::new(r) as RuleBox))
                .build()
                .err()
        };

        assert!(matches!(
            build(vec![
                descriptor("SS001", ProjectType::Sketch),
                descriptor("SS001", ProjectType::Sketch),
            ]),
            Some(EngineError::DuplicateRuleId { id: "SS001" })
        ));
        assert!(matches!(
            build(vec![descriptor("LS001", ProjectType::Sketch)]),
            Some(EngineError::InvalidRuleId { .. })
        ));
        assert!(matches!(
            build(vec![Descriptor {
                brief: "",
                ..descriptor("SS001", ProjectType::Sketch)
            }]),
            Some(EngineError::MissingText { field: "brief", .. })
        ));
        assert!(matches!(
            build(vec![Descriptor {
                mode_config: ModeConfig {
                    disable: &[],
                    enable: &[Mode::Strict],
                    info: &[],
                    warning: &[],
                    error: &[Mode::Default],
                },
                ..descriptor("SS001", ProjectType::Sketch)
            }]),
            Some(EngineError::RuleMisconfigured { .. })
        ));
        assert!(matches!(
            build(vec![Descriptor {
                mode_config: ModeConfig {
                    disable: &[],
                    enable: &[Mode::Default],
                    info: &[],
                    warning: &[Mode::Strict],
                    error: &[Mode::Default, Mode::Strict],
                },
                ..descriptor("SS001", ProjectType::Sketch)
            }]),
            Some(EngineError::RepeatedMode {
                mode: Mode::Strict,
                ..
            })
        ));
    }
}
