//! The ordered rule catalogue.

use crate::{library, library_properties, package_index, platform, sketch};
use ardlint_core::{Descriptor, ProjectType, RuleBox};

/// Sections in run order. Within a project type, existence and structure
/// come first, then format, fields and documentation.
const SECTIONS: [&[Descriptor]; 6] = [
    sketch::RULES,
    library::STRUCTURE_RULES,
    library_properties::RULES,
    library::DOCUMENTATION_RULES,
    platform::RULES,
    package_index::RULES,
];

/// Every rule descriptor, in catalogue order.
pub fn descriptors() -> impl Iterator<Item = &'static Descriptor> {
    SECTIONS.into_iter().flatten()
}

/// Looks up a rule by ID.
#[must_use]
pub fn descriptor(id: &str) -> Option<&'static Descriptor> {
    descriptors().find(|d| d.id == id)
}

/// Returns the whole catalogue as engine rules.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    descriptors().map(|d| Box::new(*d) as RuleBox).collect()
}

/// Returns the rules applying to one project type.
#[must_use]
pub fn rules_for(project_type: ProjectType) -> Vec<RuleBox> {
    descriptors()
        .filter(|d| d.project_type.matches(project_type))
        .map(|d| Box::new(*d) as RuleBox)
        .collect()
}
