//! Context handed to rules.

use crate::capabilities::Capabilities;
use crate::data::{LibraryIndex, ProjectData, SharedLibraryIndex};
use crate::mode::ModeSet;
use crate::project::Project;

/// Everything a rule may read while checking one project.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The project being checked.
    pub project: &'a Project,
    /// Its prefetched data.
    pub data: &'a ProjectData,
    /// Modes active for the project.
    pub modes: &'a ModeSet,
    /// Outside-world access, for the few rules that probe resources.
    pub capabilities: &'a Capabilities,
    library_index: &'a SharedLibraryIndex,
}

impl<'a> RuleContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(
        project: &'a Project,
        data: &'a ProjectData,
        modes: &'a ModeSet,
        capabilities: &'a Capabilities,
        library_index: &'a SharedLibraryIndex,
    ) -> Self {
        Self {
            project,
            data,
            modes,
            capabilities,
            library_index,
        }
    }

    /// The Library Manager index, loaded on first use.
    ///
    /// # Errors
    ///
    /// Returns the load error text if the index is unavailable.
    pub fn library_index(&self) -> Result<&'a LibraryIndex, &'a str> {
        self.library_index.get(self.capabilities)
    }
}
