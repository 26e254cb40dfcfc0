//! Interfaces to the outside world used by discovery, data loading and rules.
//!
//! Each capability is a trait with one real implementation, so the engine
//! can run against fakes in tests.

mod clock;
mod fs;
mod git;
mod http;
mod spell;

pub use clock::{Clock, FixedClock, SystemClock};
pub use fs::{DirEntry, Filesystem, OsFilesystem};
pub use git::{Git, Git2, GitError, GitState, GitTag};
pub use http::{FakeHttp, Http, HttpError, HttpStatus, UreqHttp};
pub use spell::{Correction, DictionarySpellCheck, SpellCheck};

use std::sync::Arc;
use std::time::Duration;

/// Default timeout for outbound HTTP requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The capability bundle handed to the engine.
#[derive(Clone)]
pub struct Capabilities {
    /// Filesystem access.
    pub fs: Arc<dyn Filesystem>,
    /// Git working copy access.
    pub git: Arc<dyn Git>,
    /// Outbound HTTP.
    pub http: Arc<dyn Http>,
    /// Misspelling detection.
    pub spell: Arc<dyn SpellCheck>,
    /// Current time.
    pub clock: Arc<dyn Clock>,
}

impl Capabilities {
    /// Capabilities backed by the operating system and network.
    #[must_use]
    pub fn system(http_timeout: Duration) -> Self {
        Self {
            fs: Arc::new(OsFilesystem),
            git: Arc::new(Git2),
            http: Arc::new(UreqHttp::new(http_timeout)),
            spell: Arc::new(DictionarySpellCheck),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the HTTP capability.
    #[must_use]
    pub fn with_http(mut self, http: impl Http + 'static) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Replaces the git capability.
    #[must_use]
    pub fn with_git(mut self, git: impl Git + 'static) -> Self {
        self.git = Arc::new(git);
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the spell checker.
    #[must_use]
    pub fn with_spell(mut self, spell: impl SpellCheck + 'static) -> Self {
        self.spell = Arc::new(spell);
        self
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::system(DEFAULT_HTTP_TIMEOUT)
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}
