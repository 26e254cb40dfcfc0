//! Relaxed semantic versions as used by Arduino metadata.
//!
//! A relaxed version may omit the minor and patch components (`1`, `1.2`);
//! missing components are taken as zero.

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;

static RELAXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(0|[1-9][0-9]*)(?:\.(0|[1-9][0-9]*))?(?:\.(0|[1-9][0-9]*))?(-[0-9A-Za-z.-]+)?(\+[0-9A-Za-z.-]+)?$",
    )
    .expect("valid regex")
});

/// Parses a relaxed version, padding missing components with zero.
#[must_use]
pub fn parse_relaxed(text: &str) -> Option<Version> {
    let caps = RELAXED.captures(text)?;
    let part = |i: usize| caps.get(i).map_or("0", |m| m.as_str());
    let normalized = format!(
        "{}.{}.{}{}{}",
        part(1),
        part(2),
        part(3),
        caps.get(4).map_or("", |m| m.as_str()),
        caps.get(5).map_or("", |m| m.as_str()),
    );
    Version::parse(&normalized).ok()
}

/// Returns true if `text` is a complete semantic version.
#[must_use]
pub fn is_strict(text: &str) -> bool {
    Version::parse(text).is_ok()
}
