//! Helpers shared by rule bodies.

use ardlint_core::capabilities::DirEntry;
use ardlint_core::{has_sketch_source_extension, Properties, RuleContext, RuleOutput};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::trace;

/// Longest allowed sketch or library folder name.
pub(crate) const MAX_PATH_BASE_NAME_LENGTH: usize = 63;

static BASE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9_.-]*$").expect("valid regex"));

// Markup formats GitHub renders as a readme.
static README: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^readme\.((markdown)|(mdown)|(mkdn)|(md)|(textile)|(rdoc)|(org)|(creole)|(mediawiki)|(wiki)|(rst)|(asciidoc)|(adoc)|(asc)|(pod)|(txt))$",
    )
    .expect("valid regex")
});

static LICENSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(((un)?licen[sc]e)|(copy(ing|right))|(ofl)|(patents))(\.((md)|(markdown)|(txt)|(html)))?$",
    )
    .expect("valid regex")
});

static ARDUINO_H_INCORRECT_CASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*#\s*include\s*["<](a(?i:rduino)|ARDUINO)\.[hH][">]"#).expect("valid regex")
});

/// Folders searched for a readme besides the project root.
const README_FOLDERS: [&str; 2] = ["docs", ".github"];

/// True if `name` is allowed as a sketch file or project folder name.
pub(crate) fn valid_base_name(name: &str) -> bool {
    BASE_NAME.is_match(name)
}

/// Files of a listing.
pub(crate) fn files(entries: &[DirEntry]) -> impl Iterator<Item = &DirEntry> {
    entries.iter().filter(|e| !e.is_dir)
}

/// Directories of a listing.
pub(crate) fn dirs(entries: &[DirEntry]) -> impl Iterator<Item = &DirEntry> {
    entries.iter().filter(|e| e.is_dir)
}

/// Finds an entry whose name is a misspelling of `correct`.
///
/// Nothing is reported once an entry named `correct` is seen.
pub(crate) fn misspelled_name<'a>(
    entries: impl IntoIterator<Item = &'a DirEntry>,
    correct: &str,
    misspelling: &Regex,
) -> Option<&'a DirEntry> {
    for entry in entries {
        if entry.name == correct {
            return None;
        }
        if misspelling.is_match(&entry.name) {
            return Some(entry);
        }
    }
    None
}

/// Finds an entry named `correct` in the wrong case.
///
/// Nothing is reported once an entry named exactly `correct` is seen.
pub(crate) fn incorrect_case<'a>(
    entries: impl IntoIterator<Item = &'a DirEntry>,
    correct: &str,
) -> Option<&'a DirEntry> {
    for entry in entries {
        if entry.name == correct {
            return None;
        }
        if entry.name.eq_ignore_ascii_case(correct) {
            return Some(entry);
        }
    }
    None
}

/// Fails with the entry path if one was found.
pub(crate) fn fail_with_path(found: Option<&DirEntry>) -> RuleOutput {
    found.map_or_else(RuleOutput::pass, |entry| {
        RuleOutput::fail(entry.path.display().to_string())
    })
}

/// Fails with the items joined, or passes if there are none.
pub(crate) fn fail_with_list<S: AsRef<str>>(items: &[S]) -> RuleOutput {
    if items.is_empty() {
        return RuleOutput::pass();
    }
    let joined: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    RuleOutput::fail(joined.join(", "))
}

/// Splits a comma separated field value into trimmed items.
pub(crate) fn comma_separated(value: &str) -> Vec<&str> {
    value.split(',').map(str::trim).collect()
}

/// Replaces characters not allowed in installation folder names with `_`.
pub(crate) fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// True if `path` lies below one of the top-level folders in `names`.
pub(crate) fn under_top_level(root: &Path, path: &Path, names: &[&str]) -> bool {
    path.strip_prefix(root)
        .ok()
        .and_then(|relative| relative.components().next())
        .is_some_and(|first| names.iter().any(|n| first.as_os_str() == *n))
}

/// Runs `check` on the library properties.
///
/// Returns `NotRun` when the project is not a library or its properties
/// failed to load.
pub(crate) fn with_properties(
    ctx: &RuleContext<'_>,
    check: impl FnOnce(&Properties) -> RuleOutput,
) -> RuleOutput {
    match ctx.data.library() {
        Some(library) if library.is_loaded() => check(library.properties()),
        _ => RuleOutput::not_run("Couldn't load library.properties"),
    }
}

/// Fails if a required field is missing. Legacy libraries are skipped.
pub(crate) fn field_missing(ctx: &RuleContext<'_>, key: &str) -> RuleOutput {
    match ctx.data.library() {
        Some(library) if !library.is_loaded() => {
            RuleOutput::not_run("Couldn't load library.properties")
        }
        Some(library) if library.is_legacy() => RuleOutput::skip("Library has legacy format"),
        Some(library) if !library.properties().contains_key(key) => RuleOutput::fail(""),
        Some(_) => RuleOutput::pass(),
        None => RuleOutput::not_run("Couldn't load library.properties"),
    }
}

/// Runs `check` on a field value; `NotRun` when the field is absent.
pub(crate) fn with_field(
    ctx: &RuleContext<'_>,
    key: &str,
    check: impl FnOnce(&str) -> RuleOutput,
) -> RuleOutput {
    with_properties(ctx, |properties| {
        properties
            .get(key)
            .map_or_else(|| RuleOutput::not_run("Field not present"), check)
    })
}

/// Runs `check` on an optional field value; `Skip` when the field is absent.
pub(crate) fn with_optional_field(
    ctx: &RuleContext<'_>,
    key: &str,
    check: impl FnOnce(&str) -> RuleOutput,
) -> RuleOutput {
    with_properties(ctx, |properties| {
        properties
            .get(key)
            .map_or_else(|| RuleOutput::skip("Field not present"), check)
    })
}

/// Fails if the value is shorter than `min` characters.
pub(crate) fn shorter_than(value: &str, min: usize) -> RuleOutput {
    if value.chars().count() < min {
        RuleOutput::fail("")
    } else {
        RuleOutput::pass()
    }
}

/// Fails with the corrected text if the value has common misspellings.
pub(crate) fn spell_check_field(ctx: &RuleContext<'_>, key: &str) -> RuleOutput {
    with_optional_field(ctx, key, |value| {
        ctx.capabilities
            .spell
            .correct(value)
            .map_or_else(RuleOutput::pass, RuleOutput::fail)
    })
}

fn folder_has_match(ctx: &RuleContext<'_>, folder: &Path, pattern: &Regex) -> bool {
    match ctx.capabilities.fs.read_dir(folder) {
        Ok(entries) => files(&entries).any(|e| pattern.is_match(&e.name)),
        Err(e) => {
            trace!("Can't list {}: {}", folder.display(), e);
            false
        }
    }
}

/// Passes if a readme GitHub recognizes is in the root, `docs` or `.github`.
pub(crate) fn missing_readme(ctx: &RuleContext<'_>) -> RuleOutput {
    if files(ctx.data.entries()).any(|e| README.is_match(&e.name)) {
        return RuleOutput::pass();
    }

    let fs = ctx.capabilities.fs.as_ref();
    let found = README_FOLDERS.iter().any(|name| {
        let folder = ctx.data.folder().join(name);
        fs.is_dir(&folder) && folder_has_match(ctx, &folder, &README)
    });
    if found {
        RuleOutput::pass()
    } else {
        RuleOutput::fail("")
    }
}

/// Passes if a license file GitHub recognizes is in the root.
pub(crate) fn missing_license_file(ctx: &RuleContext<'_>) -> RuleOutput {
    if files(ctx.data.entries()).any(|e| LICENSE.is_match(&e.name)) {
        RuleOutput::pass()
    } else {
        RuleOutput::fail("")
    }
}

/// Fails on the first `#include` of `Arduino.h` spelled in the wrong case.
pub(crate) fn incorrect_arduino_h_case(ctx: &RuleContext<'_>) -> RuleOutput {
    let sources = files(ctx.data.tree()).filter(|e| has_sketch_source_extension(&e.path));
    for source in sources {
        let text = match ctx.capabilities.fs.read_to_string(&source.path) {
            Ok(text) => text,
            Err(e) => return RuleOutput::not_run(format!("{}: {e}", source.path.display())),
        };
        for (number, line) in text.lines().enumerate() {
            if ARDUINO_H_INCORRECT_CASE.is_match(line) {
                return RuleOutput::fail(format!(
                    "{}:{}: {}",
                    source.path.display(),
                    number + 1,
                    line
                ));
            }
        }
    }
    RuleOutput::pass()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(name: &str, is_dir: bool) -> DirEntry {
        DirEntry {
            path: PathBuf::from("/lib").join(name),
            name: name.to_string(),
            is_dir,
            is_symlink: false,
        }
    }

    #[test]
    fn base_names() {
        assert!(valid_base_name("Foo_bar-1.2"));
        assert!(valid_base_name("_private"));
        assert!(!valid_base_name("-leading"));
        assert!(!valid_base_name("has space"));
        assert!(!valid_base_name(""));
    }

    #[test]
    fn misspelling_ignored_when_correct_name_is_first() {
        let pattern = Regex::new("(?i)^extra$").unwrap();
        let entries = [entry("extras", true), entry("extra", true)];
        assert!(misspelled_name(&entries, "extras", &pattern).is_none());

        let entries = [entry("Extra", true)];
        assert_eq!(
            misspelled_name(&entries, "extras", &pattern).map(|e| e.name.as_str()),
            Some("Extra")
        );
    }

    #[test]
    fn incorrect_case_detection() {
        let entries = [entry("SRC", true)];
        assert_eq!(
            incorrect_case(&entries, "src").map(|e| e.name.as_str()),
            Some("SRC")
        );
        assert!(incorrect_case(&[entry("src", true)], "src").is_none());
        assert!(incorrect_case(&[entry("source", true)], "src").is_none());
    }

    #[test]
    fn readme_and_license_names() {
        assert!(README.is_match("README.md"));
        assert!(README.is_match("readme.AsciiDoc"));
        assert!(!README.is_match("README"));
        assert!(LICENSE.is_match("LICENSE"));
        assert!(LICENSE.is_match("unlicense.txt"));
        assert!(LICENSE.is_match("COPYING.md"));
        assert!(!LICENSE.is_match("LICENSE.rst"));
    }

    #[test]
    fn arduino_h_case() {
        assert!(ARDUINO_H_INCORRECT_CASE.is_match("#include <arduino.h>"));
        assert!(ARDUINO_H_INCORRECT_CASE.is_match("  # include \"ARDUINO.H\""));
        assert!(!ARDUINO_H_INCORRECT_CASE.is_match("#include <Arduino.h>"));
        assert!(!ARDUINO_H_INCORRECT_CASE.is_match("// #include <arduino.h>"));
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_name("My Lib (v2)"), "My_Lib__v2_");
        assert_eq!(sanitize_name("Servo"), "Servo");
    }

    #[test]
    fn top_level_folder() {
        let root = Path::new("/lib");
        assert!(under_top_level(root, Path::new("/lib/examples/a/a.ino"), &["examples"]));
        assert!(!under_top_level(root, Path::new("/lib/src/examples/a.ino"), &["examples"]));
    }

    #[test]
    fn list_output() {
        assert_eq!(fail_with_list::<&str>(&[]), RuleOutput::pass());
        assert_eq!(fail_with_list(&["a", "b"]), RuleOutput::fail("a, b"));
    }
}
