//! Parser for Arduino `key=value` properties files.
//!
//! Used for `library.properties`, `boards.txt`, `platform.txt` and
//! `programmers.txt`.

use thiserror::Error;

/// A line that is not a comment, blank, or `key=value`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error parsing data at line {line}: invalid line format, should be 'key=value'")]
pub struct PropertiesError {
    /// 1-based line number.
    pub line: usize,
}

/// Ordered key-value map.
///
/// A repeated key keeps the position of its first occurrence and the value of
/// its last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    /// Parses properties text.
    ///
    /// # Errors
    ///
    /// Returns the first malformed line.
    pub fn parse(text: &str) -> Result<Self, PropertiesError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut properties = Self::default();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(PropertiesError { line: index + 1 });
            };
            properties.set(key.trim(), value.trim());
        }

        Ok(properties)
    }

    /// Inserts or replaces a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Gets a value by exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Gets a value by case-insensitive key.
    #[must_use]
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the exact key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_trims() {
        let props = Properties::parse(
            "# comment\nname = Servo\n\nversion=1.1.8\nsentence=Allows = signs\n",
        )
        .unwrap();
        assert_eq!(props.get("name"), Some("Servo"));
        assert_eq!(props.get("sentence"), Some("Allows = signs"));
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn repeated_key_keeps_first_position() {
        let props = Properties::parse("a=1\nb=2\na=3").unwrap();
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(props.get("a"), Some("3"));
    }

    #[test]
    fn case_insensitive_lookup() {
        let props = Properties::parse("Name=Servo").unwrap();
        assert_eq!(props.get("name"), None);
        assert_eq!(props.get_ignore_case("name"), Some("Servo"));
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let err = Properties::parse("name=Servo\nthis is not a property\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(
            err.to_string(),
            "Error parsing data at line 2: invalid line format, should be 'key=value'"
        );
    }

    #[test]
    fn empty_value_is_allowed() {
        let props = Properties::parse("depends=").unwrap();
        assert_eq!(props.get("depends"), Some(""));
    }
}
