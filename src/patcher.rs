//! Line-oriented editing of flat JSON settings documents.
//!
//! A document is treated as a list of lines, one property per line, closed
//! by a bare `}`. Only the lines touched by an edit change; everything else,
//! including comments and odd indentation, is passed through byte for byte.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::unwrap_used)]
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*$").unwrap());

const INDENT: &str = "    ";

/// The value of a settings property
///
/// Booleans are written bare, everything else as a double-quoted string.
/// Strings are not escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// `true` or `false`, written unquoted
    Bool(bool),
    /// Any other value, written in double quotes
    String(String),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        match value {
            "true" => PropertyValue::Bool(true),
            "false" => PropertyValue::Bool(false),
            other => PropertyValue::String(other.to_string()),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        match value.as_str() {
            "true" | "false" => PropertyValue::from(value.as_str()),
            _ => PropertyValue::String(value),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// How a line is recognised as holding a given key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyMatch {
    /// The line contains `"key"` anywhere. A key that appears quoted inside
    /// another key's value, or as a value itself, also matches.
    #[default]
    Quoted,
    /// The line contains `"key"` followed by optional whitespace and a colon.
    Property,
}

impl KeyMatch {
    fn matches(&self, line: &str, key: &str) -> bool {
        let needle = format!("\"{}\"", key);
        match self {
            KeyMatch::Quoted => line.contains(&needle),
            KeyMatch::Property => line
                .match_indices(&needle)
                .any(|(at, _)| line[at + needle.len()..].trim_start().starts_with(':')),
        }
    }
}

/// Adds, updates and removes top-level properties in a settings document
#[derive(Debug, Clone, Copy, Default)]
pub struct Patcher {
    key_match: KeyMatch,
}

impl Patcher {
    /// Create a patcher using the default [`KeyMatch::Quoted`] rule
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given key matching rule
    pub fn with_key_match(mut self, key_match: KeyMatch) -> Self {
        self.key_match = key_match;
        self
    }

    /// The key matching rule in use
    pub fn key_match(&self) -> KeyMatch {
        self.key_match
    }

    /// Set `key` to `value`, replacing the first line that holds the key or
    /// inserting a new line before the last closing brace.
    ///
    /// Text without a closing brace gets the property appended as its last
    /// line.
    pub fn upsert(&self, text: &str, key: &str, value: impl Into<PropertyValue>) -> String {
        let mut lines = split_lines(text);
        let property = format!("{}\"{}\": {}", INDENT, key, value.into());

        if let Some(index) = lines
            .iter()
            .position(|line| self.key_match.matches(line, key))
        {
            let (content, eol) = split_eol(&lines[index]);
            let comma = if content.trim().ends_with(',') { "," } else { "" };
            lines[index] = format!("{}{}{}", property, comma, eol);
            log::debug!("Updated {:?} on line {}", key, index + 1);
            return lines.join("\n");
        }

        let Some(close) = lines.iter().rposition(|line| line.trim() == "}") else {
            log::debug!("No closing brace found, appending {:?}", key);
            lines.push(property);
            return lines.join("\n");
        };

        if let Some(prev) = previous_non_blank(&lines, close) {
            let (content, eol) = split_eol(&lines[prev]);
            let trimmed = content.trim();
            if trimmed != "{" && !trimmed.ends_with(',') {
                lines[prev] = format!("{},{}", content, eol);
            }
        }

        let eol = split_eol(&lines[close]).1.to_string();
        lines.insert(close, format!("{}{}", property, eol));
        log::debug!("Inserted {:?} on line {}", key, close + 1);
        lines.join("\n")
    }

    /// Delete every line holding `key`, then drop a comma left dangling on
    /// what became the only property before a closing brace.
    ///
    /// Returns the text unchanged when no line holds the key.
    pub fn remove(&self, text: &str, key: &str) -> String {
        let mut lines = split_lines(text);
        let before = lines.len();
        lines.retain(|line| !self.key_match.matches(line, key));
        if lines.len() == before {
            return text.to_string();
        }
        log::debug!("Removed {} line(s) holding {:?}", before - lines.len(), key);

        for close in 0..lines.len() {
            if lines[close].trim() != "}" {
                continue;
            }
            let Some(prev) = previous_non_blank(&lines, close) else {
                continue;
            };
            let (content, eol) = split_eol(&lines[prev]);
            if !content.trim().ends_with(',') {
                continue;
            }
            let only_property = match previous_non_blank(&lines, prev) {
                Some(above) => lines[above].trim() == "{",
                None => true,
            };
            if only_property {
                lines[prev] = format!("{}{}", TRAILING_COMMA.replace(content, ""), eol);
            }
        }

        lines.join("\n")
    }
}

/// [`Patcher::upsert`] with the default key matching rule
pub fn upsert(text: &str, key: &str, value: impl Into<PropertyValue>) -> String {
    Patcher::new().upsert(text, key, value)
}

/// [`Patcher::remove`] with the default key matching rule
pub fn remove(text: &str, key: &str) -> String {
    Patcher::new().remove(text, key)
}

// A final newline leaves an empty last element, so joining restores it.
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

fn split_eol(line: &str) -> (&str, &str) {
    match line.strip_suffix('\r') {
        Some(content) => (content, "\r"),
        None => (line, ""),
    }
}

fn previous_non_blank(lines: &[String], index: usize) -> Option<usize> {
    (0..index).rev().find(|&i| !lines[i].trim().is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const SETTINGS: &str = indoc! {r#"
        {
            "workbench.colorTheme": "Default Dark+",
            "editor.fontSize": 14
        }
    "#};

    #[test]
    fn test_insert_after_last_property() {
        let text = "{\n    \"a\": \"1\"\n}";
        assert_eq!(
            upsert(text, "b", "true"),
            "{\n    \"a\": \"1\",\n    \"b\": true\n}"
        );
    }

    #[test]
    fn test_insert_then_remove_first() {
        let text = "{\n    \"a\": \"1\"\n}";
        let added = upsert(text, "b", "true");
        assert_eq!(remove(&added, "a"), "{\n    \"b\": true\n}");
    }

    #[test]
    fn test_insert_into_empty_object() {
        assert_eq!(upsert("{\n}", "x", "y"), "{\n    \"x\": \"y\"\n}");
    }

    #[rstest]
    #[case("true", "    \"flag\": true")]
    #[case("false", "    \"flag\": false")]
    #[case("True", "    \"flag\": \"True\"")]
    #[case("x", "    \"flag\": \"x\"")]
    #[case("", "    \"flag\": \"\"")]
    fn test_value_rendering(#[case] value: &str, #[case] line: &str) {
        let result = upsert("{\n}", "flag", value);
        assert_eq!(result.lines().nth(1).unwrap(), line);
    }

    #[test]
    fn test_bool_value() {
        assert_eq!(upsert("{\n}", "flag", false), "{\n    \"flag\": false\n}");
    }

    #[test]
    fn test_update_keeps_comma() {
        let result = upsert(SETTINGS, "workbench.colorTheme", "Monokai");
        assert_eq!(
            result,
            indoc! {r#"
                {
                    "workbench.colorTheme": "Monokai",
                    "editor.fontSize": 14
                }
            "#}
        );
    }

    #[test]
    fn test_update_without_comma() {
        let text = "{\n  \"a\":\"1\",\n  \"b\":    \"2\"\n}";
        assert_eq!(
            upsert(text, "b", "3"),
            "{\n  \"a\":\"1\",\n    \"b\": \"3\"\n}"
        );
    }

    #[test]
    fn test_update_touches_only_first_duplicate() {
        let text = "{\n    \"a\": \"1\",\n    \"a\": \"2\"\n}";
        assert_eq!(
            upsert(text, "a", "3"),
            "{\n    \"a\": \"3\",\n    \"a\": \"2\"\n}"
        );
    }

    #[test]
    fn test_preserves_trailing_newline() {
        let result = upsert(SETTINGS, "editor.fontLigatures", "true");
        assert!(result.ends_with("}\n"));
        assert_eq!(
            result,
            indoc! {r#"
                {
                    "workbench.colorTheme": "Default Dark+",
                    "editor.fontSize": 14,
                    "editor.fontLigatures": true
                }
            "#}
        );
    }

    #[test]
    fn test_insert_skips_blank_lines_before_brace() {
        let text = "{\n    \"a\": 1\n\n\n}";
        assert_eq!(upsert(text, "b", "2"), "{\n    \"a\": 1,\n\n\n    \"b\": \"2\"\n}");
    }

    #[test]
    fn test_insert_uses_last_closing_brace() {
        let text = indoc! {r#"
            {
                "a": {
                    "nested": 1
                },
                "b": 2
            }"#};
        assert_eq!(
            upsert(text, "c", "3"),
            indoc! {r#"
                {
                    "a": {
                        "nested": 1
                    },
                    "b": 2,
                    "c": "3"
                }"#}
        );
    }

    #[test]
    fn test_no_closing_brace_appends() {
        assert_eq!(upsert("{\n    \"a\": 1", "b", "2"), "{\n    \"a\": 1\n    \"b\": \"2\"");
        assert_eq!(upsert("", "b", "2"), "\n    \"b\": \"2\"");
    }

    #[test]
    fn test_upsert_is_idempotent() {
        for text in [SETTINGS, "{\n}", "{\n    \"a\": 1,\n}", "", "not json"] {
            let once = upsert(text, "editor.fontFamily", "Monocraft");
            assert_eq!(upsert(&once, "editor.fontFamily", "Monocraft"), once);
        }
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        assert_eq!(remove(SETTINGS, "editor.fontFamily"), SETTINGS);
        let text = "{\n    \"a\": 1,\n}";
        assert_eq!(remove(text, "b"), text);
    }

    #[test]
    fn test_remove_twice() {
        let once = remove(SETTINGS, "editor.fontSize");
        assert_eq!(remove(&once, "editor.fontSize"), once);
    }

    #[test]
    fn test_remove_all_duplicates() {
        let text = "{\n    \"a\": 1,\n    \"b\": 2,\n    \"a\": 3\n}";
        assert_eq!(remove(text, "a"), "{\n    \"b\": 2\n}");
    }

    #[test]
    fn test_remove_strips_dangling_comma_on_sole_property() {
        assert_eq!(
            remove(SETTINGS, "editor.fontSize"),
            "{\n    \"workbench.colorTheme\": \"Default Dark+\"\n}\n"
        );
    }

    #[test]
    fn test_remove_leaves_comma_with_property_above() {
        let text = "{\n    \"a\": 1,\n    \"b\": 2,\n    \"c\": 3\n}";
        assert_eq!(remove(text, "c"), "{\n    \"a\": 1,\n    \"b\": 2,\n}");
    }

    #[test]
    fn test_remove_last_property() {
        assert_eq!(remove("{\n    \"a\": 1\n}", "a"), "{\n}");
    }

    #[rstest]
    #[case(
        "{\n\n    \"a\": 1,\n\n    \"b\": 2\n\n}",
        "{\n\n    \"a\": 1\n\n\n}"
    )]
    #[case("{\n\n    \"a\": 1,\n\n    \"b\": 2\n}", "{\n\n    \"a\": 1\n\n}")]
    #[case("{\n    \"a\": 1,\n    \"b\": 2\n\n\n}", "{\n    \"a\": 1\n\n\n}")]
    fn test_remove_across_blank_lines(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(remove(text, "b"), expected);
    }

    // A comma before a closing brace is only left behind when another
    // property sits above it.
    fn assert_commas_valid(text: &str) {
        let lines = split_lines(text);
        for close in (0..lines.len()).filter(|&i| lines[i].trim() == "}") {
            let Some(prev) = previous_non_blank(&lines, close) else {
                continue;
            };
            if lines[prev].trim().ends_with(',') {
                let above = previous_non_blank(&lines, prev);
                assert!(
                    above.is_some_and(|i| lines[i].trim() != "{"),
                    "dangling comma on line {} of {:?}",
                    prev + 1,
                    text
                );
            }
        }
    }

    #[rstest]
    fn test_edits_keep_commas_valid(
        #[values(
            "{\n\n    \"a\": 1,\n\n    \"b\": 2\n\n}",
            "{\n    \"a\": 1\n}\n",
            "{\n}",
            "{\n\n}",
            "{\n    \"a\": 1,\n    \"b\": 2,\n    \"c\": 3\n}"
        )]
        text: &str,
        #[values("a", "b", "c")] key: &str,
    ) {
        assert_commas_valid(&upsert(text, key, "x"));
        assert_commas_valid(&remove(text, key));
    }

    #[test]
    fn test_round_trip() {
        let added = upsert(SETTINGS, "editor.fontLigatures", "true");
        let removed = remove(&added, "editor.fontLigatures");
        // The comma added to the previous line stays; another property precedes it.
        assert_eq!(
            removed,
            indoc! {r#"
                {
                    "workbench.colorTheme": "Default Dark+",
                    "editor.fontSize": 14,
                }
            "#}
        );
        let single = "{\n    \"a\": \"1\"\n}";
        assert_eq!(remove(&upsert(single, "b", "2"), "b"), single);
    }

    #[test]
    fn test_quoted_match_is_substring() {
        let text = "{\n    \"theme\": \"font\",\n    \"font\": \"x\"\n}";
        assert_eq!(
            upsert(text, "font", "y"),
            "{\n    \"font\": \"y\",\n    \"font\": \"x\"\n}"
        );
    }

    #[test]
    fn test_property_match_requires_colon() {
        let patcher = Patcher::new().with_key_match(KeyMatch::Property);
        let text = "{\n    \"theme\": \"font\",\n    \"font\" : \"x\"\n}";
        assert_eq!(
            patcher.upsert(text, "font", "y"),
            "{\n    \"theme\": \"font\",\n    \"font\": \"y\"\n}"
        );
        assert_eq!(
            patcher.remove(text, "font"),
            "{\n    \"theme\": \"font\"\n}"
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "{\r\n    \"a\": 1\r\n}\r\n";
        assert_eq!(
            upsert(text, "b", "2"),
            "{\r\n    \"a\": 1,\r\n    \"b\": \"2\"\r\n}\r\n"
        );
        assert_eq!(
            remove(&upsert(text, "b", "2"), "a"),
            "{\r\n    \"b\": \"2\"\r\n}\r\n"
        );
    }
}
