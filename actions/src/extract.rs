//! Turning decrypted text into the value an action asks for.

use regex::RegexBuilder;

use crate::action::{Action, ActionRule};
use crate::error::ExtractionError;

/// What to do with decrypted text after applying an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extracted<'a> {
    /// Copy this value to the clipboard.
    Value(&'a str),

    /// Display the whole text.
    Contents(&'a str),

    /// The text had no non-empty line.
    Empty,
}

/// The first non-empty line, which by convention holds the password.
pub fn first_line(text: &str) -> Option<&str> {
    text.lines().find(|line| !line.is_empty())
}

/// First capture group of the first match of `pattern` in `text`.
///
/// `^` and `$` match at line boundaries.
pub fn extract_with_pattern<'a>(
    pattern: &str,
    text: &'a str,
    entry: &str,
) -> Result<&'a str, ExtractionError> {
    let failure = |valid| ExtractionError {
        pattern: pattern.to_string(),
        valid,
        entry: entry.to_string(),
    };

    let regex = RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|_| failure(false))?;

    regex
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str())
        .ok_or_else(|| failure(true))
}

/// Apply `action` (or the default first-line rule) to decrypted `text`.
pub fn apply_action<'a>(
    action: Option<&Action>,
    text: &'a str,
    entry: &str,
) -> Result<Extracted<'a>, ExtractionError> {
    match action.map(|a| &a.rule) {
        None => Ok(first_line(text).map_or(Extracted::Empty, Extracted::Value)),
        Some(ActionRule::ShowContents) => Ok(Extracted::Contents(text)),
        Some(ActionRule::Extract { pattern }) => {
            extract_with_pattern(pattern, text, entry).map(Extracted::Value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionDefinition;
    use pretty_assertions::assert_eq;

    const CONTENTS: &str = "secret123\nuser: alice\nurl: https://example.com\n";

    #[test]
    fn test_first_line_skips_empty_lines() {
        assert_eq!(first_line(CONTENTS), Some("secret123"));
        assert_eq!(first_line("\n\nhunter2\r\nrest"), Some("hunter2"));
        assert_eq!(first_line("\n\n"), None);
    }

    #[test]
    fn test_pattern_takes_first_group() {
        assert_eq!(
            extract_with_pattern("user: (.+)", CONTENTS, "bank"),
            Ok("alice")
        );
        assert_eq!(
            extract_with_pattern("^url: (.+)$", CONTENTS, "bank"),
            Ok("https://example.com")
        );
    }

    #[test]
    fn test_pattern_without_match_reports_diagnostic() {
        let err = extract_with_pattern("phone: (.+)", CONTENTS, "bank").unwrap_err();

        assert_eq!(
            err,
            ExtractionError {
                pattern: "phone: (.+)".to_string(),
                valid: true,
                entry: "bank".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_pattern_reports_validity() {
        let err = extract_with_pattern("user: (.+", CONTENTS, "bank").unwrap_err();

        assert!(!err.valid);
    }

    #[test]
    fn test_pattern_without_group_is_an_error() {
        assert!(extract_with_pattern("user", CONTENTS, "bank").is_err());
    }

    #[test]
    fn test_apply_action_dispatch() {
        let user = Action::from_definition(&ActionDefinition::new("user", "", "user: (.+)"), 0);
        let show = Action::show_contents(1);

        assert_eq!(
            apply_action(None, CONTENTS, "bank"),
            Ok(Extracted::Value("secret123"))
        );
        assert_eq!(
            apply_action(Some(&user), CONTENTS, "bank"),
            Ok(Extracted::Value("alice"))
        );
        assert_eq!(
            apply_action(Some(&show), CONTENTS, "bank"),
            Ok(Extracted::Contents(CONTENTS))
        );
        assert_eq!(apply_action(None, "", "bank"), Ok(Extracted::Empty));
    }
}
