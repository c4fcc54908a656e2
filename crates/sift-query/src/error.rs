//! Recoverable parse errors.
//!
//! Parsing never fails outright. Every problem found while scanning the query
//! becomes a [`ParseError`] in the result metadata, and scanning continues.

use serde::Serialize;
use thiserror::Error;

/// What kind of problem a [`ParseError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// Text that no token category recognizes; it was skipped.
    Syntax,
    /// A field name outside the allow-list; the whole term was dropped.
    InvalidKey,
    /// A number or date literal that names no real value (strict mode only).
    InvalidLiteral,
    /// The query exceeds the configured length cap; nothing was parsed.
    QueryTooLong,
}

/// A recoverable problem found while parsing a query.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} at position {position}")]
pub struct ParseError {
    /// Error kind.
    pub kind: ParseErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Character offset in the normalized query.
    pub position: usize,
    /// Field name involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Offending text, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ParseError {
    /// Unrecognized text starting at `position`.
    pub fn syntax(position: usize, value: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::Syntax,
            message: "Unexpected syntax".to_string(),
            position,
            key: None,
            value: Some(value.into()),
        }
    }

    /// A term scoped to a field the allow-list rejects.
    pub fn invalid_key(position: usize, key: &str, value: &str) -> Self {
        Self {
            kind: ParseErrorKind::InvalidKey,
            message: format!("Invalid key: {key}"),
            position,
            key: Some(key.to_string()),
            value: Some(value.to_string()),
        }
    }

    /// A comparison literal with an impossible value.
    pub fn invalid_literal(position: usize, key: Option<&str>, value: &str) -> Self {
        Self {
            kind: ParseErrorKind::InvalidLiteral,
            message: format!("Invalid number or date: {value}"),
            position,
            key: key.map(str::to_string),
            value: Some(value.to_string()),
        }
    }

    /// A query longer than `max` characters.
    pub fn query_too_long(length: usize, max: usize) -> Self {
        Self {
            kind: ParseErrorKind::QueryTooLong,
            message: format!("Query is {length} characters long; the limit is {max}"),
            position: max,
            key: None,
            value: None,
        }
    }

    /// Renders the error with the query and a caret under the offending position.
    pub fn format_with_context(&self, query: &str) -> String {
        let width = query.chars().count();
        let mut result = format!("query error: {}\n", self.message);
        result.push_str(&format!("  {query}\n"));
        result.push_str(&format!("  {}^", " ".repeat(self.position.min(width))));
        if let Some(hint) = self.suggestion() {
            result.push_str(&format!("\nhint: {hint}"));
        }
        result
    }

    /// Returns a suggestion for common mistakes.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self.kind {
            ParseErrorKind::Syntax => match self.value.as_deref()?.chars().next()? {
                '"' => Some("Add a closing quote (\") to complete the phrase"),
                '/' => Some("Add a closing slash (/) to complete the regex"),
                '(' => Some("Put whitespace before an opening parenthesis"),
                _ => None,
            },
            ParseErrorKind::InvalidKey => Some("Only configured field names may be used as keys"),
            ParseErrorKind::InvalidLiteral => {
                Some("Dates are written YYYY, YYYY-MM, YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]")
            }
            ParseErrorKind::QueryTooLong => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let err = ParseError::syntax(6, "~world");
        assert_eq!(err.to_string(), "Unexpected syntax at position 6");
    }

    #[test]
    fn context_points_at_position() {
        let err = ParseError::syntax(6, "~world");
        let rendered = err.format_with_context("hello ~world");
        assert_eq!(
            rendered,
            "query error: Unexpected syntax\n  hello ~world\n        ^"
        );
    }

    #[test]
    fn context_clamps_position() {
        let err = ParseError::query_too_long(10, 4);
        let rendered = err.format_with_context("ab");
        assert!(rendered.ends_with("  ^"));
    }

    #[test]
    fn unclosed_quote_hint() {
        let err = ParseError::syntax(0, "\"abc");
        assert!(err.suggestion().is_some_and(|s| s.contains("closing quote")));
        assert!(err.format_with_context("\"abc").contains("hint:"));
    }

    #[test]
    fn invalid_key_fields() {
        let err = ParseError::invalid_key(0, "invalid", "value");
        assert_eq!(err.kind, ParseErrorKind::InvalidKey);
        assert_eq!(err.key.as_deref(), Some("invalid"));
        assert_eq!(err.value.as_deref(), Some("value"));
    }
}
