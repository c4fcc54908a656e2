//! Parse results.

use serde::Serialize;

use crate::{ast::AstNode, condition::AstCondition, error::ParseError, lexer::Token};

/// Facts about one parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseMetadata {
    /// The normalized query; every position refers to this string.
    pub original_query: String,
    /// Wall-clock parse time in milliseconds.
    pub parse_time_ms: f64,
    /// True iff `errors` is non-empty.
    pub has_errors: bool,
    /// Every recoverable error, in source order.
    pub errors: Vec<ParseError>,
}

impl ParseMetadata {
    /// Creates metadata, deriving `has_errors` from `errors`.
    pub fn new(original_query: String, parse_time_ms: f64, errors: Vec<ParseError>) -> Self {
        Self {
            original_query,
            parse_time_ms,
            has_errors: !errors.is_empty(),
            errors,
        }
    }
}

/// Everything produced by parsing one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    /// Cleaned token stream.
    pub tokens: Vec<Token>,
    /// Query tree; `None` when no usable term remains.
    pub ast: Option<AstNode>,
    /// Leaf conditions with negation propagated, in source order.
    pub ast_conditions: Vec<AstCondition>,
    /// Normalized query, timing and errors.
    pub metadata: ParseMetadata,
}

impl ParseResult {
    /// Returns true if any recoverable error was recorded.
    pub fn has_errors(&self) -> bool {
        self.metadata.has_errors
    }

    /// Returns the errors rendered against the normalized query.
    pub fn error_report(&self) -> Vec<String> {
        self.metadata
            .errors
            .iter()
            .map(|e| e.format_with_context(&self.metadata.original_query))
            .collect()
    }
}
