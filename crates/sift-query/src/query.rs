//! The parse entrypoint.

use std::time::Instant;

use tracing::debug;

use crate::{
    condition::extract,
    config::ParserConfig,
    error::ParseError,
    lexer::{TokenStream, tokenize},
    normalize::normalize,
    parser::build,
    result::{ParseMetadata, ParseResult},
};

/// Parses queries with a fixed configuration.
///
/// Parsing keeps no state between calls, so one parser can serve any number
/// of threads.
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    /// Settings applied to every parse.
    config: ParserConfig,
}

impl QueryParser {
    /// Creates a parser with `config`.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses `query`.
    ///
    /// Never fails: problems are reported in `metadata.errors` and the rest
    /// of the query is still parsed.
    pub fn parse(&self, query: &str) -> ParseResult {
        let started = Instant::now();
        let normalized = normalize(query);

        let TokenStream { tokens, errors } = match self.config.max_query_length {
            Some(max) if normalized.chars().count() > max => TokenStream {
                tokens: Vec::new(),
                errors: vec![ParseError::query_too_long(normalized.chars().count(), max)],
            },
            _ => tokenize(&normalized, &self.config),
        };

        let ast = build(&tokens);
        let ast_conditions = extract(ast.as_ref(), self.config.drop_zero_values);
        let parse_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(
            query = %normalized,
            tokens = tokens.len(),
            conditions = ast_conditions.len(),
            errors = errors.len(),
            parse_time_ms,
            "parsed query"
        );

        ParseResult {
            tokens,
            ast,
            ast_conditions,
            metadata: ParseMetadata::new(normalized, parse_time_ms, errors),
        }
    }
}

/// Parses `query` with the default configuration.
pub fn parse(query: &str) -> ParseResult {
    QueryParser::default().parse(query)
}
