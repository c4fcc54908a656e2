//! Error types for record filtering.

use thiserror::Error;

/// Errors that can occur when preparing or applying a filter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A regex condition does not compile.
    #[error("invalid regex /{pattern}/ at position {position}: {source}")]
    InvalidRegex {
        /// The pattern as written in the query.
        pattern: String,
        /// Character offset of the term.
        position: usize,
        /// Underlying regex error.
        source: regex::Error,
    },

    /// Filter input was not a JSON array of records.
    #[error("expected a JSON array of records, found {found}")]
    NotAnArray {
        /// JSON type that was found instead.
        found: &'static str,
    },
}
