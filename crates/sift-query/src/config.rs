//! Parser configuration.

use std::collections::BTreeSet;

/// Settings that shape how a query is tokenized.
///
/// A configuration is read-only once a parser holds it, so one value can be
/// shared across threads and parses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// Field names accepted as keys. `None` accepts every key.
    pub valid_keys: Option<BTreeSet<String>>,
    /// Field applied to keyless terms.
    pub default_key: Option<String>,
    /// Report impossible number and date literals instead of dropping them silently.
    pub strict_literals: bool,
    /// Leave conditions whose value is numeric zero out of the extracted list,
    /// the way empty text is. Off by default, so `price:0` is kept.
    pub drop_zero_values: bool,
    /// Longest accepted query, in characters of the normalized query.
    pub max_query_length: Option<usize>,
}

impl ParserConfig {
    /// Creates a configuration that accepts any key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts keys to `keys`.
    pub fn with_valid_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Scopes keyless terms to `key`.
    pub fn with_default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = Some(key.into());
        self
    }

    /// Sets whether impossible literals are reported.
    pub fn with_strict_literals(mut self, strict: bool) -> Self {
        self.strict_literals = strict;
        self
    }

    /// Sets whether numeric zero is treated like empty text during extraction.
    pub fn with_drop_zero_values(mut self, drop: bool) -> Self {
        self.drop_zero_values = drop;
        self
    }

    /// Caps the query length.
    pub fn with_max_query_length(mut self, max: usize) -> Self {
        self.max_query_length = Some(max);
        self
    }

    /// Returns true if `key` may be used as a field name.
    pub fn accepts_key(&self, key: &str) -> bool {
        self.valid_keys
            .as_ref()
            .is_none_or(|keys| keys.contains(key))
    }
}
