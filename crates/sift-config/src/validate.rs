//! Configuration validation.
//!
//! Flags settings that load fine but would make every query fail or behave
//! surprisingly.

use std::fmt;

use crate::Config;

/// A problem with an otherwise loadable configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `valid_keys` is an empty list, so every keyed term is rejected.
    EmptyValidKeys,
    /// `default_key` is not in `valid_keys`, so every keyless term is rejected.
    DefaultKeyNotAllowed {
        /// The configured default key.
        key: String,
    },
    /// `max_query_length` is zero, so every non-empty query is rejected.
    ZeroQueryLength,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValidKeys => {
                write!(f, "parser.valid_keys is empty; every keyed term will be rejected")
            }
            Self::DefaultKeyNotAllowed { key } => write!(
                f,
                "parser.default_key '{key}' is not in parser.valid_keys; bare terms will be rejected"
            ),
            Self::ZeroQueryLength => {
                write!(f, "parser.max_query_length is 0; every query will be rejected")
            }
        }
    }
}

/// Validates the merged configuration.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let parser = &config.parser;

    if let Some(keys) = &parser.valid_keys {
        if keys.is_empty() {
            warnings.push(ConfigWarning::EmptyValidKeys);
        }
        if let Some(default) = &parser.default_key
            && !keys.contains(default)
        {
            warnings.push(ConfigWarning::DefaultKeyNotAllowed {
                key: default.clone(),
            });
        }
    }

    if parser.max_query_length == Some(0) {
        warnings.push(ConfigWarning::ZeroQueryLength);
    }

    warnings
}
