//! Configuration file parsing.
//!
//! Parses individual `.sift.toml` files into `RawConfig` structures whose
//! fields stay optional until merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here and ignore parent and global configs.
    pub root: Option<bool>,
    /// `[parser]` section.
    pub parser: Option<RawParserSettings>,
    /// `[filter]` section.
    pub filter: Option<RawFilterSettings>,
}

/// Raw `[parser]` section.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawParserSettings {
    /// Allowed field names. Accepts a single string or an array.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub valid_keys: Option<Vec<String>>,
    /// Field applied to keyless terms.
    pub default_key: Option<String>,
    /// Report impossible number and date literals.
    pub strict_literals: Option<bool>,
    /// Leave numeric zero out of the extracted conditions.
    pub drop_zero_values: Option<bool>,
    /// Longest accepted query in characters.
    pub max_query_length: Option<usize>,
}

/// Raw `[filter]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFilterSettings {
    /// Case-sensitive text and regex matching.
    pub case_sensitive: Option<bool>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
