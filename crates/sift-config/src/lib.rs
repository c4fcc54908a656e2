//! Configuration system for sift.
//!
//! sift uses TOML configuration files named `.sift.toml`. Configuration is resolved by walking
//! up the directory tree from the current working directory, collecting any `.sift.toml` files
//! found, then loading `~/.sift.toml` as the global config with lowest precedence.
//!
//! ```toml
//! root = true
//!
//! [parser]
//! valid_keys = ["title", "author", "created", "price", "asc", "desc"]
//! default_key = "title"
//! strict_literals = false
//! drop_zero_values = false
//! max_query_length = 4096
//!
//! [filter]
//! case_sensitive = false
//! ```

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod validate;

use std::path::{Path, PathBuf};

pub use discovery::{
    CONFIG_FILENAME, discover_config_files, discover_with_global, global_config_path,
    is_global_config,
};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawFilterSettings, RawParserSettings, is_root_config, parse_config_file,
    parse_config_str,
};
use serde::{Deserialize, Serialize};
use sift_filter::FilterOptions;
use sift_query::ParserConfig;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Merged configuration for sift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Query parser settings.
    pub parser: ParserSettings,
    /// Record filter settings.
    pub filter: FilterSettings,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.sift.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// Builds the query parser configuration.
    pub fn parser_config(&self) -> ParserConfig {
        let parser = &self.parser;
        ParserConfig {
            valid_keys: parser
                .valid_keys
                .as_ref()
                .map(|keys| keys.iter().cloned().collect()),
            default_key: parser.default_key.clone(),
            strict_literals: parser.strict_literals,
            drop_zero_values: parser.drop_zero_values,
            max_query_length: parser.max_query_length,
        }
    }

    /// Builds the record filter options.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            case_sensitive: self.filter.case_sensitive,
        }
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML, in the same shape as a `.sift.toml` file.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            parser: self.parser.clone(),
            filter: self.filter.clone(),
        };
        toml::to_string_pretty(&serializable).map_err(|source| ConfigError::SerializeToml { source })
    }
}

/// Query parser settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Allowed field names; `None` allows every key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_keys: Option<Vec<String>>,
    /// Field applied to keyless terms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_key: Option<String>,
    /// Report impossible number and date literals.
    pub strict_literals: bool,
    /// Leave numeric zero out of the extracted conditions.
    pub drop_zero_values: bool,
    /// Longest accepted query in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_query_length: Option<usize>,
}

/// Record filter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Case-sensitive text and regex matching.
    pub case_sensitive: bool,
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings {
    /// Query parser settings.
    parser: ParserSettings,
    /// Record filter settings.
    filter: FilterSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.parser.valid_keys.is_none());
        assert!(!config.parser.strict_literals);
        assert!(!config.filter.case_sensitive);
        assert!(!config.parser.drop_zero_values);
    }

    #[test]
    fn parser_config_conversion() {
        let config = Config {
            parser: ParserSettings {
                valid_keys: Some(vec!["title".into(), "author".into()]),
                default_key: Some("title".into()),
                strict_literals: true,
                drop_zero_values: true,
                max_query_length: Some(64),
            },
            ..Config::default()
        };
        let parser = config.parser_config();
        assert!(parser.accepts_key("author"));
        assert!(!parser.accepts_key("price"));
        assert_eq!(parser.default_key.as_deref(), Some("title"));
        assert!(parser.strict_literals);
        assert!(parser.drop_zero_values);
        assert_eq!(parser.max_query_length, Some(64));
    }

    #[test]
    fn settings_to_toml() {
        let config = Config {
            parser: ParserSettings {
                default_key: Some("title".into()),
                ..ParserSettings::default()
            },
            ..Config::default()
        };
        let toml = config.settings_to_toml().unwrap();

        assert!(toml.contains("[parser]"));
        assert!(toml.contains("[filter]"));
        assert!(toml.contains("default_key = \"title\""));
        assert!(toml.contains("case_sensitive = false"));
        assert!(!toml.contains("valid_keys"));

        let reparsed = parse_config_str(&toml, Path::new("roundtrip.toml")).unwrap();
        assert_eq!(
            reparsed.parser.and_then(|p| p.default_key).as_deref(),
            Some("title")
        );
    }
}
