//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single `Config`.

use std::path::PathBuf;

use crate::{
    Config, FilterSettings, ParserSettings,
    parse::{RawConfig, RawFilterSettings, RawParserSettings},
};

/// A parsed config file with its source path.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges configuration files into a single `Config`.
///
/// Configs are given highest precedence first (closest to the working
/// directory). For every setting the first file that defines it wins;
/// `valid_keys` lists are replaced, never unioned.
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    let mut parser = ParserSettings::default();
    let mut filter = FilterSettings::default();

    // Lowest precedence first so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(raw) = &parsed.config.parser {
            apply_raw_parser(&mut parser, raw);
        }
        if let Some(raw) = &parsed.config.filter {
            apply_raw_filter(&mut filter, raw);
        }
    }

    Config { parser, filter }
}

/// Applies raw parser settings, overwriting any present values.
fn apply_raw_parser(result: &mut ParserSettings, raw: &RawParserSettings) {
    if let Some(v) = &raw.valid_keys {
        result.valid_keys = Some(v.clone());
    }
    if let Some(v) = &raw.default_key {
        result.default_key = Some(v.clone());
    }
    if let Some(v) = raw.strict_literals {
        result.strict_literals = v;
    }
    if let Some(v) = raw.drop_zero_values {
        result.drop_zero_values = v;
    }
    if let Some(v) = raw.max_query_length {
        result.max_query_length = Some(v);
    }
}

/// Applies raw filter settings, overwriting any present values.
fn apply_raw_filter(result: &mut FilterSettings, raw: &RawFilterSettings) {
    if let Some(v) = raw.case_sensitive {
        result.case_sensitive = v;
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::parse::parse_config_str;

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config_str(toml, Path::new(path)).unwrap(),
        }
    }

    #[test]
    fn empty_is_default() {
        let config = merge_configs(&[]);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn first_defined_wins() {
        let config = merge_configs(&[
            parsed("/p/a/.sift.toml", "[parser]\ndefault_key = \"title\"\n"),
            parsed(
                "/p/.sift.toml",
                "[parser]\ndefault_key = \"body\"\nstrict_literals = true\n[filter]\ncase_sensitive = true\n",
            ),
        ]);
        assert_eq!(config.parser.default_key.as_deref(), Some("title"));
        assert!(config.parser.strict_literals);
        assert!(config.filter.case_sensitive);
    }

    #[test]
    fn valid_keys_are_replaced_not_unioned() {
        let config = merge_configs(&[
            parsed("/p/a/.sift.toml", "[parser]\nvalid_keys = [\"title\"]\n"),
            parsed("/p/.sift.toml", "[parser]\nvalid_keys = [\"author\", \"price\"]\n"),
        ]);
        assert_eq!(config.parser.valid_keys, Some(vec!["title".to_string()]));
    }

    #[test]
    fn lower_precedence_fills_gaps() {
        let config = merge_configs(&[
            parsed("/p/a/.sift.toml", "[filter]\ncase_sensitive = false\n"),
            parsed("/p/.sift.toml", "[parser]\nmax_query_length = 100\n"),
        ]);
        assert_eq!(config.parser.max_query_length, Some(100));
        assert!(!config.filter.case_sensitive);
    }
}
