//! Shared helpers for command implementations.

use sift_config::Config;
use sift_query::{ParserConfig, QueryParser};

use crate::cli::args::ParserArgs;

/// Builds the parser configuration, applying CLI overrides to config file values.
///
/// A non-empty `--valid-key` list replaces the configured list; it is never merged.
pub fn parser_config(config: &Config, args: &ParserArgs) -> ParserConfig {
    let mut parser = config.parser_config();
    if !args.valid_keys.is_empty() {
        parser = parser.with_valid_keys(args.valid_keys.iter().cloned());
    }
    if let Some(key) = &args.default_key {
        parser = parser.with_default_key(key.clone());
    }
    if args.strict {
        parser = parser.with_strict_literals(true);
    }
    if let Some(max) = args.max_length {
        parser = parser.with_max_query_length(max);
    }
    parser
}

/// Builds a query parser from config and CLI overrides.
pub fn query_parser(config: &Config, args: &ParserArgs) -> QueryParser {
    QueryParser::new(parser_config(config, args))
}

#[cfg(test)]
mod tests {
    use sift_config::ParserSettings;

    use super::*;

    fn configured() -> Config {
        Config {
            parser: ParserSettings {
                valid_keys: Some(vec!["title".into(), "author".into()]),
                default_key: Some("title".into()),
                ..ParserSettings::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn config_values_without_overrides() {
        let parser = parser_config(&configured(), &ParserArgs::default());
        assert!(parser.accepts_key("author"));
        assert!(!parser.accepts_key("price"));
        assert_eq!(parser.default_key.as_deref(), Some("title"));
        assert!(!parser.strict_literals);
    }

    #[test]
    fn flags_override_config() {
        let args = ParserArgs {
            valid_keys: vec!["price".into()],
            default_key: Some("price".into()),
            strict: true,
            max_length: Some(32),
        };
        let parser = parser_config(&configured(), &args);
        assert!(parser.accepts_key("price"));
        assert!(!parser.accepts_key("title"));
        assert_eq!(parser.default_key.as_deref(), Some("price"));
        assert!(parser.strict_literals);
        assert_eq!(parser.max_query_length, Some(32));
    }
}
