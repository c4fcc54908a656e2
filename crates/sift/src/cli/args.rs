//! Clap argument definitions for the `sift` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Parse search queries and filter JSON records with them")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v for debug logging, -vv for trace logging)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Parser flags that override configuration file values.
#[derive(Args, Debug, Clone, Default)]
pub struct ParserArgs {
    /// Allow only this key (can be specified multiple times)
    #[arg(long = "valid-key", value_name = "KEY")]
    pub valid_keys: Vec<String>,

    /// Key applied to terms written without one
    #[arg(long, value_name = "KEY")]
    pub default_key: Option<String>,

    /// Report number and date literals that do not denote a real value
    #[arg(long)]
    pub strict: bool,

    /// Reject queries longer than this many characters
    #[arg(long, value_name = "CHARS")]
    pub max_length: Option<usize>,
}

/// Arguments for `sift parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Queries to parse; several are combined with OR
    #[arg(required = true)]
    pub queries: Vec<String>,

    #[command(flatten)]
    /// Parser overrides.
    pub parser: ParserArgs,

    /// Output the full parse result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `sift filter`.
#[derive(Args, Debug, Clone)]
pub struct FilterCommand {
    /// Query to apply
    pub query: String,

    /// JSON file holding an array of records [default: stdin]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    /// Parser overrides.
    pub parser: ParserArgs,

    /// Match text and regexes case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Output matching records as a pretty-printed JSON array
    #[arg(long)]
    pub json: bool,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show how a query is tokenized, structured and flattened
    #[command(after_help = "\
QUERY SYNTAX:
  term               Bare word, matched against the default key or any field
  key:term           Keyed word
  \"a phrase\"         Exact phrase, optionally keyed: title:\"the hobbit\"
  /regex/            Regular expression, optionally keyed
  key>10 key<=2024   Numeric and date comparisons (>, <, >=, <=, =, :)
  key:10..20         Inclusive range (numbers or dates)
  -term !term        Negation (NOT as a word)
  a OR b, a | b      Either side
  a AND b, a & b     Both sides (also implied by adjacency)
  (expr) -(expr)     Grouping, optionally negated

Queries starting with '-' must follow '--' so they are not read as flags.

EXAMPLES:
  sift parse 'title:\"the hobbit\" price>=10'
  sift parse -- '-author:rowling fantasy'
  sift parse 'created:2024-01..2024-06 -status:draft'
  sift parse --valid-key title --valid-key author 'author:tolkien year:1937'")]
    Parse(ParseCommand),

    /// Filter and sort a JSON array of records
    #[command(after_help = "\
SORTING:
  asc:field          Sort ascending by field (after filtering)
  desc:field         Sort descending by field
  Several sort markers apply in order; records missing the field sort last.

EXAMPLES:
  sift filter 'author:tolkien desc:price' books.json
  cat books.json | sift filter 'published>=1950 asc:title'")]
    Filter(FilterCommand),

    /// Show discovered configuration files and effective settings
    Config,
}

/// Parses CLI arguments, exiting with usage on error.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_collects_overrides() {
        let cli = Cli::try_parse_from([
            "sift",
            "parse",
            "--valid-key",
            "title",
            "--valid-key",
            "author",
            "--default-key",
            "title",
            "--strict",
            "hobbit",
            "tolkien",
        ])
        .unwrap();
        let Commands::Parse(cmd) = cli.command else {
            panic!("expected parse command");
        };
        assert_eq!(cmd.queries, vec!["hobbit", "tolkien"]);
        assert_eq!(cmd.parser.valid_keys, vec!["title", "author"]);
        assert_eq!(cmd.parser.default_key.as_deref(), Some("title"));
        assert!(cmd.parser.strict);
        assert!(!cmd.json);
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["sift", "filter", "-vv", "x", "books.json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Filter(cmd) = cli.command else {
            panic!("expected filter command");
        };
        assert_eq!(cmd.file, Some(PathBuf::from("books.json")));
    }

    #[test]
    fn parse_requires_a_query() {
        assert!(Cli::try_parse_from(["sift", "parse"]).is_err());
    }
}
