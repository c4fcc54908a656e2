//! Diagnostic logging for the CLI.

use std::io;

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "SIFT_LOG";

/// Filter used when `SIFT_LOG` is unset or invalid and no `-v` is given.
const DEFAULT_DIRECTIVE: &str = "warn";

/// Picks the log filter: `-v` and `-vv` win over `SIFT_LOG`.
pub fn filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout stays parseable.
pub fn init(verbose: u8) {
    fmt()
        .with_env_filter(filter(verbose))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_env() {
        assert_eq!(filter(1).to_string(), "debug");
        assert_eq!(filter(2).to_string(), "trace");
        assert_eq!(filter(5).to_string(), "trace");
    }
}
