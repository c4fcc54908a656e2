//! Implementation of `sift filter`.

use std::{
    fs,
    io::{self, Read},
    path::Path,
    process::ExitCode,
};

use serde_json::Value;
use sift_filter::{FilterOptions, RecordFilter};
use tracing::{debug, warn};

use super::shared::query_parser;
use crate::cli::{args::FilterCommand, context::CommandContext, output};

/// Filters and sorts JSON records read from a file or stdin.
///
/// Parse errors are reported as warnings; the recoverable remainder of the
/// query is still applied.
pub fn run(ctx: &CommandContext, cmd: &FilterCommand) -> ExitCode {
    let result = query_parser(&ctx.config, &cmd.parser).parse(&cmd.query);
    if result.has_errors() {
        warn!(errors = result.metadata.errors.len(), "query has errors");
        output::print_errors(&result);
    }

    let options = FilterOptions {
        case_sensitive: cmd.case_sensitive || ctx.config.filter.case_sensitive,
    };
    let filter = match RecordFilter::new(&result, options) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let input = match read_input(cmd.file.as_deref()) {
        Ok(input) => input,
        Err(code) => return code,
    };

    let records = match filter.apply_json(input) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!(matched = records.len(), "filter complete");

    if cmd.json {
        if let Err(code) = output::print_json(&records) {
            return code;
        }
    } else {
        output::print_json_lines(&records);
    }
    ExitCode::SUCCESS
}

/// Reads and decodes the JSON input, exiting with an error message on failure.
fn read_input(file: Option<&Path>) -> Result<Value, ExitCode> {
    let (source, text) = match file {
        Some(path) => (
            path.display().to_string(),
            fs::read_to_string(path).map_err(|e| {
                eprintln!("error: failed to read {}: {e}", path.display());
                ExitCode::FAILURE
            })?,
        ),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(|e| {
                eprintln!("error: failed to read stdin: {e}");
                ExitCode::FAILURE
            })?;
            ("stdin".to_string(), text)
        }
    };

    serde_json::from_str(&text).map_err(|e| {
        eprintln!("error: invalid JSON in {source}: {e}");
        ExitCode::FAILURE
    })
}
