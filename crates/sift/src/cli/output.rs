//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use serde::Serialize;
use serde_json::Value;
use sift_query::{AstCondition, ParseResult};

/// Prints any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ExitCode> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        eprintln!("error: failed to serialize JSON: {e}");
        ExitCode::FAILURE
    })?;
    println!("{json}");
    Ok(())
}

/// Prints records one compact JSON object per line.
pub fn print_json_lines(records: &[Value]) {
    for record in records {
        println!("{record}");
    }
}

/// Prints parse errors with a caret under each offending position.
pub fn print_errors(result: &ParseResult) {
    for report in result.error_report() {
        eprintln!("{report}");
    }
}

/// Renders the human-readable view of a parse.
pub fn render_parse_result(result: &ParseResult, verbose: u8) -> String {
    let meta = &result.metadata;
    let mut out = format!("Query: {}\n", meta.original_query);
    if verbose > 0 {
        out.push_str(&format!("Parsed in {:.3} ms\n", meta.parse_time_ms));
    }

    out.push_str(&format!("\nTokens ({}):\n", result.tokens.len()));
    for token in &result.tokens {
        out.push_str(&format!("  {token}\n"));
    }

    out.push_str("\nTree:\n");
    match &result.ast {
        Some(ast) => {
            for line in ast.to_string().lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }
        None => out.push_str("  (empty)\n"),
    }

    out.push_str(&format!(
        "\nConditions ({}):\n",
        result.ast_conditions.len()
    ));
    for condition in &result.ast_conditions {
        out.push_str(&format!("  {}\n", describe_condition(condition)));
    }

    out
}

/// One-line summary of a flattened condition.
fn describe_condition(condition: &AstCondition) -> String {
    let not = if condition.is_negated { "NOT " } else { "" };
    let key = condition.key.as_deref().unwrap_or("*");
    let operator = condition
        .operator
        .map_or_else(|| "~".to_string(), |op| op.to_string());
    let value = if condition.is_regex {
        format!("/{}/", condition.value)
    } else {
        condition.value.to_string()
    };
    format!(
        "{not}{key} {operator} {value}  [{} @{}]",
        condition.token_kind, condition.position
    )
}
