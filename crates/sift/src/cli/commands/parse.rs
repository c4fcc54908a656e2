//! Implementation of `sift parse`.

use std::process::ExitCode;

use tracing::debug;

use super::shared::query_parser;
use crate::cli::{args::ParseCommand, context::CommandContext, output};

/// Parses the given queries and shows tokens, tree, conditions and errors.
///
/// Exits with failure when the parse recorded any error.
pub fn run(ctx: &CommandContext, cmd: &ParseCommand, verbose: u8) -> ExitCode {
    let query = combine_queries(&cmd.queries);
    debug!(queries = cmd.queries.len(), %query, "parsing");

    let result = query_parser(&ctx.config, &cmd.parser).parse(&query);

    if cmd.json {
        if let Err(code) = output::print_json(&result) {
            return code;
        }
    } else {
        print!("{}", output::render_parse_result(&result, verbose));
        output::print_errors(&result);
    }

    if result.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Joins several queries into one disjunction, each wrapped in a group.
fn combine_queries(queries: &[String]) -> String {
    match queries {
        [single] => single.clone(),
        _ => queries
            .iter()
            .map(|q| format!("({q})"))
            .collect::<Vec<_>>()
            .join(" OR "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_query_is_unchanged() {
        assert_eq!(combine_queries(&["a b".into()]), "a b");
    }

    #[test]
    fn several_queries_become_a_disjunction() {
        assert_eq!(
            combine_queries(&["title:hobbit".into(), "author:tolkien price<10".into()]),
            "(title:hobbit) OR (author:tolkien price<10)"
        );
    }
}
