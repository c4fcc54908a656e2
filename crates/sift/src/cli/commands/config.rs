//! Implementation of `sift config`.

use std::process::ExitCode;

use sift_config::{discover_config_files, is_global_config};

use crate::cli::context::CommandContext;

/// Shows discovered config files, warnings and the effective settings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let files = discover_config_files(&ctx.cwd);

    if files.is_empty() {
        println!("# No configuration files found; using defaults.");
    } else {
        println!("# Config files (highest precedence first):");
        for path in &files {
            let scope = if is_global_config(path) { " (global)" } else { "" };
            println!("#   {}{scope}", path.display());
        }
    }

    for warning in ctx.config.validate() {
        eprintln!("warning: {warning}");
    }

    match ctx.config.settings_to_toml() {
        Ok(toml) => {
            println!();
            print!("{toml}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
