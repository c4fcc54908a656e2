//! Command implementations and dispatch.

pub mod config;
pub mod filter;
pub mod parse;
mod shared;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext, verbose: u8) -> ExitCode {
    match command {
        Commands::Parse(cmd) => parse::run(ctx, &cmd, verbose),
        Commands::Filter(cmd) => filter::run(ctx, &cmd),
        Commands::Config => config::run(ctx),
    }
}
