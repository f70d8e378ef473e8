//! Command dispatch: bridges CLI args -> fleet operations -> output formatting.

pub mod hosts;
pub mod monitor;
pub mod stats;
pub mod torrents;
pub mod util;

use crate::AppContext;
use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a fleet-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Hosts(args) => hosts::handle(ctx, args, global).await,
        Command::Torrents(args) => torrents::handle(ctx, args, global).await,
        Command::Stats => stats::handle(ctx, global).await,
        Command::Monitor(args) => monitor::handle(ctx, args, global).await,
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}
