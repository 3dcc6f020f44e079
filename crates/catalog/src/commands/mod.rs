//! Command dispatch: bridges CLI args -> controller intents -> output formatting.

pub mod categories;
pub mod config_cmd;
pub mod items;
pub mod util;

use catalog_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Categories(args) => categories::handle(controller, args, global).await,
        Command::Items(args) => items::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
