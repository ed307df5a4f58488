//! Command dispatch: routes parsed CLI commands to handler functions.

pub mod codes;
pub mod config_cmd;
pub mod redeem;
pub mod util;

use promokit_core::DeskConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that talks to the collaborators.
pub async fn dispatch(
    cmd: Command,
    config: &DeskConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Codes(args) => codes::handle(args, config, global).await,
        Command::Redeem(args) => redeem::handle(args, config, global).await,
        // Handled in main before a DeskConfig exists.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
