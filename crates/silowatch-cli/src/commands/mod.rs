//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod alerts;
pub mod codes;
pub mod config_cmd;
pub mod util;

use silowatch_core::ControllerConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Alerts(args) => alerts::handle(config, args, global).await,
        Command::Codes(args) => codes::handle(config, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
