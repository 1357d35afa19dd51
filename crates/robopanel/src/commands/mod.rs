//! Command handlers, one module per command area.

pub mod alerts;
pub mod buzzer;
pub mod config_cmd;
pub mod display;
pub mod emergency;
pub mod status;

use crate::cli::{Command, GlobalOpts};
use crate::config::Panel;
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Command, panel: &Panel, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        Command::Display(args) => display::handle(panel, args, global).await,
        Command::Buzzer(args) => buzzer::handle(panel, args, global).await,
        Command::Emergency(args) => emergency::handle(panel, args, global).await,
        Command::Status(args) => status::handle(panel, args, global).await,
        Command::Alerts(args) => alerts::handle(panel, args, global).await,
        // Handled in `run` before a panel is built.
        Command::Config(_) | Command::Completions(_) => unreachable!("dispatched earlier"),
    }
}
