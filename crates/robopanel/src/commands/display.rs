//! Display command handler.

use robopanel_core::DisplayCommand;

use crate::cli::{DisplayArgs, GlobalOpts};
use crate::config::Panel;
use crate::error::CliError;

pub async fn handle(panel: &Panel, args: DisplayArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let command = DisplayCommand::new(args.text, args.buzzer.into(), args.duration_ms)?;
    panel.sync.send_display_command(command).await?;

    if !global.quiet {
        eprintln!("Command sent. The device should update shortly.");
    }
    Ok(())
}
