//! Buzzer command handler.

use robopanel_core::{BuzzerAction, DisplayCommand};

use crate::cli::{BuzzerArgs, GlobalOpts};
use crate::config::Panel;
use crate::error::CliError;

pub async fn handle(panel: &Panel, args: BuzzerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let action = BuzzerAction::from(args.action);
    let command = DisplayCommand::buzzer_only(action, args.duration_ms)?;
    panel.sync.send_display_command(command).await?;

    if !global.quiet {
        eprintln!("Buzzer command sent ({action}, {} ms).", args.duration_ms);
    }
    Ok(())
}
