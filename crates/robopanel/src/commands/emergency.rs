//! Emergency command handlers.
//!
//! The safety banners are deliberately loud: a failed emergency write
//! means the device may not respond, and the operator needs to know that
//! immediately.

use owo_colors::OwoColorize;

use crate::cli::{EmergencyArgs, EmergencyCommand, GlobalOpts};
use crate::config::Panel;
use crate::error::CliError;
use crate::output;

pub async fn handle(panel: &Panel, args: EmergencyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let admin = panel.require_admin()?.to_owned();
    let color = output::should_color(&global.color);

    match args.command {
        EmergencyCommand::Activate { reason } => {
            if let Err(err) = panel.sync.activate_emergency(&admin, reason).await {
                banner(
                    color,
                    true,
                    "EMERGENCY COMMAND FAILED -- the device may not respond. \
                     Check your connection and retry immediately.",
                );
                return Err(err.into());
            }
            banner(
                color,
                true,
                "EMERGENCY ACTIVATED -- LED and siren are now active on the device.",
            );
        }
        EmergencyCommand::Deactivate { reason } => {
            if let Err(err) = panel.sync.deactivate_emergency(&admin, reason).await {
                banner(
                    color,
                    true,
                    "EMERGENCY COMMAND FAILED -- the emergency may still be active. \
                     Check your connection and retry immediately.",
                );
                return Err(err.into());
            }
            banner(color, false, "Emergency deactivated.");
            if panel.sync.snapshot().emergency.water_active {
                eprintln!("Note: the water-sensor emergency is still active on the device.");
            }
        }
    }
    Ok(())
}

fn banner(color: bool, urgent: bool, message: &str) {
    if color && urgent {
        eprintln!("{}", message.red().bold());
    } else if color {
        eprintln!("{}", message.green());
    } else {
        eprintln!("{message}");
    }
}
