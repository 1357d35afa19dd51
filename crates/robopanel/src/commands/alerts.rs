//! Alert command handlers.

use tabled::Tabled;

use robopanel_core::WarningAlert;

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts};
use crate::config::Panel;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Raised")]
    raised: String,
}

impl From<&WarningAlert> for AlertRow {
    fn from(alert: &WarningAlert) -> Self {
        Self {
            id: alert.id.clone(),
            severity: alert.severity.to_string(),
            title: alert.title.clone(),
            source: alert.source.to_string(),
            raised: alert.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(panel: &Panel, args: AlertsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AlertsCommand::List => {
            let alerts = panel.sync.gateway().fetch_alerts().await?;
            let out = output::render_list(
                &global.output,
                &alerts,
                |a| AlertRow::from(a),
                |a| a.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Dismiss { id } => {
            panel.sync.dismiss_alert(&id).await?;
            if !global.quiet {
                eprintln!("Alert '{id}' dismissed; it leaves listings once the store confirms.");
            }
            Ok(())
        }

        AlertsCommand::Raise {
            title,
            message,
            severity,
        } => {
            let alert = WarningAlert::manual(title, message, severity.into());
            let id = alert.id.clone();
            panel.sync.raise_alert(alert).await?;
            if !global.quiet {
                eprintln!("Alert raised with id {id}");
            }
            Ok(())
        }
    }
}
