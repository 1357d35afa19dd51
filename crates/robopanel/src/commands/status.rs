//! Status command handler: one-shot fetch or live session watch.

use chrono::{DateTime, Utc};

use robopanel_core::{DeviceStatus, SessionState};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::config::Panel;
use crate::error::CliError;
use crate::output;

pub async fn handle(panel: &Panel, args: StatusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.watch {
        watch(panel, global).await
    } else {
        let status = panel.sync.gateway().fetch_status().await?;
        let out = output::render_single(&global.output, &status, detail, |s| {
            if s.is_online { "online".into() } else { "offline".into() }
        });
        output::print_output(&out, global.quiet);
        Ok(())
    }
}

/// Attach the synchronizer and print every session-state change until
/// Ctrl-C.
async fn watch(panel: &Panel, global: &GlobalOpts) -> Result<(), CliError> {
    let sync = &panel.sync;
    sync.start().await;
    let mut rx = sync.subscribe();

    output::print_output(&summary(&rx.borrow_and_update().clone()), global.quiet);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                output::print_output(&summary(&state), global.quiet);
            }
        }
    }

    sync.shutdown().await;
    Ok(())
}

fn detail(status: &DeviceStatus) -> String {
    format!(
        "Device:    {}\n\
         Last seen: {}\n\
         Display:   {}\n\
         Buzzer:    {}\n\
         Arduino:   {}\n\
         Emergency: {}\n\
         Water:     {}/1023{}",
        if status.is_online { "online" } else { "offline" },
        format_time(status.last_seen_at),
        if status.current_display_text.is_empty() {
            "(blank)"
        } else {
            &status.current_display_text
        },
        status.buzzer_status,
        if status.arduino_connected { "connected" } else { "disconnected" },
        if status.emergency_active { "ACTIVE" } else { "inactive" },
        status.water_level,
        if status.water_emergency_active {
            " (WATER EMERGENCY)"
        } else {
            ""
        },
    )
}

fn summary(state: &SessionState) -> String {
    let mut line = format!(
        "[{}] device={} water={}/1023 emergency={} alerts={}",
        Utc::now().format("%H:%M:%S"),
        if state.device.is_online { "online" } else { "offline" },
        state.device.water_level,
        if state.effective_emergency() { "ACTIVE" } else { "clear" },
        state.alerts.len(),
    );
    if let Some(ref err) = state.connectivity.last_error {
        line.push_str(&format!(" error={}: {}", err.kind, err.message));
    }
    line
}

fn format_time(at: DateTime<Utc>) -> String {
    if at == DateTime::UNIX_EPOCH {
        "never".into()
    } else {
        at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}
