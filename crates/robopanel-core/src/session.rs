//! The one session-state value the synchronizer owns and publishes.
//!
//! Everything here is derived: rebuilt from remote pushes and local
//! intents, never persisted. Merge methods encode the precedence rules --
//! remote truth always wins once it arrives; local optimism is a
//! temporary placeholder until then.

use indexmap::IndexMap;

use crate::error::{CoreError, FailureKind};
use crate::model::{DeviceStatus, DisplayCommand, EmergencyCommand, WarningAlert};

/// A classified failure retained for display: machine-readable kind plus
/// the operator-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&CoreError> for ErrorInfo {
    fn from(err: &CoreError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Local-network and store-connection health.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connectivity {
    /// Last local reachability check (validated internet, not interface
    /// presence).
    pub network_available: bool,
    /// Whether the store last responded/pushed successfully.
    pub backend_reachable: bool,
    /// Retained until cleared or superseded by a newer failure.
    pub last_error: Option<ErrorInfo>,
}

/// Emergency view over both trigger sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyView {
    /// Operator-triggered flag: optimistic on write, authoritative once
    /// the emergency channel pushes.
    pub manual_active: bool,
    /// Sensor-triggered flag, mirrored from device status.
    pub water_active: bool,
    /// Reason attached to the next manual action.
    pub reason: String,
    pub last_command: Option<EmergencyCommand>,
}

impl EmergencyView {
    /// `manual OR water`, computed on demand -- never stored, so the two
    /// flags can never disagree with their disjunction.
    pub fn effective_active(&self) -> bool {
        self.manual_active || self.water_active
    }
}

/// The complete operator-facing session view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub connectivity: Connectivity,
    /// Latest device-reported status, replaced wholesale on every push.
    pub device: DeviceStatus,
    pub emergency: EmergencyView,
    /// Last display command that entered the write path; the retry cache.
    pub pending_intent: Option<DisplayCommand>,
    /// A write is on the wire. Cleared when the write call itself
    /// resolves, not when the subscription echoes it back.
    pub write_in_flight: bool,
    /// Active alerts keyed by id, in snapshot order.
    pub alerts: IndexMap<String, WarningAlert>,
}

impl SessionState {
    pub fn effective_emergency(&self) -> bool {
        self.emergency.effective_active()
    }

    pub fn active_alerts(&self) -> impl Iterator<Item = &WarningAlert> {
        self.alerts.values()
    }

    // ── Merge rules (remote precedence) ─────────────────────────────

    /// A status push replaces the device portion wholesale and proves the
    /// backend healthy.
    pub(crate) fn apply_status(&mut self, status: DeviceStatus) {
        self.emergency.water_active = status.water_emergency_active;
        self.device = status;
        self.connectivity.backend_reachable = true;
        self.connectivity.last_error = None;
    }

    /// An emergency push is authoritative: it supersedes any optimistic
    /// flag the write path set in the meantime.
    pub(crate) fn apply_emergency(&mut self, command: EmergencyCommand) {
        self.emergency.manual_active = command.action.is_active();
        self.emergency.last_command = Some(command);
    }

    /// An alert push is a full snapshot replacement, never a delta.
    pub(crate) fn apply_alerts(&mut self, alerts: Vec<WarningAlert>) {
        self.alerts = alerts
            .into_iter()
            .map(|alert| (alert.id.clone(), alert))
            .collect();
    }

    pub(crate) fn record_error(&mut self, err: &CoreError) {
        self.connectivity.last_error = Some(ErrorInfo::from(err));
    }
}
