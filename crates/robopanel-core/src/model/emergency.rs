use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AdminId;

/// Emergency channel verbs. `On`/`Activate` and `Off`/`Deactivate` are
/// synonyms the device firmware accepts interchangeably.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmergencyAction {
    On,
    #[default]
    Off,
    Activate,
    Deactivate,
}

impl EmergencyAction {
    /// Whether this verb turns the manual emergency on.
    pub fn is_active(self) -> bool {
        matches!(self, Self::On | Self::Activate)
    }
}

/// Emergency intent, on its own channel so the device services it even
/// when the regular command channel is busy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyCommand {
    pub action: EmergencyAction,
    pub admin_id: String,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub issued_at: DateTime<Utc>,
    pub reason: String,
}

impl Default for EmergencyCommand {
    fn default() -> Self {
        Self {
            action: EmergencyAction::Off,
            admin_id: String::new(),
            issued_at: DateTime::UNIX_EPOCH,
            reason: String::new(),
        }
    }
}

impl EmergencyCommand {
    /// Build a command stamped with the current time. The admin id comes
    /// from an [`crate::auth::AccessPolicy`] authorization, never raw input.
    pub fn new(action: EmergencyAction, admin: &AdminId, reason: impl Into<String>) -> Self {
        Self {
            action,
            admin_id: admin.as_str().to_owned(),
            issued_at: Utc::now(),
            reason: reason.into(),
        }
    }
}
