use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The device's LCD is a 2x16 character panel; two rows is the hard cap.
pub const MAX_DISPLAY_TEXT: usize = 32;

/// What the buzzer should do when the command lands.
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
pub enum BuzzerAction {
    #[default]
    Off,
    On,
    Beep,
    Pattern,
    Alarm,
    Siren,
}

/// Display/buzzer intent sent to the device.
///
/// Write-only: the channel holds only the latest command (last-write-wins
/// at the store), so there is no identity beyond the channel path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayCommand {
    pub display_text: String,
    pub buzzer_action: BuzzerAction,
    /// Buzzer run time in milliseconds.
    #[serde(rename = "buzzerDuration")]
    pub buzzer_duration_ms: u32,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub issued_at: DateTime<Utc>,
}

impl Default for DisplayCommand {
    fn default() -> Self {
        Self {
            display_text: String::new(),
            buzzer_action: BuzzerAction::Off,
            buzzer_duration_ms: 0,
            issued_at: DateTime::UNIX_EPOCH,
        }
    }
}

impl DisplayCommand {
    /// Build a validated command stamped with the current time.
    pub fn new(
        display_text: impl Into<String>,
        buzzer_action: BuzzerAction,
        buzzer_duration_ms: u32,
    ) -> Result<Self, CoreError> {
        let command = Self {
            display_text: display_text.into(),
            buzzer_action,
            buzzer_duration_ms,
            issued_at: Utc::now(),
        };
        command.validate()?;
        Ok(command)
    }

    /// Text-only command (buzzer stays off).
    pub fn display_only(text: impl Into<String>) -> Result<Self, CoreError> {
        Self::new(text, BuzzerAction::Off, 0)
    }

    /// Buzzer-only command (display untouched by the device).
    pub fn buzzer_only(action: BuzzerAction, duration_ms: u32) -> Result<Self, CoreError> {
        Self::new(String::new(), action, duration_ms)
    }

    /// Local validation, applied before any remote call.
    pub fn validate(&self) -> Result<(), CoreError> {
        let chars = self.display_text.chars().count();
        if chars > MAX_DISPLAY_TEXT {
            return Err(CoreError::ValidationFailed {
                message: format!(
                    "display text is {chars} characters; the panel fits {MAX_DISPLAY_TEXT}"
                ),
            });
        }
        Ok(())
    }
}
