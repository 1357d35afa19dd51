use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Upper bound of the water sensor's ADC reading.
pub const WATER_LEVEL_MAX: u16 = 1023;

/// Device-reported truth, mirrored read-only into session state.
///
/// The device is the sole writer in production; the panel writes this
/// channel only to seed a fresh store for tests or bench bring-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)] // mirrors the device wire record
pub struct DeviceStatus {
    pub is_online: bool,
    #[serde(rename = "lastSeen", with = "chrono::serde::ts_milliseconds")]
    pub last_seen_at: DateTime<Utc>,
    pub current_display_text: String,
    pub buzzer_status: String,
    pub arduino_connected: bool,
    pub emergency_active: bool,
    /// Raw ADC reading, 0..=1023.
    pub water_level: u16,
    /// Sensor-triggered emergency, independent of the manual flag.
    pub water_emergency_active: bool,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self {
            is_online: false,
            last_seen_at: DateTime::UNIX_EPOCH,
            current_display_text: String::new(),
            buzzer_status: "off".into(),
            arduino_connected: false,
            emergency_active: false,
            water_level: 0,
            water_emergency_active: false,
        }
    }
}

impl DeviceStatus {
    /// Contract check on device-reported data. An out-of-range reading is
    /// a data-integrity error, never silently clamped.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.water_level > WATER_LEVEL_MAX {
            return Err(CoreError::InvalidData {
                detail: format!(
                    "water level {} exceeds the sensor range 0..={WATER_LEVEL_MAX}",
                    self.water_level
                ),
            });
        }
        Ok(())
    }
}
