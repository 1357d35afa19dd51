//! Canonical domain records.
//!
//! Wire form is camelCase JSON with epoch-millisecond timestamps -- the
//! format the device firmware already reads and writes. Every record
//! tolerates a `null` channel value by decoding to its default (the store
//! replays `null` on attach before the device's first write).

mod alert;
mod command;
mod emergency;
mod status;

pub use alert::{AlertSeverity, AlertSource, WarningAlert};
pub use command::{BuzzerAction, DisplayCommand, MAX_DISPLAY_TEXT};
pub use emergency::{EmergencyAction, EmergencyCommand};
pub use status::{DeviceStatus, WATER_LEVEL_MAX};
