use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AlertSeverity {
    #[default]
    Info,
    Warning,
    Critical,
}

/// Who raised the alert.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertSource {
    WaterSensor,
    Manual,
    #[default]
    System,
}

/// One entry in the `warning_alerts` collection, keyed by `id`.
/// Dismissal is deletion of the record, not a flag flip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarningAlert {
    pub id: String,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub source: AlertSource,
}

impl Default for WarningAlert {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            message: String::new(),
            severity: AlertSeverity::Info,
            created_at: DateTime::UNIX_EPOCH,
            is_active: true,
            source: AlertSource::System,
        }
    }
}

impl WarningAlert {
    /// Operator-raised alert with a fresh unique id.
    pub fn manual(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: AlertSeverity,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
            is_active: true,
            source: AlertSource::Manual,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn severity_and_source_use_the_firmware_spellings() {
        let alert = WarningAlert {
            id: "w1".into(),
            title: "Water level critical".into(),
            message: "Reading 950/1023".into(),
            severity: AlertSeverity::Critical,
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            is_active: true,
            source: AlertSource::WaterSensor,
        };

        let wire = serde_json::to_value(&alert).unwrap();
        assert_eq!(wire["severity"], "CRITICAL");
        assert_eq!(wire["source"], "water_sensor");
        assert_eq!(wire["isActive"], json!(true));
    }

    #[test]
    fn manual_alerts_get_unique_ids() {
        let a = WarningAlert::manual("t", "m", AlertSeverity::Info);
        let b = WarningAlert::manual("t", "m", AlertSeverity::Info);
        assert_ne!(a.id, b.id);
        assert_eq!(a.source, AlertSource::Manual);
        assert!(a.is_active);
    }

    #[test]
    fn severities_order_by_urgency() {
        assert!(AlertSeverity::Critical > AlertSeverity::Warning);
        assert!(AlertSeverity::Warning > AlertSeverity::Info);
    }
}
