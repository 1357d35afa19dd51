//! Remote Store Gateway: typed channel operations over a key-path store.
//!
//! This is the classification boundary. Everything below it speaks raw
//! JSON and transport errors; everything above it sees domain records and
//! the fixed failure taxonomy ([`crate::error::FailureKind`]). Writes are
//! full-value overwrites; dismissing an alert is a delete-by-id, not an
//! overwrite.

use std::sync::Arc;

use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use serde_json::Value;

use robopanel_api::{KeyPathStore, StoreEvent};

use crate::error::CoreError;
use crate::model::{DeviceStatus, DisplayCommand, EmergencyCommand, WarningAlert};

// ── Logical channels ─────────────────────────────────────────────────

/// `DisplayCommand` channel.
pub const COMMANDS_PATH: &str = "iot_commands";
/// `EmergencyCommand` channel.
pub const EMERGENCY_PATH: &str = "emergency_commands";
/// `DeviceStatus` channel.
pub const STATUS_PATH: &str = "device_status";
/// `WarningAlert` collection root; entries live at `warning_alerts/{id}`.
pub const ALERTS_PATH: &str = "warning_alerts";

fn alert_path(id: &str) -> String {
    format!("{ALERTS_PATH}/{id}")
}

// ── Channel events ───────────────────────────────────────────────────

/// One item on a typed subscription stream.
#[derive(Debug)]
pub enum ChannelEvent<T> {
    /// A decoded, contract-valid value.
    Value(T),
    /// The store pushed a value that failed decoding or a domain contract
    /// check. The subscription stays up -- this is not a transport error.
    Corrupt(CoreError),
    /// Classified transport failure. Terminal: the stream is exhausted
    /// after this and must be re-attached by the subscriber.
    Failed(CoreError),
}

// ── Gateway ──────────────────────────────────────────────────────────

/// Typed facade over the key-path store.
///
/// Cheaply cloneable; clones share the underlying store handle.
#[derive(Clone)]
pub struct StoreGateway<S> {
    store: Arc<S>,
}

impl<S: KeyPathStore> StoreGateway<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Overwrite the command channel (last-write-wins).
    pub async fn send_command(&self, command: &DisplayCommand) -> Result<(), CoreError> {
        self.put(COMMANDS_PATH, command).await
    }

    /// Overwrite the emergency channel.
    pub async fn send_emergency(&self, command: &EmergencyCommand) -> Result<(), CoreError> {
        self.put(EMERGENCY_PATH, command).await
    }

    /// Seed the status channel. The device is the sole writer in
    /// production; this exists for tests and bench bring-up.
    pub async fn write_status(&self, status: &DeviceStatus) -> Result<(), CoreError> {
        status.validate()?;
        self.put(STATUS_PATH, status).await
    }

    /// Publish an alert under its id.
    pub async fn raise_alert(&self, alert: &WarningAlert) -> Result<(), CoreError> {
        if alert.id.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "alert id must not be empty".into(),
            });
        }
        self.put(&alert_path(&alert.id), alert).await
    }

    /// Dismiss an alert: delete-by-id against the collection.
    pub async fn dismiss_alert(&self, id: &str) -> Result<(), CoreError> {
        self.store
            .delete(&alert_path(id))
            .await
            .map_err(CoreError::from)
    }

    // ── One-shot reads ──────────────────────────────────────────────

    pub async fn fetch_status(&self) -> Result<DeviceStatus, CoreError> {
        let value = self.store.get(STATUS_PATH).await?;
        let status = decode_or_default::<DeviceStatus>(value)?;
        status.validate()?;
        Ok(status)
    }

    pub async fn fetch_emergency(&self) -> Result<EmergencyCommand, CoreError> {
        let value = self.store.get(EMERGENCY_PATH).await?;
        decode_or_default(value)
    }

    pub async fn fetch_alerts(&self) -> Result<Vec<WarningAlert>, CoreError> {
        let value = self.store.get(ALERTS_PATH).await?;
        Ok(decode_alert_collection(value))
    }

    // ── Subscriptions ───────────────────────────────────────────────

    /// Watch device status. Values are contract-checked; an out-of-range
    /// reading surfaces as [`ChannelEvent::Corrupt`] without tearing the
    /// stream down.
    pub fn watch_status(&self) -> BoxStream<'static, ChannelEvent<DeviceStatus>> {
        typed(self.store.watch(STATUS_PATH), |value| {
            let status = decode_or_default::<DeviceStatus>(value)?;
            status.validate()?;
            Ok(status)
        })
    }

    /// Watch the emergency channel.
    pub fn watch_emergency(&self) -> BoxStream<'static, ChannelEvent<EmergencyCommand>> {
        typed(self.store.watch(EMERGENCY_PATH), decode_or_default)
    }

    /// Watch the command channel (what the device is being told).
    pub fn watch_commands(&self) -> BoxStream<'static, ChannelEvent<DisplayCommand>> {
        typed(self.store.watch(COMMANDS_PATH), decode_or_default)
    }

    /// Watch the alert collection. Every event is the full active set
    /// (`isActive == true` only), never a delta.
    pub fn watch_alerts(&self) -> BoxStream<'static, ChannelEvent<Vec<WarningAlert>>> {
        typed(self.store.watch(ALERTS_PATH), |value| {
            Ok(decode_alert_collection(value))
        })
    }

    async fn put<T: serde::Serialize>(&self, path: &str, record: &T) -> Result<(), CoreError> {
        let value = serde_json::to_value(record).map_err(|e| CoreError::Unknown {
            detail: format!("record serialization failed: {e}"),
        })?;
        self.store.put(path, value).await.map_err(CoreError::from)
    }
}

// ── Decoding helpers ─────────────────────────────────────────────────

/// Decode a channel value, treating `null` as "not yet written" -- the
/// record default, exactly as the device firmware does.
fn decode_or_default<T>(value: Value) -> Result<T, CoreError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| CoreError::InvalidData {
        detail: format!("channel value does not decode: {e}"),
    })
}

/// Flatten the collection object into its active entries. Entries that do
/// not decode are skipped with a warning rather than poisoning the whole
/// snapshot.
fn decode_alert_collection(value: Value) -> Vec<WarningAlert> {
    let Value::Object(entries) = value else {
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|(key, raw)| {
            match serde_json::from_value::<WarningAlert>(raw) {
                Ok(alert) if alert.is_active => Some(alert),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(alert = %key, error = %e, "skipping undecodable alert entry");
                    None
                }
            }
        })
        .collect()
}

fn typed<T, F>(
    inner: BoxStream<'static, StoreEvent>,
    mut decode: F,
) -> BoxStream<'static, ChannelEvent<T>>
where
    T: Send + 'static,
    F: FnMut(Value) -> Result<T, CoreError> + Send + 'static,
{
    Box::pin(inner.map(move |event| match event {
        StoreEvent::Value(value) => match decode(value) {
            Ok(decoded) => ChannelEvent::Value(decoded),
            Err(err) => ChannelEvent::Corrupt(err),
        },
        StoreEvent::Error(err) => ChannelEvent::Failed(CoreError::from(err)),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use robopanel_api::MemoryStore;

    use crate::model::AlertSeverity;

    use super::*;

    fn gateway() -> (Arc<MemoryStore>, StoreGateway<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), StoreGateway::new(store))
    }

    #[tokio::test]
    async fn command_write_lands_on_the_command_channel() {
        let (store, gateway) = gateway();
        let command = DisplayCommand::display_only("HELLO").unwrap();
        gateway.send_command(&command).await.unwrap();

        let stored = store.get(COMMANDS_PATH).await.unwrap();
        assert_eq!(stored["displayText"], "HELLO");
        assert_eq!(stored["buzzerAction"], "off");
    }

    #[tokio::test]
    async fn fetch_status_decodes_null_as_boot_default() {
        let (_, gateway) = gateway();
        let status = gateway.fetch_status().await.unwrap();
        assert_eq!(status, DeviceStatus::default());
    }

    #[tokio::test]
    async fn alert_snapshot_filters_inactive_entries() {
        let (store, gateway) = gateway();
        store
            .put(
                ALERTS_PATH,
                json!({
                    "w1": {"id": "w1", "title": "high water", "severity": "CRITICAL",
                            "isActive": true, "source": "water_sensor"},
                    "w2": {"id": "w2", "title": "resolved", "severity": "INFO",
                            "isActive": false, "source": "system"},
                }),
            )
            .await
            .unwrap();

        let alerts = gateway.fetch_alerts().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "w1");
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[tokio::test]
    async fn dismiss_deletes_only_the_given_id() {
        let (store, gateway) = gateway();
        let a1 = WarningAlert::manual("one", "m", AlertSeverity::Info);
        let a2 = WarningAlert::manual("two", "m", AlertSeverity::Info);
        gateway.raise_alert(&a1).await.unwrap();
        gateway.raise_alert(&a2).await.unwrap();

        gateway.dismiss_alert(&a1.id).await.unwrap();

        let remaining = gateway.fetch_alerts().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, a2.id);
        assert_eq!(store.delete_count(&alert_path(&a1.id)), 1);
    }

    #[tokio::test]
    async fn fetch_emergency_decodes_the_latest_command() {
        let (store, gateway) = gateway();
        store
            .put(
                EMERGENCY_PATH,
                json!({"action": "activate", "adminId": "root",
                        "timestamp": 1_700_000_000_000_i64, "reason": "drill"}),
            )
            .await
            .unwrap();

        let command = gateway.fetch_emergency().await.unwrap();
        assert!(command.action.is_active());
        assert_eq!(command.admin_id, "root");
    }

    #[tokio::test]
    async fn watch_commands_mirrors_what_the_device_is_told() {
        let (_, gateway) = gateway();
        let mut stream = gateway.watch_commands();

        // Untouched channel replays as the default command.
        assert!(matches!(
            stream.next().await.unwrap(),
            ChannelEvent::Value(command) if command == DisplayCommand::default()
        ));

        let sent = DisplayCommand::display_only("FEED ME").unwrap();
        gateway.send_command(&sent).await.unwrap();
        assert!(matches!(
            stream.next().await.unwrap(),
            ChannelEvent::Value(command) if command == sent
        ));
    }

    #[tokio::test]
    async fn watch_status_flags_out_of_range_reading_as_corrupt() {
        let (store, gateway) = gateway();
        let mut stream = gateway.watch_status();

        // Replay of the untouched channel: boot default.
        assert!(matches!(
            stream.next().await.unwrap(),
            ChannelEvent::Value(status) if status == DeviceStatus::default()
        ));

        store
            .put(STATUS_PATH, json!({"isOnline": true, "waterLevel": 2048}))
            .await
            .unwrap();
        assert!(matches!(
            stream.next().await.unwrap(),
            ChannelEvent::Corrupt(CoreError::InvalidData { .. })
        ));

        // The stream survives the corrupt value.
        store
            .put(STATUS_PATH, json!({"isOnline": true, "waterLevel": 512}))
            .await
            .unwrap();
        assert!(matches!(
            stream.next().await.unwrap(),
            ChannelEvent::Value(status) if status.water_level == 512
        ));
    }
}
