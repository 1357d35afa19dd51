// ── Session state synchronizer ──
//
// Single owner of `SessionState`. Merges local operator intents, the
// local reachability check, and the three remote subscriptions (status,
// emergency, alerts) into one consistent view, published through a
// `watch` channel. Every mutation is an atomic `send_modify` closure, so
// concurrent pushes and intents can never interleave into a torn read.

use std::sync::Arc;

use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use robopanel_api::{KeyPathStore, NetworkMonitor};

use crate::auth::AccessPolicy;
use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::gateway::{ChannelEvent, StoreGateway};
use crate::model::{DisplayCommand, EmergencyAction, EmergencyCommand, WarningAlert};
use crate::session::SessionState;

// ── Channel lifecycle ────────────────────────────────────────────────

/// The three remote subscriptions the synchronizer manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SyncChannel {
    Status,
    Emergency,
    Alerts,
}

/// Per-channel subscription lifecycle:
/// `Idle → Attaching → Active ⇄ ErrorReported`.
///
/// Values are delivered only while `Attaching` or `Active`; the only exit
/// from `ErrorReported` is an explicit re-attach. `Active → ErrorReported`
/// is triggered solely by a transport-classified failure, never by a
/// valid-but-empty value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelState {
    #[default]
    Idle,
    Attaching,
    Active,
    ErrorReported,
}

#[derive(Debug, Default)]
struct ChannelTable {
    status: ChannelState,
    emergency: ChannelState,
    alerts: ChannelState,
}

impl ChannelTable {
    fn get(&self, channel: SyncChannel) -> ChannelState {
        match channel {
            SyncChannel::Status => self.status,
            SyncChannel::Emergency => self.emergency,
            SyncChannel::Alerts => self.alerts,
        }
    }

    fn set(&mut self, channel: SyncChannel, state: ChannelState) {
        match channel {
            SyncChannel::Status => self.status = state,
            SyncChannel::Emergency => self.emergency = state,
            SyncChannel::Alerts => self.alerts = state,
        }
    }
}

// ── Synchronizer ─────────────────────────────────────────────────────

/// The main entry point for front-ends.
///
/// Cheaply cloneable via `Arc<Inner>`. Construct with [`new`](Self::new),
/// then [`start`](Self::start) to check reachability and attach the
/// remote subscriptions after the settle delay.
#[derive(Clone)]
pub struct Synchronizer<S: KeyPathStore> {
    inner: Arc<Inner<S>>,
}

struct Inner<S: KeyPathStore> {
    gateway: StoreGateway<S>,
    monitor: Arc<dyn NetworkMonitor>,
    policy: Arc<dyn AccessPolicy>,
    config: SyncConfig,
    session: watch::Sender<SessionState>,
    channels: Mutex<ChannelTable>,
    /// Verbatim cache of the last display command that entered the write
    /// path; the single, operator-triggered retry source.
    last_command: Mutex<Option<DisplayCommand>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: KeyPathStore> Synchronizer<S> {
    pub fn new(
        gateway: StoreGateway<S>,
        monitor: Arc<dyn NetworkMonitor>,
        policy: Arc<dyn AccessPolicy>,
        config: SyncConfig,
    ) -> Self {
        let (session, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                gateway,
                monitor,
                policy,
                config,
                session,
                channels: Mutex::new(ChannelTable::default()),
                last_command: Mutex::new(None),
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the underlying gateway (one-shot reads bypass the session).
    pub fn gateway(&self) -> &StoreGateway<S> {
        &self.inner.gateway
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.session.subscribe()
    }

    /// Current session state snapshot.
    pub fn snapshot(&self) -> SessionState {
        self.inner.session.borrow().clone()
    }

    /// Current lifecycle state of a subscription channel.
    pub async fn channel_state(&self, channel: SyncChannel) -> ChannelState {
        self.inner.channels.lock().await.get(channel)
    }

    // ── Startup sequencing ───────────────────────────────────────────

    /// Check local reachability, wait out the settle delay, then attach
    /// all three subscriptions. Attaching is idempotent per channel.
    pub async fn start(&self) {
        self.refresh_connectivity().await;
        // Let the transport finish establishing before reconciling
        // against it.
        tokio::time::sleep(self.inner.config.settle_delay).await;

        self.start_observing_status().await;
        self.start_observing_emergency().await;
        self.start_observing_alerts().await;
        info!("session synchronizer started");
    }

    /// Re-run the local reachability check and fold the result into state.
    /// Only a confirmed loss of network marks the device offline, and only
    /// once status observation has begun.
    pub async fn refresh_connectivity(&self) -> bool {
        let available = self.inner.monitor.is_network_available();
        let status_started =
            self.inner.channels.lock().await.get(SyncChannel::Status) != ChannelState::Idle;

        self.inner.session.send_modify(|state| {
            state.connectivity.network_available = available;
            if !available && status_started {
                state.device.is_online = false;
            }
        });
        debug!(available, "local reachability check");
        available
    }

    /// Attach the device-status subscription. No-op while already
    /// attaching or active.
    pub async fn start_observing_status(&self) {
        if !self.try_attach(SyncChannel::Status).await {
            return;
        }
        let stream = self.inner.gateway.watch_status();
        self.spawn_channel_loop(SyncChannel::Status, stream, SessionState::apply_status)
            .await;
    }

    /// Attach the emergency subscription. No-op while already attaching
    /// or active.
    pub async fn start_observing_emergency(&self) {
        if !self.try_attach(SyncChannel::Emergency).await {
            return;
        }
        let stream = self.inner.gateway.watch_emergency();
        self.spawn_channel_loop(SyncChannel::Emergency, stream, SessionState::apply_emergency)
            .await;
    }

    /// Attach the alert-collection subscription. No-op while already
    /// attaching or active.
    pub async fn start_observing_alerts(&self) {
        if !self.try_attach(SyncChannel::Alerts).await {
            return;
        }
        let stream = self.inner.gateway.watch_alerts();
        self.spawn_channel_loop(SyncChannel::Alerts, stream, SessionState::apply_alerts)
            .await;
    }

    /// Re-attach every channel currently in `ErrorReported` (active ones
    /// are left alone).
    pub async fn restart_observers(&self) {
        self.refresh_connectivity().await;
        self.start_observing_status().await;
        self.start_observing_emergency().await;
        self.start_observing_alerts().await;
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Validate and send a display/buzzer command.
    ///
    /// The command is cached for [`retry_last_command`](Self::retry_last_command)
    /// as soon as it passes validation -- before the outcome of this
    /// attempt is known. The reachability precheck rejects without any
    /// remote call.
    pub async fn send_display_command(&self, command: DisplayCommand) -> Result<(), CoreError> {
        command.validate()?;
        *self.inner.last_command.lock().await = Some(command.clone());

        self.check_reachable()?;

        self.inner.session.send_modify(|state| {
            state.pending_intent = Some(command.clone());
            state.write_in_flight = true;
            state.connectivity.last_error = None;
        });

        match self.inner.gateway.send_command(&command).await {
            Ok(()) => {
                debug!(text = %command.display_text, buzzer = %command.buzzer_action, "command sent");
                self.inner.session.send_modify(|state| {
                    state.write_in_flight = false;
                    state.pending_intent = None;
                    state.connectivity.backend_reachable = true;
                });
                Ok(())
            }
            Err(err) => {
                warn!(kind = %err.kind(), "command write failed");
                self.inner.session.send_modify(|state| {
                    state.write_in_flight = false;
                    state.connectivity.backend_reachable = false;
                    state.record_error(&err);
                });
                Err(err)
            }
        }
    }

    /// Replay the cached last command through the normal write path,
    /// reachability precheck included. The only retry mechanism -- there
    /// is no automatic backoff or queue.
    pub async fn retry_last_command(&self) -> Result<(), CoreError> {
        let cached = self.inner.last_command.lock().await.clone();
        match cached {
            Some(command) => self.send_display_command(command).await,
            None => Err(CoreError::ValidationFailed {
                message: "no display command to retry".into(),
            }),
        }
    }

    /// Activate the manual emergency as `admin_id`.
    pub async fn activate_emergency(
        &self,
        admin_id: &str,
        reason: Option<String>,
    ) -> Result<(), CoreError> {
        self.send_emergency_action(EmergencyAction::Activate, admin_id, reason)
            .await
    }

    /// Deactivate the manual emergency as `admin_id`. The water-triggered
    /// flag is the device's alone; this cannot clear it.
    pub async fn deactivate_emergency(
        &self,
        admin_id: &str,
        reason: Option<String>,
    ) -> Result<(), CoreError> {
        self.send_emergency_action(EmergencyAction::Deactivate, admin_id, reason)
            .await
    }

    async fn send_emergency_action(
        &self,
        action: EmergencyAction,
        admin_id: &str,
        reason: Option<String>,
    ) -> Result<(), CoreError> {
        let admin = self.inner.policy.authorize(admin_id)?;
        // Precondition failures must not flip the optimistic flag.
        self.check_reachable()?;

        let reason = reason.unwrap_or_else(|| default_reason(action));
        let command = EmergencyCommand::new(action, &admin, reason.clone());
        let active = action.is_active();

        // Optimistic flip for responsiveness. On failure the flag is left
        // as-is: reverting could mask an emergency that is still active on
        // the device independent of this failed write. The next remote
        // push corrects it either way.
        self.inner.session.send_modify(|state| {
            state.emergency.manual_active = active;
            state.emergency.reason = reason;
            state.write_in_flight = true;
            state.connectivity.last_error = None;
        });

        match self.inner.gateway.send_emergency(&command).await {
            Ok(()) => {
                info!(%action, admin = admin.as_str(), "emergency command sent");
                self.inner.session.send_modify(|state| {
                    state.write_in_flight = false;
                    state.connectivity.backend_reachable = true;
                    state.emergency.last_command = Some(command);
                });
                Ok(())
            }
            Err(err) => {
                warn!(%action, kind = %err.kind(), "emergency command failed");
                self.inner.session.send_modify(|state| {
                    state.write_in_flight = false;
                    state.connectivity.backend_reachable = false;
                    state.record_error(&err);
                });
                Err(err)
            }
        }
    }

    /// Dismiss an alert by id. Fire-and-forget: the alert stays in local
    /// state until the next snapshot omits it, so the view never shows it
    /// gone before the remote truth agrees.
    pub async fn dismiss_alert(&self, id: &str) -> Result<(), CoreError> {
        self.check_reachable()?;
        match self.inner.gateway.dismiss_alert(id).await {
            Ok(()) => {
                debug!(alert = id, "alert dismissed");
                Ok(())
            }
            Err(err) => {
                warn!(alert = id, kind = %err.kind(), "alert dismissal failed");
                self.inner
                    .session
                    .send_modify(|state| state.record_error(&err));
                Err(err)
            }
        }
    }

    /// Publish an operator-raised alert.
    pub async fn raise_alert(&self, alert: WarningAlert) -> Result<(), CoreError> {
        self.check_reachable()?;
        match self.inner.gateway.raise_alert(&alert).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.inner
                    .session
                    .send_modify(|state| state.record_error(&err));
                Err(err)
            }
        }
    }

    /// Drop the retained error message.
    pub fn clear_error(&self) {
        self.inner
            .session
            .send_modify(|state| state.connectivity.last_error = None);
    }

    /// Cancel the subscription tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut tasks = self.inner.tasks.lock().await;
        for task in tasks.drain(..) {
            let _ = task.await;
        }
        debug!("session synchronizer stopped");
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Reachability precheck shared by every write path. A failure is
    /// recorded and returned before any remote call is attempted.
    fn check_reachable(&self) -> Result<(), CoreError> {
        if self.inner.monitor.is_network_available() {
            self.inner
                .session
                .send_modify(|state| state.connectivity.network_available = true);
            Ok(())
        } else {
            let err = CoreError::Unreachable;
            self.inner.session.send_modify(|state| {
                state.connectivity.network_available = false;
                state.record_error(&err);
            });
            Err(err)
        }
    }

    /// Guard a channel attach. Returns `false` (caller must not attach)
    /// when the channel is already attaching or active.
    async fn try_attach(&self, channel: SyncChannel) -> bool {
        let mut table = self.inner.channels.lock().await;
        match table.get(channel) {
            ChannelState::Attaching | ChannelState::Active => {
                debug!(%channel, "observer already running");
                false
            }
            ChannelState::Idle | ChannelState::ErrorReported => {
                table.set(channel, ChannelState::Attaching);
                true
            }
        }
    }

    /// Drive one subscription until cancellation or its terminal error.
    async fn spawn_channel_loop<T, F>(
        &self,
        channel: SyncChannel,
        mut stream: BoxStream<'static, ChannelEvent<T>>,
        mut apply: F,
    ) where
        T: Send + 'static,
        F: FnMut(&mut SessionState, T) + Send + 'static,
    {
        // The stream handle exists, so the subscription is attached;
        // record that before the loop task ever runs.
        self.inner
            .channels
            .lock()
            .await
            .set(channel, ChannelState::Active);
        debug!(%channel, "observer attached");

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = inner.cancel.cancelled() => {
                        inner.channels.lock().await.set(channel, ChannelState::Idle);
                        return;
                    }
                    event = stream.next() => match event {
                        Some(ChannelEvent::Value(value)) => {
                            inner.session.send_modify(|state| apply(state, value));
                        }
                        Some(ChannelEvent::Corrupt(err)) => {
                            // Data-integrity failure: recorded, but not a
                            // transport error, so the subscription stays up.
                            warn!(%channel, error = %err, "corrupt value on channel");
                            inner.session.send_modify(|state| state.record_error(&err));
                        }
                        Some(ChannelEvent::Failed(err)) => {
                            handle_channel_failure(&inner, channel, err).await;
                            return;
                        }
                        None => {
                            inner.channels.lock().await.set(channel, ChannelState::ErrorReported);
                            return;
                        }
                    }
                }
            }
        });
        self.inner.tasks.lock().await.push(handle);
    }
}

/// Record a terminal subscription failure and park the channel in
/// `ErrorReported`.
///
/// The gateway never classifies a remote failure as `Unreachable`; that
/// verdict comes from re-checking the local monitor here. Only that
/// confirmed loss of network may force `is_online` false -- a permission
/// or backend error says nothing about the physical device.
async fn handle_channel_failure<S: KeyPathStore>(
    inner: &Inner<S>,
    channel: SyncChannel,
    err: CoreError,
) {
    let unreachable = !inner.monitor.is_network_available();
    let err = if unreachable { CoreError::Unreachable } else { err };
    warn!(%channel, kind = %err.kind(), "subscription failed; re-attach required");

    // Park the channel before publishing the error, so an observer woken
    // by the state change can immediately re-attach.
    inner
        .channels
        .lock()
        .await
        .set(channel, ChannelState::ErrorReported);

    inner.session.send_modify(|state| {
        state.connectivity.backend_reachable = false;
        if unreachable {
            state.connectivity.network_available = false;
            if channel == SyncChannel::Status {
                state.device.is_online = false;
            }
        }
        state.record_error(&err);
    });
}

fn default_reason(action: EmergencyAction) -> String {
    if action.is_active() {
        "Manual emergency activated from the control panel".into()
    } else {
        "Manual emergency deactivated from the control panel".into()
    }
}
