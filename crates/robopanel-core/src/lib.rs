//! Reactive session layer between `robopanel-api` and UI consumers.
//!
//! This crate owns the domain model and the state-synchronization core of
//! the robopanel workspace:
//!
//! - **[`Synchronizer`]** — Central facade managing the session lifecycle:
//!   [`start()`](Synchronizer::start) checks local reachability, waits out
//!   a settle delay, then attaches the status/emergency/alert
//!   subscriptions. Operator intents (display commands, emergency actions,
//!   alert dismissal, retry) flow through its write paths, which apply
//!   optimistic local state under explicit precedence rules: remote truth
//!   always wins once it arrives.
//!
//! - **[`SessionState`]** — The single derived view published through a
//!   `tokio::sync::watch` channel. Never persisted; rebuilt from remote
//!   pushes and local intents.
//!
//! - **[`StoreGateway`]** — Typed channel operations over any
//!   [`robopanel_api::KeyPathStore`], and the boundary where transport
//!   errors are classified into [`FailureKind`] — raw backend text never
//!   reaches the synchronizer or a front-end.
//!
//! - **Domain model** ([`model`]) — `DisplayCommand`, `EmergencyCommand`,
//!   `DeviceStatus`, and `WarningAlert` in the device firmware's wire
//!   format (camelCase JSON, epoch-millisecond timestamps).
//!
//! - **[`AccessPolicy`]** — The emergency-channel authorization seam, with
//!   [`AdminAllowList`] as the shipped placeholder implementation.

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod session;
pub mod synchronizer;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{AccessPolicy, AdminAllowList, AdminId};
pub use config::SyncConfig;
pub use error::{CoreError, FailureKind};
pub use gateway::{ChannelEvent, StoreGateway};
pub use session::{Connectivity, EmergencyView, ErrorInfo, SessionState};
pub use synchronizer::{ChannelState, SyncChannel, Synchronizer};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AlertSeverity,
    AlertSource,
    BuzzerAction,
    DeviceStatus,
    DisplayCommand,
    EmergencyAction,
    EmergencyCommand,
    MAX_DISPLAY_TEXT,
    WATER_LEVEL_MAX,
    WarningAlert,
};
