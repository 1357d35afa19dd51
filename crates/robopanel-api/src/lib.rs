//! Transport layer between a hosted realtime key-path store and the
//! `robopanel-core` gateway.
//!
//! This crate knows nothing about robots, emergencies, or alerts — it moves
//! JSON values in and out of named paths and streams change notifications:
//!
//! - **[`KeyPathStore`]** — the store seam: `put` / `delete` / `get` plus
//!   `watch`, which yields the latest value immediately on attach and then
//!   every subsequent change. On a transport failure the stream emits one
//!   [`StoreEvent::Error`] and terminates; re-subscribing is the caller's
//!   responsibility, never the transport's.
//!
//! - **[`RtdbClient`]** — production implementation speaking the
//!   Firebase-RTDB-compatible REST surface (`PUT`/`DELETE`/`GET` on
//!   `{path}.json`, subscriptions over `text/event-stream`).
//!
//! - **[`MemoryStore`]** — in-process implementation backed by a single JSON
//!   tree, used by core tests and as a no-network bootstrap target.
//!
//! - **[`NetworkMonitor`]** — local reachability collaborator. Writes are
//!   pre-checked against it before any remote call is attempted.
//!
//! `robopanel-core` maps [`Error`] values into its user-facing failure
//! taxonomy; raw transport detail never crosses that boundary.

pub mod error;
pub mod memory;
pub mod reachability;
pub mod rtdb;
mod sse;
pub mod store;
pub mod transport;

pub use error::Error;
pub use memory::{MemoryStore, StreamFault};
pub use reachability::{NetworkMonitor, ProbeMonitor, StaticMonitor};
pub use rtdb::RtdbClient;
pub use store::{KeyPathStore, StoreEvent};
pub use transport::StoreConfig;
