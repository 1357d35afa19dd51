// ── Synchronizer tuning ──
//
// Runtime knobs only; the core never reads config files. Front-ends build
// this from their own configuration layer.

use std::time::Duration;

/// Tuning for [`crate::synchronizer::Synchronizer`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay between the initial reachability check and attaching the
    /// remote subscriptions. The transport needs on the order of a second
    /// to finish establishing its connection; attaching earlier reconciles
    /// against a half-open stream.
    pub settle_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
        }
    }
}

impl SyncConfig {
    /// No settle delay -- for tests and in-process stores.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
        }
    }
}
