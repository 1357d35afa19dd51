// ── Local reachability collaborator ──
//
// Write paths pre-check local connectivity before any remote call, and the
// synchronizer consults this when classifying subscription failures.
// "Available" means validated internet — a completed handshake to the
// probe target — not merely a present interface.

use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Answers "can we reach the internet right now?". Implementations must be
/// cheap enough to call synchronously on every write.
pub trait NetworkMonitor: Send + Sync + 'static {
    fn is_network_available(&self) -> bool;
}

/// TCP connect probe against a well-known endpoint.
#[derive(Debug, Clone)]
pub struct ProbeMonitor {
    addr: SocketAddr,
    timeout: Duration,
}

impl ProbeMonitor {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }
}

impl Default for ProbeMonitor {
    fn default() -> Self {
        Self {
            // Cloudflare DNS over TLS port; answers from anywhere.
            addr: SocketAddr::from(([1, 1, 1, 1], 443)),
            timeout: Duration::from_millis(800),
        }
    }
}

impl NetworkMonitor for ProbeMonitor {
    fn is_network_available(&self) -> bool {
        TcpStream::connect_timeout(&self.addr, self.timeout).is_ok()
    }
}

/// Fixed-answer monitor for tests and offline bootstrap.
#[derive(Debug, Default)]
pub struct StaticMonitor {
    available: AtomicBool,
}

impl StaticMonitor {
    pub fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
        }
    }

    /// Flip the reported state; takes effect on the next check.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl NetworkMonitor for StaticMonitor {
    fn is_network_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
