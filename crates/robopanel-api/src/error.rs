use thiserror::Error;

/// Top-level error type for the `robopanel-api` crate.
///
/// Covers every failure mode of the key-path store transport: HTTP writes,
/// one-shot reads, and the event-stream subscription surface.
/// `robopanel-core` classifies these into its user-facing failure taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Store responses ─────────────────────────────────────────────
    /// Non-success status from the store's REST surface.
    #[error("Store rejected request (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    // ── Event stream ────────────────────────────────────────────────
    /// The subscription stream ended. The store's streams are infinite
    /// by contract, so any end-of-stream is a failure.
    #[error("Event stream closed: {reason}")]
    StreamClosed { reason: String },

    /// A frame on the event stream could not be parsed.
    #[error("Malformed event stream frame: {detail}")]
    StreamProtocol { detail: String },

    /// The store revoked the stream's authorization mid-flight.
    #[error("Stream authorization revoked by the store")]
    AuthRevoked,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the request exceeded its deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the remote endpoint could not be reached at all
    /// (connect refused, DNS failure).
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Returns `true` if the store rejected the caller's authorization.
    pub fn is_permission(&self) -> bool {
        matches!(
            self,
            Self::Http {
                status: 401 | 403,
                ..
            } | Self::AuthRevoked
        )
    }

    /// Returns `true` for transient store-side outages: 5xx responses,
    /// dropped streams, and unreachable endpoints.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500,
            Self::StreamClosed { .. } => true,
            _ => self.is_connect(),
        }
    }
}
