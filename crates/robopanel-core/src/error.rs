// ── Core error types ──
//
// User-facing errors from robopanel-core. These are NOT transport-specific --
// consumers never see HTTP status codes or stream frame details directly.
// The `From<robopanel_api::Error>` impl classifies transport failures into
// the fixed taxonomy before they reach the synchronizer or any front-end.

use thiserror::Error;

/// Machine-readable failure class, retained in session state next to the
/// user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// No local connectivity; no remote call was (or will be) attempted.
    Unreachable,
    /// Transient store-side outage.
    BackendUnavailable,
    /// Authorization rejected, locally or by the store.
    PermissionDenied,
    Timeout,
    Unknown,
}

/// Unified error type for the core crate.
///
/// `Display` is the operator-facing message; structured detail stays in
/// the fields for logs.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote-call failures (the fixed taxonomy) ───────────────────
    #[error("No internet connection. Please check your network settings and try again.")]
    Unreachable,

    #[error("Store service temporarily unavailable. Please try again later.")]
    BackendUnavailable { detail: String },

    #[error("Access denied. Please check store rules and admin permissions.")]
    PermissionDenied { detail: String },

    #[error("Connection timeout. Please check your internet connection and try again.")]
    Timeout,

    #[error("Unexpected store failure: {detail}")]
    Unknown { detail: String },

    // ── Local failures ──────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// The device pushed a value that violates its own contract (e.g. a
    /// water level outside the sensor's range). Never normalized away.
    #[error("Device reported corrupt data: {detail}")]
    InvalidData { detail: String },
}

impl CoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unreachable => FailureKind::Unreachable,
            Self::BackendUnavailable { .. } => FailureKind::BackendUnavailable,
            Self::PermissionDenied { .. } => FailureKind::PermissionDenied,
            Self::Timeout => FailureKind::Timeout,
            Self::Unknown { .. } | Self::ValidationFailed { .. } | Self::InvalidData { .. } => {
                FailureKind::Unknown
            }
        }
    }
}

// ── Classification of transport-layer errors ─────────────────────────

impl From<robopanel_api::Error> for CoreError {
    fn from(err: robopanel_api::Error) -> Self {
        if err.is_timeout() {
            CoreError::Timeout
        } else if err.is_permission() {
            CoreError::PermissionDenied {
                detail: err.to_string(),
            }
        } else if err.is_unavailable() {
            CoreError::BackendUnavailable {
                detail: err.to_string(),
            }
        } else {
            CoreError::Unknown {
                detail: err.to_string(),
            }
        }
    }
}
