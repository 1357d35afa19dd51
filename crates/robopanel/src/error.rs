//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` failure kinds into user-facing errors with actionable
//! help text.

use miette::Diagnostic;
use thiserror::Error;

use robopanel_core::{CoreError, FailureKind};

/// Exit codes per the CLI contract.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const PERMISSION: i32 = 3;
    pub const CONNECTION: i32 = 4;
    pub const TIMEOUT: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(dead_code)]
pub enum CliError {
    // ── Connectivity ─────────────────────────────────────────────────

    #[error("No internet connection")]
    #[diagnostic(
        code(robopanel::unreachable),
        help(
            "The write was rejected before any remote call.\n\
             Check WiFi / uplink, then re-run the command to retry."
        )
    )]
    Unreachable,

    #[error("Store service unavailable")]
    #[diagnostic(
        code(robopanel::backend_unavailable),
        help("The realtime store is having a transient outage. Try again shortly.")
    )]
    BackendUnavailable { detail: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(robopanel::timeout),
        help("Increase --timeout or check connection quality to the store.")
    )]
    Timeout,

    // ── Authorization ────────────────────────────────────────────────

    #[error("Not authorized for emergency control")]
    #[diagnostic(
        code(robopanel::permission),
        help(
            "Emergency actions require an allow-listed admin id.\n\
             Pass one with --admin or set admin_id in your profile."
        )
    )]
    Permission { detail: String },

    #[error("No admin id configured")]
    #[diagnostic(
        code(robopanel::no_admin),
        help("Pass --admin <ID> or set admin_id in your profile (robopanel config init).")
    )]
    NoAdminId,

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(robopanel::validation))]
    Validation { field: String, reason: String },

    // ── Store data ───────────────────────────────────────────────────

    #[error("Store operation failed: {message}")]
    #[diagnostic(code(robopanel::store))]
    Store { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(robopanel::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: robopanel config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No store configured")]
    #[diagnostic(
        code(robopanel::no_config),
        help(
            "Create a config with: robopanel config init --database-url <URL>\n\
             Or pass --database-url directly.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(robopanel::config))]
    Config(#[from] robopanel_config::ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(robopanel::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable | Self::BackendUnavailable { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Permission { .. } | Self::NoAdminId => exit_code::PERMISSION,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message.clone(),
            },
            CoreError::InvalidData { detail } => CliError::Store {
                message: format!("device reported corrupt data: {detail}"),
            },
            _ => match err.kind() {
                FailureKind::Unreachable => CliError::Unreachable,
                FailureKind::BackendUnavailable => CliError::BackendUnavailable {
                    detail: err.to_string(),
                },
                FailureKind::PermissionDenied => CliError::Permission {
                    detail: err.to_string(),
                },
                FailureKind::Timeout => CliError::Timeout,
                FailureKind::Unknown => CliError::Store {
                    message: err.to_string(),
                },
            },
        }
    }
}
