//! Clap derive structures for the `robopanel` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use robopanel_core::{AlertSeverity, BuzzerAction};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// robopanel -- operator console for the minrobot device
#[derive(Debug, Parser)]
#[command(
    name = "robopanel",
    version,
    about = "Control the minrobot LCD/buzzer device through its realtime store",
    long_about = "Operator console for a remote LCD-and-buzzer robot with a water sensor.\n\n\
        Commands and emergency actions are written to a realtime key-path store;\n\
        the device picks them up and pushes status, emergency state, and warning\n\
        alerts back on its own channels.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Store profile to use
    #[arg(long, short = 'p', env = "ROBOPANEL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Store base URL (overrides profile)
    #[arg(long, short = 'd', env = "ROBOPANEL_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Store access token
    #[arg(long, env = "ROBOPANEL_AUTH_TOKEN", global = true, hide_env = true)]
    pub auth_token: Option<String>,

    /// Admin id for emergency actions (overrides profile)
    #[arg(long, short = 'a', env = "ROBOPANEL_ADMIN", global = true)]
    pub admin: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ROBOPANEL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ROBOPANEL_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send text to the device display
    #[command(alias = "d")]
    Display(DisplayArgs),

    /// Drive the buzzer
    #[command(alias = "b")]
    Buzzer(BuzzerArgs),

    /// Activate or deactivate the manual emergency
    #[command(alias = "e")]
    Emergency(EmergencyArgs),

    /// Show device status, once or as a live watch
    #[command(alias = "st")]
    Status(StatusArgs),

    /// List, dismiss, or raise warning alerts
    #[command(alias = "al")]
    Alerts(AlertsArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Display / Buzzer ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Text for the 2x16 panel (max 32 characters)
    pub text: String,

    /// Buzzer action to bundle with the text
    #[arg(long, value_enum, default_value = "off")]
    pub buzzer: BuzzerActionArg,

    /// Buzzer run time in milliseconds
    #[arg(long, default_value = "1000")]
    pub duration_ms: u32,
}

#[derive(Debug, Args)]
pub struct BuzzerArgs {
    /// Buzzer action
    #[arg(value_enum)]
    pub action: BuzzerActionArg,

    /// Buzzer run time in milliseconds
    #[arg(long, default_value = "1000")]
    pub duration_ms: u32,
}

/// CLI mirror of [`BuzzerAction`] (clap needs `ValueEnum`).
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BuzzerActionArg {
    Off,
    On,
    Beep,
    Pattern,
    Alarm,
    Siren,
}

impl From<BuzzerActionArg> for BuzzerAction {
    fn from(arg: BuzzerActionArg) -> Self {
        match arg {
            BuzzerActionArg::Off => Self::Off,
            BuzzerActionArg::On => Self::On,
            BuzzerActionArg::Beep => Self::Beep,
            BuzzerActionArg::Pattern => Self::Pattern,
            BuzzerActionArg::Alarm => Self::Alarm,
            BuzzerActionArg::Siren => Self::Siren,
        }
    }
}

// ── Emergency ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EmergencyArgs {
    #[command(subcommand)]
    pub command: EmergencyCommand,
}

#[derive(Debug, Subcommand)]
pub enum EmergencyCommand {
    /// Activate the manual emergency (LED + siren on the device)
    Activate {
        /// Reason recorded with the command
        #[arg(long)]
        reason: Option<String>,
    },
    /// Deactivate the manual emergency (water emergencies clear only
    /// when the sensor recedes)
    Deactivate {
        /// Reason recorded with the command
        #[arg(long)]
        reason: Option<String>,
    },
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Keep watching and print every session-state change until Ctrl-C
    #[arg(long, short = 'w')]
    pub watch: bool,
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List active warning alerts
    List,
    /// Dismiss an alert by id (deletes it from the store)
    Dismiss {
        /// Alert id
        id: String,
    },
    /// Raise a manual alert
    Raise {
        /// Short alert title
        #[arg(long)]
        title: String,
        /// Alert body
        #[arg(long)]
        message: String,
        /// Severity
        #[arg(long, value_enum, default_value = "info")]
        severity: SeverityArg,
    },
}

/// CLI mirror of [`AlertSeverity`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SeverityArg {
    Info,
    Warning,
    Critical,
}

impl From<SeverityArg> for AlertSeverity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Self::Info,
            SeverityArg::Warning => Self::Warning,
            SeverityArg::Critical => Self::Critical,
        }
    }
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter config with a default profile
    Init {
        /// Store base URL for the default profile
        #[arg(long)]
        database_url: String,
        /// Admin id for the default profile
        #[arg(long, default_value = "admin")]
        admin_id: String,
    },
    /// Print the resolved configuration
    Show,
    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
