//! Clap derive structures for the `silowatch` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use silowatch_core::{AlertSeverity, AlertStatus, StatusTab};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// silowatch -- operator CLI for farm sensor alerts and device registration
#[derive(Debug, Parser)]
#[command(
    name = "silowatch",
    version,
    about = "Triage farm sensor alerts and manage device registration codes",
    long_about = "Operator surface for a silowatch backend.\n\n\
        Lists, acknowledges and resolves grain-storage alerts, and issues or\n\
        revokes the time-limited codes sensors use to register with a farm.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "SILOWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "SILOWATCH_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Backend API key
    #[arg(long, env = "SILOWATCH_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Name recorded on acknowledge / resolve
    #[arg(long, env = "SILOWATCH_ACTOR", global = true)]
    pub actor: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SILOWATCH_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "SILOWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SILOWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Triage sensor alerts
    #[command(alias = "a")]
    Alerts(AlertsArgs),

    /// Manage device registration codes
    #[command(alias = "c")]
    Codes(CodesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALERTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts, newest first
    #[command(alias = "ls")]
    List {
        /// Status tab: all, active, acknowledged, resolved
        #[arg(long, short = 't', default_value = "all")]
        tab: StatusTab,

        /// Only alerts of this severity
        #[arg(long, short = 's')]
        severity: Option<AlertSeverity>,

        /// Only alerts in this status (combined with --tab)
        #[arg(long)]
        status: Option<AlertStatus>,
    },

    /// Show one alert
    Get {
        /// Alert ID
        id: String,
    },

    /// Counts by status, severity and type
    Stats,

    /// Acknowledge an active alert
    #[command(alias = "ack")]
    Acknowledge {
        /// Alert ID
        id: String,
    },

    /// Resolve an active or acknowledged alert
    Resolve {
        /// Alert ID
        id: String,
    },

    /// Delete an alert permanently
    #[command(alias = "rm")]
    Delete {
        /// Alert ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REGISTRATION CODES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CodesArgs {
    #[command(subcommand)]
    pub command: CodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CodesCommand {
    /// List active codes (latest expiry first)
    #[command(alias = "ls")]
    List {
        /// Include expired, used and revoked codes
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Counts of active, expired, used and revoked codes
    Summary,

    /// Issue a code valid for 24 hours
    #[command(alias = "gen")]
    Generate {
        /// Farm the device will join
        #[arg(long, short = 'f')]
        farm: String,

        /// Name shown for the device once registered
        #[arg(long, short = 'n')]
        device_name: String,

        /// Location label for the device
        #[arg(long, short = 'l')]
        location: Option<String>,
    },

    /// Revoke a code so it can no longer be redeemed
    Revoke {
        /// Registration code ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup
    Init,

    /// Print the config file path
    Path,

    /// Display the active profile (secrets redacted)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an API key in the system keyring
    SetKey {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
