//! Clap derive structures for the `promokit` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// promokit -- look up and redeem promotional codes
#[derive(Debug, Parser)]
#[command(
    name = "promokit",
    version,
    about = "Look up and redeem promotional codes from the command line",
    long_about = "Front-desk tool for single-use promotional codes.\n\n\
        Reads the code list from a code source and records redemptions\n\
        with a redemption service that enforces single use.",
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
    /// Profile to use
    #[arg(long, short = 'p', env = "PROMOKIT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Code source URL (overrides profile)
    #[arg(long, short = 's', env = "PROMOKIT_SOURCE", global = true)]
    pub source: Option<String>,

    /// Redemption URL (defaults to the source URL)
    #[arg(long, env = "PROMOKIT_REDEEM_URL", global = true)]
    pub redeem_url: Option<String>,

    /// Collaborator API key
    #[arg(long, env = "PROMOKIT_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PROMOKIT_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PROMOKIT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (profile or 30 when unset)
    #[arg(long, env = "PROMOKIT_TIMEOUT", global = true)]
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
    /// Browse and search promo codes
    #[command(alias = "c")]
    Codes(CodesArgs),

    /// Redeem a promo code
    #[command(alias = "r")]
    Redeem(RedeemArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Codes ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CodesArgs {
    #[command(subcommand)]
    pub command: CodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CodesCommand {
    /// List codes, optionally filtered
    #[command(alias = "ls")]
    List {
        /// Case-insensitive match on code, description, customer or bonus item
        #[arg(long, short = 'f')]
        search: Option<String>,

        /// Only show codes with this status
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },

    /// Show one code
    Get {
        /// Promo code (case-insensitive)
        code: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Active,
    Redeemed,
    All,
}

// ── Redeem ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RedeemArgs {
    /// Promo code to redeem (case-insensitive, surrounding spaces ignored)
    pub code: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display current configuration (API keys redacted)
    Show,

    /// Set a profile value
    Set {
        /// Key (source_url, redeem_url, api_key_env, ca_cert, insecure, timeout)
        key: String,
        /// Value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a profile's API key in the system keyring
    SetKey {
        /// Profile name (defaults to the active profile)
        name: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
