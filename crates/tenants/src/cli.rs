//! Clap derive structures for the `tenants` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tenants -- administer tenants from the command line
#[derive(Debug, Parser)]
#[command(
    name = "tenants",
    version,
    about = "Administer tenants from the command line",
    long_about = "Create, list, update and delete tenants through the tenants API.\n\n\
        Server errors are reported with the message the API returned;\n\
        connection problems are reported separately.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "TENANTS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 's', env = "TENANTS_SERVER", global = true)]
    pub server: Option<String>,

    /// Bearer token
    #[arg(long, env = "TENANTS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Refresh token sent alongside the bearer token
    #[arg(long, env = "TENANTS_REFRESH_TOKEN", global = true, hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TENANTS_OUTPUT",
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
    #[arg(long, short = 'k', env = "TENANTS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "TENANTS_TIMEOUT", global = true)]
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
    /// List tenants, one page at a time
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show a single tenant
    Get {
        /// Tenant ID
        id: String,
    },

    /// Create a tenant
    Create {
        /// Tenant name
        name: String,
    },

    /// Update a tenant's name and/or status
    Update(UpdateArgs),

    /// Delete a tenant
    #[command(alias = "rm")]
    Delete {
        /// Tenant ID
        id: String,
    },

    /// Show tenant counts by status
    Info,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── List / Update Arguments ──────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    pub page: i64,

    /// Rows per page (overrides profile)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Status label to filter on: all, Active, Inactive, Demo
    #[arg(long, default_value = "all")]
    pub status: String,

    /// Case-insensitive name fragment to filter on
    #[arg(long, short = 'n', default_value = "")]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Tenant ID
    pub id: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New status: Active, Inactive or Demo (case-insensitive)
    #[arg(long)]
    pub status: Option<String>,
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
    /// Print the config file location
    Path,

    /// Display current configuration (tokens masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: server, token_env, refresh_token_env, insecure, timeout, ca_cert, page_size
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the token pair for the active profile in the system keyring
    SetToken,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
