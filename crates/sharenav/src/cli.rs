//! Clap derive structures for the `sharenav` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use sharenav_core::ConnectionMode;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sharenav -- find your servers and browse their shares
#[derive(Debug, Parser)]
#[command(
    name = "sharenav",
    version,
    about = "Discover sharenav servers and browse their shares",
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
    /// Config file to use instead of the platform default
    #[arg(long, env = "SHARENAV_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory URL (overrides config)
    #[arg(long, short = 'd', global = true)]
    pub directory: Option<String>,

    /// Relay URL (overrides config)
    #[arg(long, short = 'r', global = true)]
    pub relay: Option<String>,

    /// Account to sign in with (overrides config)
    #[arg(long, short = 'i', global = true)]
    pub identity: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one name per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Same-network address
    Local,
    /// Internet-facing address
    Remote,
}

impl From<ModeArg> for ConnectionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Local => Self::Local,
            ModeArg::Remote => Self::Remote,
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in, list servers, and optionally open one and pick a share
    #[command(alias = "b")]
    Browse(BrowseArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// Server to open: id, name, or position in the list (0-based)
    #[arg(long, short = 's')]
    pub server: Option<String>,

    /// Share to pick on the opened server: id or name
    #[arg(long, requires = "server")]
    pub share: Option<String>,

    /// Transport path (overrides config)
    #[arg(long, short = 'm')]
    pub mode: Option<ModeArg>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file from the defaults and the given flags
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
