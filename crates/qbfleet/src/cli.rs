//! Clap derive structures for the `qbfleet` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// qbfleet -- manage a fleet of qBittorrent hosts from the command line
#[derive(Debug, Parser)]
#[command(
    name = "qbfleet",
    version,
    about = "Manage torrents across multiple qBittorrent hosts",
    long_about = "A CLI for operating several qBittorrent WebUI instances as one fleet.\n\n\
        Commands fan out across all enabled hosts by default; pass --host to\n\
        target a single instance. Partial host failures never abort a command.",
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
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, env = "QBFLEET_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "QBFLEET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "QBFLEET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and test configured hosts
    #[command(alias = "h")]
    Hosts(HostsArgs),

    /// List and manage torrents across the fleet
    #[command(alias = "t")]
    Torrents(TorrentsArgs),

    /// Fleet-wide transfer statistics
    Stats,

    /// Run the health monitor
    #[command(alias = "mon")]
    Monitor(MonitorArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Hosts ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HostsArgs {
    #[command(subcommand)]
    pub command: HostsCommand,
}

#[derive(Debug, Subcommand)]
pub enum HostsCommand {
    /// List configured hosts
    #[command(alias = "ls")]
    List,

    /// Probe hosts by logging in, report status and latency
    Test {
        /// Host name or id (all enabled hosts when omitted)
        host: Option<String>,
    },

    /// Detailed view of one host (sync data, preferences, transfer stats)
    Show {
        /// Host name or id
        host: String,
    },
}

// ── Torrents ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TorrentsArgs {
    #[command(subcommand)]
    pub command: TorrentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TorrentsCommand {
    /// List torrents, fleet-wide or for one host
    #[command(alias = "ls")]
    List {
        /// Restrict to one host (name or id)
        #[arg(long)]
        host: Option<String>,
    },

    /// Add a torrent by URL or magnet link
    Add {
        /// Torrent URL or magnet link
        url: String,

        /// Target host (repeatable; all enabled hosts when omitted)
        #[arg(long)]
        host: Vec<String>,

        /// Download directory on the host
        #[arg(long)]
        savepath: Option<String>,
    },

    /// Upload a .torrent file to one host
    Upload {
        /// Path to the .torrent file
        file: PathBuf,

        /// Target host (name or id)
        #[arg(long)]
        host: String,

        /// Add in paused state
        #[arg(long)]
        paused: bool,

        /// Download directory on the host
        #[arg(long)]
        savepath: Option<String>,

        /// Category to assign
        #[arg(long)]
        category: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Pause torrents on one host
    Pause {
        /// Target host (name or id)
        #[arg(long)]
        host: String,

        /// Torrent hashes
        #[arg(required = true)]
        hashes: Vec<String>,
    },

    /// Resume torrents on one host
    Resume {
        /// Target host (name or id)
        #[arg(long)]
        host: String,

        /// Torrent hashes
        #[arg(required = true)]
        hashes: Vec<String>,
    },

    /// Delete torrents on one host
    #[command(alias = "rm")]
    Delete {
        /// Target host (name or id)
        #[arg(long)]
        host: String,

        /// Torrent hashes
        #[arg(required = true)]
        hashes: Vec<String>,

        /// Also delete downloaded data from disk
        #[arg(long)]
        delete_files: bool,
    },
}

// ── Monitor ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MonitorArgs {
    /// Run a single probe pass and exit
    #[arg(long)]
    pub once: bool,

    /// Override the probe interval, seconds
    #[arg(long)]
    pub interval: Option<u64>,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
