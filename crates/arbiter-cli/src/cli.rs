//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Arbiter CLI - resolve which legal entity sits behind a domain.
#[derive(Debug, Parser)]
#[command(name = "arbiter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run arbitration for a domain
    Run(RunArgs),

    /// Poll the status of a request
    Status(StatusArgs),

    /// Manage bias profiles
    Profile(ProfileArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Domain to arbitrate (e.g. acme.com)
    pub domain: String,

    /// Pre-extracted primary entity name, when known
    #[arg(short, long)]
    pub entity: Option<String>,

    /// Bias profile name (defaults to the store's default profile)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Skip the reasoning backend and rank deterministically
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the status command.
#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Request id (UUID)
    pub request_id: String,
}

/// Arguments for the profile command.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile subcommands.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all bias profiles
    List,

    /// Show one profile in full
    Show {
        /// Profile name
        name: String,
    },
}
