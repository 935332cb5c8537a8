use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::io::config_io::CONFIG_FILE;

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - client settings and permission checks"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Settings file to use
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default settings file
    Init(InitArgs),
    /// Show or edit settings
    Config(ConfigCmd),
    /// Check one permission path against an identity
    Check(CheckArgs),
    /// List every permission an identity grants
    Permissions(PermissionsArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing settings file
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Config args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Set the inactivity timeout
    SetTimeout(SetTimeoutArgs),
}

#[derive(Args)]
pub struct SetTimeoutArgs {
    /// Minutes of inactivity before logout (at least 1)
    pub minutes: u64,
}

// ---------------------------------------------------------------------------
// Permission args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CheckArgs {
    /// Permission path, e.g. task.edit
    pub path: String,
    /// Identity JSON file (omit to check as an unauthenticated caller)
    #[arg(long)]
    pub identity: Option<PathBuf>,
}

#[derive(Args)]
pub struct PermissionsArgs {
    /// Identity JSON file
    #[arg(long)]
    pub identity: PathBuf,
}
