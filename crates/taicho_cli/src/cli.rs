//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Log what you did, when, and how productive it was.
#[derive(Debug, Parser)]
#[command(name = "taicho", version = env!("CARGO_PKG_VERSION"), long_about = None)]
pub struct Cli {
    /// Store file (default: ./taicho.sqlite3)
    #[arg(global = true, long = "db")]
    pub db: Option<PathBuf>,

    /// Write rolling logs into this directory
    #[arg(global = true, long = "log-dir")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(global = true, long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage presets
    #[command(subcommand)]
    Preset(PresetCommand),

    /// Record an activity
    #[command(subcommand)]
    Log(LogCommand),

    /// List entries, newest first
    List,

    /// Find entries by name and/or day
    Search {
        /// Case-sensitive substring of the name
        #[arg(long)]
        name: Option<String>,

        /// Day to match (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// IANA zone defining the day (default: device zone)
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Delete an entry by id
    Delete { id: String },

    /// Export all entries as CSV (stdout when no file is given)
    Export { path: Option<PathBuf> },

    /// Print the version
    Version,
}

#[derive(Debug, Subcommand)]
pub enum PresetCommand {
    /// Add a preset
    Add {
        name: String,

        /// High, Medium, Low or "Not Productive"
        #[arg(long, short = 'p')]
        productivity: String,

        #[arg(long, short = 'i')]
        icon: String,
    },

    /// List presets grouped by productivity
    List,

    /// Delete a preset by name
    Delete { name: String },
}

#[derive(Debug, Subcommand)]
pub enum LogCommand {
    /// Add an entry
    Add(LogAddArgs),

    /// Add an entry starting now from a preset
    Preset { name: String },
}

#[derive(Debug, Args)]
pub struct LogAddArgs {
    pub name: String,

    /// High, Medium, Low or "Not Productive"
    #[arg(long, short = 'p')]
    pub productivity: String,

    /// `YYYY-MM-DD HH:MM` or RFC 3339 (default: now, rounded down to 15 minutes)
    #[arg(long, short = 't')]
    pub time: Option<String>,

    /// IANA zone (default: device zone)
    #[arg(long)]
    pub timezone: Option<String>,

    #[arg(long, short = 'n')]
    pub notes: Option<String>,
}
