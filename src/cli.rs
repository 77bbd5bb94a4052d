//! Command-line interface definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// neovim-bridge - use a running Neovim as the engine editor's external code editor
#[derive(Parser, Debug)]
#[command(name = "nvb")]
#[command(about = "Open files in Neovim and keep IDE project files in sync", long_about = None)]
#[command(version)]
pub struct Args {
    /// Project root (defaults to the current directory)
    #[arg(long, short = 'p', value_name = "DIR", global = true)]
    pub project: Option<PathBuf>,

    /// Emit NDJSON events on stdout instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a file in the running Neovim at a line and column
    Open {
        path: String,

        /// 1-based line; -1 means unset
        #[arg(long, short = 'l', default_value_t = -1, allow_negative_numbers = true)]
        line: i32,

        /// 0-based column; -1 means unset
        #[arg(long, short = 'c', default_value_t = -1, allow_negative_numbers = true)]
        column: i32,
    },

    /// List the editor installations the host can pick from
    Installations,

    /// Look up the installation registered at an exact path
    Find { path: String },

    /// Forward asset changes to the project generator
    Sync {
        #[arg(long, value_name = "PATH")]
        added: Vec<String>,
        #[arg(long, value_name = "PATH")]
        deleted: Vec<String>,
        #[arg(long, value_name = "PATH")]
        moved: Vec<String>,
        #[arg(long = "moved-from", value_name = "PATH")]
        moved_from: Vec<String>,
        #[arg(long, value_name = "PATH")]
        imported: Vec<String>,
    },

    /// Sync with no specific changes; regenerates missing or stale project files
    SyncAll,

    /// Regenerate every project file
    Regenerate,

    /// Show or toggle project-generation flags
    Flags {
        #[command(subcommand)]
        action: Option<FlagsAction>,
    },

    /// Check the remote-control tool and list running Neovim servers
    Status,

    /// Watch asset directories and sync on change (Ctrl+C to stop)
    Watch,

    /// Write a default .nvb/config.toml
    Init,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FlagsAction {
    /// Flip one flag and save it to .nvb/config.toml
    Toggle { flag: String },
}
