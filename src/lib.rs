//! neovim-bridge
//!
//! Command-line host for the launcher in [`nvb_app`]: argument parsing,
//! subcommand dispatch and console/NDJSON output.

pub mod cli;
pub mod commands;
pub mod output;

pub use cli::{Args, Command, FlagsAction};
pub use commands::{build_launcher, build_launcher_with_availability, project_root, run};
pub use output::{CliEvent, ConsoleNotifier};
