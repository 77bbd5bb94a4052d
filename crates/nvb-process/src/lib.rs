//! # nvb-process - External Process Execution
//!
//! Spawns and supervises the external tools neovim-bridge drives: the Neovim
//! remote-control client (`nvr`) and the desktop "activate application"
//! command.
//!
//! Depends on [`nvb_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Process Execution
//! - [`CommandRunner`] - Scoped process primitive (captured-with-timeout, detached)
//! - [`TokioCommandRunner`] - Real implementation backed by `tokio::process`
//! - [`CapturedOutput`] - Exit code plus captured stdout/stderr
//!
//! ### Remote Control
//! - [`RemoteControl`] - Builds `nvr` invocations (open at cursor, server list)
//! - [`resolve_servername()`] - Socket resolution (config, `$NVIM_LISTEN_ADDRESS`, default)
//!
//! ### Desktop Focus
//! - [`focus_command()`] - Platform-specific "activate application" command
//!
//! ### Tool Discovery
//! - [`ToolAvailability`] - Resolve the remote-control tool on `PATH`

pub mod focus;
pub mod remote;
pub mod runner;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod tool_availability;

pub use focus::{focus_command, DEFAULT_FOCUS_APP};
pub use remote::{
    cursor_call, expand_home, parse_serverlist, resolve_servername, RemoteControl,
    DEFAULT_REMOTE_TOOL, DEFAULT_SERVER_SOCKET, LISTEN_ADDRESS_ENV,
};
pub use runner::{
    CapturedOutput, CommandRunner, LocalCommandRunner, TokioCommandRunner,
    DEFAULT_COMMAND_TIMEOUT,
};
pub use tool_availability::ToolAvailability;
