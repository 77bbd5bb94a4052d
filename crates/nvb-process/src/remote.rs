//! Neovim remote-control commands
//!
//! Builds invocations of the remote-control client (`nvr` by default) that
//! talk to an already-running Neovim server over its listen socket.

use std::path::PathBuf;

use nvb_core::{CommandSpec, CursorPosition};

/// Remote-control client used when none is configured
pub const DEFAULT_REMOTE_TOOL: &str = "nvr";

/// Server socket used when neither config nor environment names one (home-relative)
pub const DEFAULT_SERVER_SOCKET: &str = "~/.cache/nvimsocket";

/// Environment variable Neovim and `nvr` use for the server address
pub const LISTEN_ADDRESS_ENV: &str = "NVIM_LISTEN_ADDRESS";

/// Builds remote-control invocations for one Neovim server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteControl {
    tool: String,
    servername: String,
    working_directory: Option<PathBuf>,
}

impl RemoteControl {
    pub fn new(tool: impl Into<String>, servername: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            servername: servername.into(),
            working_directory: None,
        }
    }

    /// Run every command from `dir` so relative paths resolve against it.
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn servername(&self) -> &str {
        &self.servername
    }

    /// Open `path` in the server and move the cursor to `position`.
    ///
    /// `nvr --servername <socket> -c "call cursor(<line>, <column>)" <path>`
    pub fn open_command(&self, path: &str, position: CursorPosition) -> CommandSpec {
        self.base()
            .arg("--servername")
            .arg(&self.servername)
            .arg("-c")
            .arg(cursor_call(position))
            .arg(path)
    }

    /// List the servers the client can see.
    pub fn serverlist_command(&self) -> CommandSpec {
        self.base().arg("--serverlist")
    }

    fn base(&self) -> CommandSpec {
        let spec = CommandSpec::new(&self.tool);
        match &self.working_directory {
            Some(dir) => spec.current_dir(dir),
            None => spec,
        }
    }
}

/// Vimscript call that places the cursor.
pub fn cursor_call(position: CursorPosition) -> String {
    format!("call cursor({}, {})", position.line, position.column)
}

/// Pick the server socket.
///
/// Priority order:
/// 1. Explicitly configured name (with `~` expanded)
/// 2. `$NVIM_LISTEN_ADDRESS`
/// 3. `~/.cache/nvimsocket`
pub fn resolve_servername(configured: &str) -> String {
    let configured = configured.trim();
    if !configured.is_empty() {
        return expand_home(configured);
    }

    if let Ok(address) = std::env::var(LISTEN_ADDRESS_ENV) {
        if !address.trim().is_empty() {
            return address;
        }
    }

    expand_home(DEFAULT_SERVER_SOCKET)
}

/// Expand a leading `~/` against the home directory. Other paths are returned as-is.
pub fn expand_home(path: &str) -> String {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest).display().to_string(),
            None => path.to_string(),
        },
        None => path.to_string(),
    }
}

/// Parse `nvr --serverlist` output: one address per non-empty line.
pub fn parse_serverlist(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
