//! Domain value types shared by every crate in the workspace

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sentinel the host uses for "no line/column given".
pub const HOST_UNSET: i32 = -1;

/// Line used when a request carries none.
pub const DEFAULT_LINE: u32 = 1;

/// Column used when a request carries none.
pub const DEFAULT_COLUMN: u32 = 0;

// ─────────────────────────────────────────────────────────────────────────────
// Installation
// ─────────────────────────────────────────────────────────────────────────────

/// A named external editor known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    /// Display name shown by the host (e.g. "Neovim")
    pub name: String,
    /// Path the host uses to address this installation
    pub path: String,
}

impl Installation {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Open Requests
// ─────────────────────────────────────────────────────────────────────────────

/// A request from the host to open a file at an optional position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
    pub file_path: String,
    /// 1-based line; `None` means "top of file"
    pub line: Option<i32>,
    /// 0-based column; `None` means "start of line"
    pub column: Option<i32>,
}

impl OpenRequest {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            line: None,
            column: None,
        }
    }

    /// Build a request from the host's calling convention, where `-1` means unset.
    pub fn from_host(file_path: impl Into<String>, line: i32, column: i32) -> Self {
        Self {
            file_path: file_path.into(),
            line: (line != HOST_UNSET).then_some(line),
            column: (column != HOST_UNSET).then_some(column),
        }
    }

    pub fn with_line(mut self, line: i32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_column(mut self, column: i32) -> Self {
        self.column = Some(column);
        self
    }

    /// Validate the path and resolve line/column defaults.
    pub fn normalize(&self) -> Result<CursorPosition> {
        if self.file_path.trim().is_empty() {
            return Err(Error::invalid_request("file path is empty"));
        }
        if self.file_path.contains('\0') {
            return Err(Error::invalid_request("file path contains a NUL byte"));
        }

        let line = match self.line {
            None | Some(HOST_UNSET) => DEFAULT_LINE,
            Some(n) if n >= 1 => n as u32,
            Some(n) => {
                return Err(Error::invalid_request(format!(
                    "line {} is out of range (expected >= 1)",
                    n
                )))
            }
        };

        let column = match self.column {
            None | Some(HOST_UNSET) => DEFAULT_COLUMN,
            Some(n) if n >= 0 => n as u32,
            Some(n) => {
                return Err(Error::invalid_request(format!(
                    "column {} is out of range (expected >= 0)",
                    n
                )))
            }
        };

        Ok(CursorPosition { line, column })
    }
}

/// A normalized cursor target. `line >= 1` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub line: u32,
    pub column: u32,
}

impl Default for CursorPosition {
    fn default() -> Self {
        Self {
            line: DEFAULT_LINE,
            column: DEFAULT_COLUMN,
        }
    }
}

impl fmt::Display for CursorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command Specs
// ─────────────────────────────────────────────────────────────────────────────

/// A fully structured external process invocation.
///
/// Arguments are handed to the OS as-is; nothing here passes through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub executable: String,
    pub arguments: Vec<String>,
    pub working_directory: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            arguments: Vec::new(),
            working_directory: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Render as a single line for logs and reports.
    ///
    /// Arguments with whitespace or quotes are wrapped in double quotes, with
    /// embedded double quotes doubled.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.arguments.iter().map(String::as_str))
            .map(quote_for_display)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote_for_display(arg: &str) -> String {
    if arg.is_empty() {
        return "\"\"".to_string();
    }
    if arg.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", arg.replace('"', "\"\""))
    } else {
        arg.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Asset Changes
// ─────────────────────────────────────────────────────────────────────────────

/// One batch of asset changes reported by the host (or the file watcher).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetChanges {
    #[serde(default)]
    pub added: BTreeSet<String>,
    #[serde(default)]
    pub deleted: BTreeSet<String>,
    #[serde(default)]
    pub moved: BTreeSet<String>,
    #[serde(default)]
    pub moved_from: BTreeSet<String>,
    #[serde(default)]
    pub imported: BTreeSet<String>,
}

impl AssetChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of added, deleted, moved and moved-from paths.
    pub fn changed_paths(&self) -> BTreeSet<String> {
        self.added
            .iter()
            .chain(&self.deleted)
            .chain(&self.moved)
            .chain(&self.moved_from)
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.moved.is_empty()
            && self.moved_from.is_empty()
            && self.imported.is_empty()
    }

    /// Total number of paths across all sets
    pub fn len(&self) -> usize {
        self.added.len()
            + self.deleted.len()
            + self.moved.len()
            + self.moved_from.len()
            + self.imported.len()
    }

    /// Fold another batch into this one.
    pub fn merge(&mut self, other: AssetChanges) {
        self.added.extend(other.added);
        self.deleted.extend(other.deleted);
        self.moved.extend(other.moved);
        self.moved_from.extend(other.moved_from);
        self.imported.extend(other.imported);
    }
}
