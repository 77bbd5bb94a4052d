//! Configuration types for neovim-bridge
//!
//! Defines:
//! - `Settings` - Project settings (`.nvb/config.toml`)
//! - `EditorSettings`, `GenerationSettings`, `WatcherSettings` - its sections

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::generation::GenerationFlags;

/// Application settings (.nvb/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub editor: EditorSettings,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub watcher: WatcherSettings,
}

/// External editor settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EditorSettings {
    /// Name shown to the host for the installation
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Remote-control client used to talk to the running Neovim
    #[serde(default = "default_remote_tool")]
    pub remote_tool: String,

    /// Neovim server socket. Empty = `$NVIM_LISTEN_ADDRESS` or `~/.cache/nvimsocket`
    #[serde(default)]
    pub servername: String,

    /// Application brought to the front after a file is opened. Empty = none
    #[serde(default = "default_focus_app")]
    pub focus_app: String,

    /// Upper bound on how long a remote-control call may take
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            remote_tool: default_remote_tool(),
            servername: String::new(),
            focus_app: default_focus_app(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl EditorSettings {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

fn default_display_name() -> String {
    "Neovim".to_string()
}

fn default_remote_tool() -> String {
    nvb_process::DEFAULT_REMOTE_TOOL.to_string()
}

fn default_focus_app() -> String {
    nvb_process::DEFAULT_FOCUS_APP.to_string()
}

fn default_command_timeout_ms() -> u64 {
    5000
}

/// Project-file generation settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationSettings {
    /// Package sources that get project files
    #[serde(default)]
    pub flags: GenerationFlags,

    /// External generator command (argv). Empty = no generator
    #[serde(default)]
    pub command: Vec<String>,

    /// Upper bound on how long one generator run may take
    #[serde(default = "default_generation_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            flags: GenerationFlags::default(),
            command: Vec::new(),
            timeout_ms: default_generation_timeout_ms(),
        }
    }
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_generation_timeout_ms() -> u64 {
    60_000
}

/// File watcher settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WatcherSettings {
    /// Paths to watch, relative to the project root
    #[serde(default = "default_watch_paths")]
    pub paths: Vec<String>,

    /// Debounce window for batching change events
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// File extensions that count as asset changes (empty = all)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            paths: default_watch_paths(),
            debounce_ms: default_debounce_ms(),
            extensions: default_extensions(),
        }
    }
}

fn default_watch_paths() -> Vec<String> {
    vec!["Assets".to_string(), "Packages".to_string()]
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_extensions() -> Vec<String> {
    vec!["cs".to_string(), "asmdef".to_string(), "asmref".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationFlag;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.editor.remote_tool, "nvr");
        assert_eq!(settings.editor.display_name, "Neovim");
        assert!(settings.editor.servername.is_empty());
        assert_eq!(settings.editor.command_timeout(), Duration::from_secs(5));
        assert!(settings.generation.command.is_empty());
        assert_eq!(settings.generation.timeout(), Duration::from_secs(60));
        assert_eq!(settings.watcher.debounce_ms, 500);
        assert_eq!(settings.watcher.paths, vec!["Assets", "Packages"]);
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let toml = r#"
[editor]
servername = "/tmp/nvim.sock"

[generation]
flags = ["git", "registry"]
"#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.editor.servername, "/tmp/nvim.sock");
        assert_eq!(settings.editor.remote_tool, "nvr");
        assert!(settings.generation.flags.contains(GenerationFlag::Git));
        assert!(settings.generation.flags.contains(GenerationFlag::Registry));
        assert!(!settings.generation.flags.contains(GenerationFlag::Embedded));
        assert_eq!(settings.watcher, WatcherSettings::default());
    }

    #[test]
    fn test_settings_rejects_unknown_flag() {
        let toml = r#"
[generation]
flags = ["nuget"]
"#;
        assert!(toml::from_str::<Settings>(toml).is_err());
    }

    #[test]
    fn test_settings_round_trip() {
        let mut settings = Settings::default();
        settings.editor.focus_app = String::new();
        settings.generation.command = vec!["gen".to_string(), "--fast".to_string()];
        settings.generation.flags.toggle(GenerationFlag::PlayerAssemblies);

        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
