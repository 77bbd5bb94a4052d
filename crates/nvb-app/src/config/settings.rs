//! Settings parser for .nvb/config.toml

use super::types::Settings;
use nvb_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const NVB_DIR: &str = ".nvb";

/// Path of the settings file for a project
pub fn config_path(project_path: &Path) -> PathBuf {
    project_path.join(NVB_DIR).join(CONFIG_FILENAME)
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from .nvb/config.toml
///
/// Returns default settings if file doesn't exist or can't be parsed.
pub fn load_settings(project_path: &Path) -> Settings {
    match read_settings(project_path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("{}; using defaults", e);
            Settings::default()
        }
    }
}

/// Load settings from .nvb/config.toml without falling back
///
/// A missing file still means defaults. A file that exists but cannot be
/// read or parsed is an error, so callers that write settings back never
/// replace it with defaults.
pub fn read_settings(project_path: &Path) -> Result<Settings> {
    let config_path = config_path(project_path);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::config(format!("Failed to read {}: {}", config_path.display(), e))
    })?;
    let settings = toml::from_str(&content)
        .map_err(|e| Error::config_invalid(format!("{}: {}", config_path.display(), e)))?;

    debug!("Loaded settings from {:?}", config_path);
    Ok(settings)
}

/// Create default config file in .nvb/ directory
///
/// Idempotent: an existing config.toml is left untouched. Returns whether a
/// new file was written.
pub fn init_config_dir(project_path: &Path) -> Result<bool> {
    let nvb_dir = project_path.join(NVB_DIR);

    if !nvb_dir.exists() {
        std::fs::create_dir_all(&nvb_dir)
            .map_err(|e| Error::config(format!("Failed to create .nvb dir: {}", e)))?;
    }

    let config_path = nvb_dir.join(CONFIG_FILENAME);
    if config_path.exists() {
        debug!("{:?} already exists, leaving it alone", config_path);
        return Ok(false);
    }

    std::fs::write(&config_path, generate_default_config())
        .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
    info!("Created default {:?}", config_path);

    Ok(true)
}

/// Save settings to .nvb/config.toml
///
/// Uses atomic write (temp file + rename) for safety.
pub fn save_settings(project_path: &Path, settings: &Settings) -> Result<()> {
    let nvb_dir = project_path.join(NVB_DIR);

    if !nvb_dir.exists() {
        std::fs::create_dir_all(&nvb_dir)
            .map_err(|e| Error::config(format!("Failed to create .nvb dir: {}", e)))?;
    }

    let config_path = nvb_dir.join(CONFIG_FILENAME);
    let temp_path = nvb_dir.join(".config.toml.tmp");

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;

    let full_content = format!("{}{}", generate_config_header(), content);

    // Atomic write: write to temp, then rename
    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, &config_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", config_path);
    Ok(())
}

fn generate_config_header() -> String {
    r#"# neovim-bridge configuration
# Generated by nvb

"#
    .to_string()
}

fn generate_default_config() -> String {
    let focus_app = nvb_process::DEFAULT_FOCUS_APP;
    format!(
        r#"# neovim-bridge configuration

[editor]
display_name = "Neovim"
# Remote-control client (https://github.com/mhinz/neovim-remote)
remote_tool = "nvr"
# Neovim server socket. Empty = $NVIM_LISTEN_ADDRESS, then ~/.cache/nvimsocket
servername = ""
# Application to bring to the front after opening a file. Empty = none
# macOS: an .app bundle path, e.g. "/Applications/Alacritty.app/"
# Elsewhere: an executable to run, e.g. a script around wmctrl
focus_app = "{focus_app}"
command_timeout_ms = 5000

[generation]
# Package sources that get project files:
#   embedded, local, registry, git, built_in, local_tarball, unknown, player_assemblies
flags = ["embedded", "local"]
# External project generator (argv). Empty = no generator
command = []
timeout_ms = 60000

[watcher]
paths = ["Assets", "Packages"]
debounce_ms = 500
extensions = ["cs", "asmdef", "asmref"]
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationFlag;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let settings = load_settings(temp.path());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        let nvb_dir = temp.path().join(".nvb");
        std::fs::create_dir_all(&nvb_dir).unwrap();

        let config = r#"
[editor]
remote_tool = "/opt/bin/nvr"
command_timeout_ms = 1500

[watcher]
debounce_ms = 1000
"#;
        std::fs::write(nvb_dir.join("config.toml"), config).unwrap();

        let settings = load_settings(temp.path());
        assert_eq!(settings.editor.remote_tool, "/opt/bin/nvr");
        assert_eq!(settings.editor.command_timeout_ms, 1500);
        assert_eq!(settings.watcher.debounce_ms, 1000);
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        let nvb_dir = temp.path().join(".nvb");
        std::fs::create_dir_all(&nvb_dir).unwrap();

        std::fs::write(nvb_dir.join("config.toml"), "not valid toml {{{{").unwrap();

        // Should return defaults
        let settings = load_settings(temp.path());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_read_settings_rejects_invalid_value() {
        let temp = tempdir().unwrap();
        let nvb_dir = temp.path().join(".nvb");
        std::fs::create_dir_all(&nvb_dir).unwrap();

        let config = r#"
[generation]
command = ["my-gen"]
timeout_ms = "oops"
"#;
        std::fs::write(nvb_dir.join("config.toml"), config).unwrap();

        let err = read_settings(temp.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_read_settings_missing_file_is_default() {
        let temp = tempdir().unwrap();
        assert_eq!(read_settings(temp.path()).unwrap(), Settings::default());
    }

    #[test]
    fn test_init_config_dir() {
        let temp = tempdir().unwrap();

        assert!(init_config_dir(temp.path()).unwrap());
        assert!(config_path(temp.path()).exists());

        // Content should be valid TOML and match the defaults
        let content = std::fs::read_to_string(config_path(temp.path())).unwrap();
        let parsed: Settings =
            toml::from_str(&content).expect("Default config should be valid TOML");
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn test_init_config_dir_idempotent() {
        let temp = tempdir().unwrap();

        init_config_dir(temp.path()).unwrap();

        let path = config_path(temp.path());
        std::fs::write(&path, "[editor]\nremote_tool = \"custom\"\n").unwrap();

        // Second init should not overwrite
        assert!(!init_config_dir(temp.path()).unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("custom"));
    }

    #[test]
    fn test_save_then_load() {
        let temp = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.generation.flags.toggle(GenerationFlag::Git);
        settings.editor.servername = "/tmp/nvim.sock".to_string();

        save_settings(temp.path(), &settings).unwrap();

        let loaded = load_settings(temp.path());
        assert_eq!(loaded, settings);
        assert!(!temp.path().join(".nvb/.config.toml.tmp").exists());

        let content = std::fs::read_to_string(config_path(temp.path())).unwrap();
        assert!(content.starts_with("# neovim-bridge configuration"));
    }
}
