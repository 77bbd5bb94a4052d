//! Desktop focus after a file has been sent to the editor
//!
//! The editor runs inside a terminal emulator, so bringing it forward means
//! activating that terminal application. Only macOS has a generic command for
//! this (`open <bundle>`); elsewhere the configured value is run directly,
//! typically a small script around the window manager.

use nvb_core::CommandSpec;

/// Application activated after opening a file
#[cfg(target_os = "macos")]
pub const DEFAULT_FOCUS_APP: &str = "/Applications/Alacritty.app/";

/// Application activated after opening a file (none outside macOS)
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_FOCUS_APP: &str = "";

/// Build the "activate application" command for this platform.
///
/// Returns `None` when no focus app is configured.
pub fn focus_command(app: &str) -> Option<CommandSpec> {
    build_focus_command(app, cfg!(target_os = "macos"))
}

fn build_focus_command(app: &str, macos: bool) -> Option<CommandSpec> {
    let app = app.trim();
    if app.is_empty() {
        return None;
    }

    if macos {
        Some(CommandSpec::new("open").arg(app))
    } else {
        Some(CommandSpec::new(app))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_app_has_no_command() {
        assert!(build_focus_command("", true).is_none());
        assert!(build_focus_command("   ", false).is_none());
    }

    #[test]
    fn test_macos_uses_open() {
        let spec = build_focus_command("/Applications/Alacritty.app/", true).unwrap();
        assert_eq!(spec.executable, "open");
        assert_eq!(spec.arguments, vec!["/Applications/Alacritty.app/"]);
    }

    #[test]
    fn test_other_platforms_run_configured_command() {
        let spec = build_focus_command("/usr/local/bin/focus-terminal", false).unwrap();
        assert_eq!(spec.executable, "/usr/local/bin/focus-terminal");
        assert!(spec.arguments.is_empty());
    }

    #[test]
    fn test_default_focus_app_matches_platform() {
        if cfg!(target_os = "macos") {
            assert!(focus_command(DEFAULT_FOCUS_APP).is_some());
        } else {
            assert!(focus_command(DEFAULT_FOCUS_APP).is_none());
        }
    }
}
