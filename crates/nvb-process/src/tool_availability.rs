//! Tool availability checking
//!
//! Resolves the remote-control client on `PATH` once at startup. The result
//! feeds the installation list the host sees.

use std::path::PathBuf;

use tracing::debug;

/// Availability of the external tools neovim-bridge drives
#[derive(Debug, Clone, Default)]
pub struct ToolAvailability {
    /// Name the remote-control client was looked up by
    pub remote_tool: String,

    /// Resolved path of the remote-control client, if found
    pub remote_tool_path: Option<PathBuf>,
}

impl ToolAvailability {
    /// Check tool availability (run once at startup)
    pub fn check(remote_tool: &str) -> Self {
        let remote_tool_path = which::which(remote_tool)
            .map(|path| dunce::simplified(&path).to_path_buf())
            .inspect_err(|e| debug!("'{}' lookup failed: {}", remote_tool, e))
            .ok();

        Self {
            remote_tool: remote_tool.to_string(),
            remote_tool_path,
        }
    }

    pub fn remote_tool_available(&self) -> bool {
        self.remote_tool_path.is_some()
    }

    /// Path to hand to the host: the resolved executable, or the bare name.
    pub fn remote_tool_location(&self) -> String {
        self.remote_tool_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.remote_tool.clone())
    }

    /// Get user-friendly message for a missing remote-control client
    pub fn remote_tool_unavailable_message(&self) -> Option<String> {
        if self.remote_tool_available() {
            None
        } else {
            Some(format!(
                "'{}' not found in PATH. Install neovim-remote (pip install neovim-remote) \
                 or set editor.remote_tool in .nvb/config.toml.",
                self.remote_tool
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_availability_default() {
        let availability = ToolAvailability::default();
        assert!(!availability.remote_tool_available());
        assert!(availability.remote_tool_unavailable_message().is_some());
    }

    #[test]
    fn test_missing_tool_falls_back_to_name() {
        let availability = ToolAvailability::check("definitely-not-a-real-tool-nvb");
        assert!(!availability.remote_tool_available());
        assert_eq!(
            availability.remote_tool_location(),
            "definitely-not-a-real-tool-nvb"
        );
        assert!(availability
            .remote_tool_unavailable_message()
            .unwrap()
            .contains("definitely-not-a-real-tool-nvb"));
    }

    #[cfg(unix)]
    #[test]
    fn test_present_tool_resolves_to_path() {
        let availability = ToolAvailability::check("sh");
        assert!(availability.remote_tool_available());
        assert!(availability.remote_tool_location().ends_with("sh"));
        assert!(availability.remote_tool_unavailable_message().is_none());
    }
}
