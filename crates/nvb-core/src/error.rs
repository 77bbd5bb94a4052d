//! Application error types with rich context

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Process Errors
    // ─────────────────────────────────────────────────────────────
    #[error("'{program}' not found. Ensure it is installed and in your PATH.")]
    ToolNotFound { program: String },

    #[error("Failed to spawn '{program}': {reason}")]
    ProcessSpawn { program: String, reason: String },

    #[error("'{program}' exited with code {code:?}: {stderr}")]
    ProcessExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("'{program}' did not finish within {after:?} and was killed")]
    ProcessTimeout { program: String, after: Duration },

    #[error("Failed while waiting for '{program}': {reason}")]
    ProcessWait { program: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Request Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid open request: {reason}")]
    InvalidRequest { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    // ─────────────────────────────────────────────────────────────
    // Project Generation Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Project generation error: {message}")]
    Generator { message: String },

    // ─────────────────────────────────────────────────────────────
    // Watcher/Channel Errors
    // ─────────────────────────────────────────────────────────────
    #[error("File watcher error: {message}")]
    Watcher { message: String },

    #[error("Channel send error: {message}")]
    ChannelSend { message: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn tool_not_found(program: impl Into<String>) -> Self {
        Self::ToolNotFound {
            program: program.into(),
        }
    }

    pub fn process_spawn(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProcessSpawn {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn process_exit(
        program: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ProcessExit {
            program: program.into(),
            code,
            stderr: stderr.into(),
        }
    }

    pub fn process_timeout(program: impl Into<String>, after: Duration) -> Self {
        Self::ProcessTimeout {
            program: program.into(),
            after,
        }
    }

    pub fn process_wait(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProcessWait {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    pub fn generator(message: impl Into<String>) -> Self {
        Self::Generator {
            message: message.into(),
        }
    }

    pub fn watcher(message: impl Into<String>) -> Self {
        Self::Watcher {
            message: message.into(),
        }
    }

    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors are reported to the user and the host carries on;
    /// the next request may well succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ProcessExit { .. }
                | Error::ProcessTimeout { .. }
                | Error::ProcessWait { .. }
                | Error::Generator { .. }
                | Error::Watcher { .. }
                | Error::ChannelSend { .. }
        )
    }

    /// Check if this error should stop the host
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ConfigInvalid { .. } | Error::ChannelClosed)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::tool_not_found("nvr");
        assert_eq!(
            err.to_string(),
            "'nvr' not found. Ensure it is installed and in your PATH."
        );

        let err = Error::process_exit("nvr", Some(1), "no server");
        assert!(err.to_string().contains("code Some(1)"));
        assert!(err.to_string().contains("no server"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_timeout_message_includes_duration() {
        let err = Error::process_timeout("nvr", Duration::from_millis(250));
        assert!(err.to_string().contains("250ms"));
        assert!(err.to_string().contains("killed"));
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::config_invalid("bad flags").is_fatal());
        assert!(Error::ChannelClosed.is_fatal());
        assert!(!Error::tool_not_found("nvr").is_fatal());
        assert!(!Error::generator("boom").is_fatal());
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::process_exit("nvr", Some(2), "").is_recoverable());
        assert!(Error::process_timeout("nvr", Duration::from_secs(1)).is_recoverable());
        assert!(Error::generator("failed").is_recoverable());
        assert!(Error::process_wait("nvr", "broken pipe").is_recoverable());
        assert!(!Error::invalid_request("empty path").is_recoverable());
        assert!(!Error::ChannelClosed.is_recoverable());
    }

    #[test]
    fn test_error_constructors() {
        let _ = Error::process_spawn("nvr", "permission denied");
        let _ = Error::config("test");
        let _ = Error::watcher("test");
        let _ = Error::channel_send("test");
    }

    #[test]
    fn test_result_ext_preserves_error() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.context("writing config").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
