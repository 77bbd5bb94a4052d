//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "NVB_LOG";

const DEFAULT_FILTER: &str = "neovim_bridge=info,nvb_app=info,nvb_process=info,warn";
const LOG_FILE_NAME: &str = "nvb.log";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/neovim-bridge/logs/` (platform data dir).
/// Log level is controlled by the `NVB_LOG` environment variable. Stdout is
/// left alone so `--json` output stays machine-readable.
///
/// # Examples
/// ```bash
/// NVB_LOG=debug nvb open Assets/Player.cs --line 12
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("neovim-bridge starting (log directory: {})", log_dir.display());

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("neovim-bridge").join("logs"))
}

/// Get the log file path for the current day
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_lives_under_app_directory() {
        let file = get_current_log_file().unwrap();
        assert!(file.ends_with("neovim-bridge/logs/nvb.log"));
    }
}
