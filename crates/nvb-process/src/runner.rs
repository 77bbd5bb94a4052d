//! Scoped process execution
//!
//! Every child spawned here is either waited on with a timeout (and killed
//! when the timeout fires) or handed to a background task that reaps it.
//! No child handle is ever dropped unobserved.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::time::timeout;

use nvb_core::prelude::*;
use nvb_core::CommandSpec;

/// Default timeout for blocking, captured commands
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Output of a command that ran to completion with a zero exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Process-execution primitive used by the launcher and the project generator.
#[trait_variant::make(CommandRunner: Send)]
pub trait LocalCommandRunner {
    /// Run a command to completion, capturing its output.
    ///
    /// Fails with [`Error::ProcessTimeout`] (after killing the child) when the
    /// command outlives `timeout`, and with [`Error::ProcessExit`] on a
    /// non-zero exit status.
    async fn run_captured(&self, spec: &CommandSpec, timeout: Duration) -> Result<CapturedOutput>;

    /// Spawn a command without waiting for it. Returns the child's PID if known.
    fn spawn_detached(&self, spec: &CommandSpec) -> Result<Option<u32>>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run_captured(
        &self,
        spec: &CommandSpec,
        timeout_duration: Duration,
    ) -> Result<CapturedOutput> {
        let start = Instant::now();
        debug!("Running: {}", spec);

        let child = build_command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&spec.executable, e))?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = timeout(timeout_duration, child.wait_with_output())
            .await
            .map_err(|_| {
                warn!(
                    "'{}' timed out after {:?}, killing it",
                    spec.executable, timeout_duration
                );
                Error::process_timeout(&spec.executable, timeout_duration)
            })?
            .map_err(|e| wait_error(&spec.executable, e))?;

        let elapsed = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stderr.is_empty() {
            debug!("{} stderr: {}", spec.executable, stderr.trim_end());
        }

        if !output.status.success() {
            return Err(Error::process_exit(
                &spec.executable,
                output.status.code(),
                stderr.trim(),
            ));
        }

        debug!("'{}' finished in {:?}", spec.executable, elapsed);

        Ok(CapturedOutput {
            code: output.status.code(),
            stdout,
            stderr,
            elapsed,
        })
    }

    fn spawn_detached(&self, spec: &CommandSpec) -> Result<Option<u32>> {
        debug!("Spawning (detached): {}", spec);

        let mut child = build_command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(&spec.executable, e))?;

        let pid = child.id();
        let program = spec.executable.clone();

        // Reaper task owns the child from here on.
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    debug!("'{}' (pid {:?}) exited cleanly", program, pid)
                }
                Ok(status) => warn!("'{}' (pid {:?}) exited with {}", program, pid, status),
                Err(e) => warn!("Error waiting for '{}': {}", program, e),
            }
        });

        Ok(pid)
    }
}

fn build_command(spec: &CommandSpec) -> Command {
    let mut command = Command::new(&spec.executable);
    command.args(&spec.arguments);
    if let Some(dir) = &spec.working_directory {
        command.current_dir(dir);
    }
    command
}

fn spawn_error(program: &str, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::tool_not_found(program)
    } else {
        Error::process_spawn(program, e.to_string())
    }
}

/// The child started; a failure now is not a spawn failure.
fn wait_error(program: &str, e: std::io::Error) -> Error {
    Error::process_wait(program, e.to_string())
}
