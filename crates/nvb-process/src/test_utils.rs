//! Test utilities for process execution
//!
//! Provides a [`RecordingRunner`] that records every command it is asked to
//! run and answers with scripted outcomes instead of spawning anything.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use nvb_core::{CommandSpec, Error, Result};

use super::runner::{CapturedOutput, CommandRunner};

/// Scripted answer for one recorded command.
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    /// Exit 0 with the given stdout
    Success(String),
    /// Non-zero exit with the given code and stderr
    Exit(i32, String),
    /// Executable not found
    NotFound,
    /// Spawn failed for another reason
    SpawnFailure(String),
    /// Blocking wait exceeded its timeout
    Timeout,
    /// Started, but collecting the exit status failed
    WaitFailure(String),
}

impl FakeOutcome {
    fn into_captured(self, program: &str, timeout: Duration) -> Result<CapturedOutput> {
        match self {
            FakeOutcome::Success(stdout) => Ok(CapturedOutput {
                code: Some(0),
                stdout,
                stderr: String::new(),
                elapsed: Duration::ZERO,
            }),
            FakeOutcome::Exit(code, stderr) => {
                Err(Error::process_exit(program, Some(code), stderr))
            }
            FakeOutcome::NotFound => Err(Error::tool_not_found(program)),
            FakeOutcome::SpawnFailure(reason) => Err(Error::process_spawn(program, reason)),
            FakeOutcome::Timeout => Err(Error::process_timeout(program, timeout)),
            FakeOutcome::WaitFailure(reason) => Err(Error::process_wait(program, reason)),
        }
    }
}

/// Which primitive a command was sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Captured,
    Detached,
}

/// A [`CommandRunner`] that records commands and replays scripted outcomes.
///
/// Outcomes are consumed in order; once the script is exhausted every
/// command succeeds with empty output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<(RunMode, CommandSpec)>>,
    script: Mutex<VecDeque<FakeOutcome>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner that answers with `outcomes`, in order.
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = FakeOutcome>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    /// All recorded commands, in call order.
    pub fn calls(&self) -> Vec<(RunMode, CommandSpec)> {
        self.calls.lock().unwrap().clone()
    }

    /// Just the command specs, in call order.
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.calls().into_iter().map(|(_, spec)| spec).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, mode: RunMode, spec: &CommandSpec) -> FakeOutcome {
        self.calls.lock().unwrap().push((mode, spec.clone()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| FakeOutcome::Success(String::new()))
    }
}

impl CommandRunner for RecordingRunner {
    async fn run_captured(&self, spec: &CommandSpec, timeout: Duration) -> Result<CapturedOutput> {
        self.record(RunMode::Captured, spec)
            .into_captured(&spec.executable, timeout)
    }

    fn spawn_detached(&self, spec: &CommandSpec) -> Result<Option<u32>> {
        self.record(RunMode::Detached, spec)
            .into_captured(&spec.executable, Duration::ZERO)
            .map(|_| Some(4242))
    }
}
