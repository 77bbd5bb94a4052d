//! External editor launcher
//!
//! [`ExternalEditorLauncher`] is the core of neovim-bridge: it knows the fixed
//! set of editor installations, turns open requests into remote-control
//! commands, dispatches them, and forwards asset changes to the project
//! generator.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nvb_core::prelude::*;
use nvb_core::{AssetChanges, CommandSpec, CursorPosition, Installation, OpenRequest};
use nvb_process::{
    focus_command, parse_serverlist, resolve_servername, CommandRunner, RemoteControl,
    ToolAvailability,
};

use crate::config::Settings;
use crate::generation::{GenerationFlag, GenerationFlags, ProjectGenerator};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Why a launcher operation failed.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The process could not be created (missing executable, permissions, ...)
    #[error("Failed to start {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    /// Malformed path or un-normalizable line/column
    #[error("Invalid open request: {0}")]
    InvalidRequest(String),

    /// The tool started but exited with a failure status
    #[error("{program} exited with {}: {stderr}", exit_label(.code))]
    ExternalToolError {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A blocking wait exceeded its timeout; the child was killed
    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },

    /// The tool started but its exit status could not be collected
    #[error("Lost track of {program}: {reason}")]
    WaitFailed { program: String, reason: String },

    /// The project generator failed
    #[error("Project generation failed: {0}")]
    Generator(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

impl LaunchError {
    /// The program the failure is attributed to, if any
    pub fn program(&self) -> Option<&str> {
        match self {
            LaunchError::SpawnFailed { program, .. }
            | LaunchError::ExternalToolError { program, .. }
            | LaunchError::Timeout { program, .. }
            | LaunchError::WaitFailed { program, .. } => Some(program),
            LaunchError::InvalidRequest(_) | LaunchError::Generator(_) => None,
        }
    }
}

impl From<Error> for LaunchError {
    fn from(err: Error) -> Self {
        match err {
            Error::ToolNotFound { program } => LaunchError::SpawnFailed {
                program,
                reason: "executable not found".to_string(),
            },
            Error::ProcessSpawn { program, reason } => {
                LaunchError::SpawnFailed { program, reason }
            }
            Error::ProcessWait { program, reason } => LaunchError::WaitFailed { program, reason },
            Error::ProcessExit {
                program,
                code,
                stderr,
            } => LaunchError::ExternalToolError {
                program,
                code,
                stderr,
            },
            Error::ProcessTimeout { program, after } => LaunchError::Timeout { program, after },
            Error::InvalidRequest { reason } => LaunchError::InvalidRequest(reason),
            Error::Generator { message } => LaunchError::Generator(message),
            other => LaunchError::Generator(other.to_string()),
        }
    }
}

pub type LaunchResult<T> = std::result::Result<T, LaunchError>;

// ─────────────────────────────────────────────────────────────────────────────
// Launcher
// ─────────────────────────────────────────────────────────────────────────────

/// What [`ExternalEditorLauncher::open_file`] dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOutcome {
    /// Remote-control command that was run
    pub command: CommandSpec,
    /// File as handed to the editor (relative paths resolved)
    pub file: String,
    pub position: CursorPosition,
    /// Whether the focus command was dispatched
    pub focused: bool,
}

/// Resolve a request path against the project root. Absolute paths pass through.
pub fn resolve_file_path(path: &str, project_root: &Path) -> String {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        path.to_string()
    } else {
        project_root.join(candidate).display().to_string()
    }
}

/// Opens files in Neovim and keeps project files in sync.
///
/// The installation list is fixed at construction.
pub struct ExternalEditorLauncher<R, G> {
    installations: Vec<Installation>,
    remote: RemoteControl,
    focus: Option<CommandSpec>,
    timeout: Duration,
    project_root: PathBuf,
    runner: R,
    generator: G,
}

impl<R, G> ExternalEditorLauncher<R, G>
where
    R: CommandRunner + Sync,
    G: ProjectGenerator + Sync,
{
    pub fn new(
        installations: Vec<Installation>,
        remote: RemoteControl,
        focus: Option<CommandSpec>,
        timeout: Duration,
        project_root: PathBuf,
        runner: R,
        generator: G,
    ) -> Self {
        Self {
            installations,
            remote,
            focus,
            timeout,
            project_root,
            runner,
            generator,
        }
    }

    /// Build a launcher from project settings.
    ///
    /// The single Neovim installation points at the resolved remote-control
    /// executable, or at the configured name when it is not on `PATH`.
    pub fn from_settings(
        settings: &Settings,
        project_root: &Path,
        availability: &ToolAvailability,
        runner: R,
        generator: G,
    ) -> Self {
        let editor = &settings.editor;
        if let Some(message) = availability.remote_tool_unavailable_message() {
            warn!("{}", message);
        }

        let installation = Installation::new(
            editor.display_name.clone(),
            availability.remote_tool_location(),
        );
        let remote = RemoteControl::new(
            availability.remote_tool_location(),
            resolve_servername(&editor.servername),
        )
        .with_working_directory(project_root);

        info!(
            "Editor launcher ready: {} via {} (server {})",
            installation.name,
            remote.tool(),
            remote.servername()
        );

        Self::new(
            vec![installation],
            remote,
            focus_command(&editor.focus_app),
            editor.command_timeout(),
            project_root.to_path_buf(),
            runner,
            generator,
        )
    }

    pub fn list_installations(&self) -> &[Installation] {
        &self.installations
    }

    /// Exact match on installation path.
    pub fn find_installation(&self, path: &str) -> Option<&Installation> {
        self.installations.iter().find(|i| i.path == path)
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn remote(&self) -> &RemoteControl {
        &self.remote
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Normalize `request` and build the remote-control command for it.
    pub fn build_open_command(
        &self,
        request: &OpenRequest,
    ) -> LaunchResult<(CommandSpec, String, CursorPosition)> {
        let position = request.normalize()?;
        let file = resolve_file_path(&request.file_path, &self.project_root);
        let command = self.remote.open_command(&file, position);
        Ok((command, file, position))
    }

    /// Open a file in the running Neovim and bring the editor to the front.
    ///
    /// Success means the remote-control tool accepted the command. A focus
    /// failure is logged and reported through [`OpenOutcome::focused`].
    pub async fn open_file(&self, request: &OpenRequest) -> LaunchResult<OpenOutcome> {
        let (command, file, position) = self.build_open_command(request)?;

        info!("Opening {} at {}", file, position);
        self.runner.run_captured(&command, self.timeout).await?;

        let focused = match &self.focus {
            Some(focus) => match self.runner.spawn_detached(focus) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Failed to focus editor with {}: {}", focus, e);
                    false
                }
            },
            None => false,
        };

        Ok(OpenOutcome {
            command,
            file,
            position,
            focused,
        })
    }

    /// Forward one batch of asset changes to the project generator.
    ///
    /// An empty batch never reaches the external generator command.
    pub async fn sync_if_needed(&self, changes: &AssetChanges) -> LaunchResult<()> {
        debug!("Sync requested for {} path(s)", changes.len());
        self.generator
            .sync_if_needed(&changes.changed_paths(), &changes.imported, false)
            .await?;
        Ok(())
    }

    /// Sync with no asset changes. With `check_project_files`, missing or
    /// stale project files are regenerated.
    pub async fn sync_project_files(&self, check_project_files: bool) -> LaunchResult<()> {
        debug!("Project file sync requested (check: {})", check_project_files);
        let none = BTreeSet::new();
        self.generator
            .sync_if_needed(&none, &none, check_project_files)
            .await?;
        Ok(())
    }

    /// Full sync request: empty change sets plus a project-file check.
    pub async fn sync_all(&self) -> LaunchResult<()> {
        self.sync_project_files(true).await
    }

    /// Regenerate every project file.
    pub async fn regenerate(&self) -> LaunchResult<()> {
        self.generator.sync().await?;
        Ok(())
    }

    pub fn generation_flags(&self) -> &GenerationFlags {
        self.generator.flags()
    }

    /// Flip a generation flag. Returns whether it is enabled afterwards.
    pub fn toggle_generation_flag(&mut self, flag: GenerationFlag) -> bool {
        let enabled = self.generator.toggle_flag(flag);
        debug!("Generation flag {} -> {}", flag.key(), enabled);
        enabled
    }

    /// Servers the remote-control tool can see.
    pub async fn running_servers(&self) -> LaunchResult<Vec<String>> {
        let output = self
            .runner
            .run_captured(&self.remote.serverlist_command(), self.timeout)
            .await?;
        Ok(parse_serverlist(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_file_path, ExternalEditorLauncher, LaunchError};
    use crate::config::Settings;
    use crate::generation::{GenerationFlag, GenerationFlags, NullProjectGenerator};
    use nvb_core::{AssetChanges, CommandSpec, Error, Installation, OpenRequest};
    use nvb_process::test_utils::{FakeOutcome, RecordingRunner, RunMode};
    use nvb_process::{RemoteControl, ToolAvailability};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn launcher(
        runner: RecordingRunner,
    ) -> ExternalEditorLauncher<RecordingRunner, NullProjectGenerator> {
        ExternalEditorLauncher::new(
            vec![Installation::new("Neovim", "/usr/local/bin/nvr")],
            RemoteControl::new("nvr", "/tmp/nvimsocket").with_working_directory("/project"),
            Some(CommandSpec::new("open").arg("/Applications/Alacritty.app/")),
            Duration::from_secs(5),
            PathBuf::from("/project"),
            runner,
            NullProjectGenerator::new(GenerationFlags::default()),
        )
    }

    #[test]
    fn test_find_installation_exact_match() {
        let launcher = launcher(RecordingRunner::new());
        let found = launcher.find_installation("/usr/local/bin/nvr").unwrap();
        assert_eq!(found.name, "Neovim");
        assert!(launcher.find_installation("/usr/local/bin").is_none());
        assert!(launcher.find_installation("/usr/local/bin/nvr/").is_none());
    }

    #[test]
    fn test_every_listed_installation_is_findable() {
        let launcher = launcher(RecordingRunner::new());
        for installation in launcher.list_installations() {
            let found = launcher.find_installation(&installation.path).unwrap();
            assert!(!found.name.is_empty());
        }
    }

    #[tokio::test]
    async fn test_open_file_dispatches_cursor_then_focus() {
        let launcher = launcher(RecordingRunner::new());
        let request = OpenRequest::from_host("/tmp/foo.cs", 10, 3);

        let outcome = launcher.open_file(&request).await.unwrap();
        assert!(outcome.focused);
        assert_eq!(outcome.file, "/tmp/foo.cs");

        let line = outcome.command.command_line();
        assert!(line.contains("cursor(10, 3)"));
        assert!(line.contains("/tmp/foo.cs"));

        let calls = launcher.runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, RunMode::Captured);
        assert_eq!(calls[1].0, RunMode::Detached);
        assert_eq!(calls[1].1.executable, "open");
    }

    #[tokio::test]
    async fn test_open_file_unset_position_uses_defaults() {
        let launcher = launcher(RecordingRunner::new());
        let outcome = launcher
            .open_file(&OpenRequest::from_host("/tmp/bar.cs", -1, -1))
            .await
            .unwrap();
        assert!(outcome.command.command_line().contains("cursor(1, 0)"));
    }

    #[tokio::test]
    async fn test_open_file_resolves_relative_path() {
        let launcher = launcher(RecordingRunner::new());
        let outcome = launcher
            .open_file(&OpenRequest::new("Assets/Player.cs"))
            .await
            .unwrap();
        assert_eq!(outcome.file, "/project/Assets/Player.cs");
        assert_eq!(
            outcome.command.working_directory,
            Some(PathBuf::from("/project"))
        );
    }

    #[tokio::test]
    async fn test_open_file_rejects_bad_line_without_spawning() {
        let launcher = launcher(RecordingRunner::new());
        let err = launcher
            .open_file(&OpenRequest::new("/tmp/foo.cs").with_line(0))
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::InvalidRequest(_)));
        assert_eq!(launcher.runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_open_file_missing_tool_is_spawn_failed() {
        let launcher = launcher(RecordingRunner::with_outcomes([FakeOutcome::NotFound]));
        let err = launcher
            .open_file(&OpenRequest::new("/tmp/foo.cs"))
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::SpawnFailed { ref program, .. } if program == "nvr"));
        // No focus attempt after a failed open
        assert_eq!(launcher.runner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_open_file_non_zero_exit() {
        let launcher = launcher(RecordingRunner::with_outcomes([FakeOutcome::Exit(
            1,
            "no server at /tmp/nvimsocket".to_string(),
        )]));
        let err = launcher
            .open_file(&OpenRequest::new("/tmp/foo.cs"))
            .await
            .unwrap_err();
        match err {
            LaunchError::ExternalToolError { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("no server"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_open_file_timeout() {
        let launcher = launcher(RecordingRunner::with_outcomes([FakeOutcome::Timeout]));
        let err = launcher
            .open_file(&OpenRequest::new("/tmp/foo.cs"))
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_open_file_wait_failure_names_program() {
        let launcher = launcher(RecordingRunner::with_outcomes([FakeOutcome::WaitFailure(
            "pipe closed".to_string(),
        )]));
        let err = launcher
            .open_file(&OpenRequest::new("/tmp/foo.cs"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, LaunchError::WaitFailed { ref program, .. } if program == "nvr"),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_focus_failure_does_not_fail_open() {
        let launcher = launcher(RecordingRunner::with_outcomes([
            FakeOutcome::Success(String::new()),
            FakeOutcome::SpawnFailure("permission denied".to_string()),
        ]));
        let outcome = launcher
            .open_file(&OpenRequest::new("/tmp/foo.cs"))
            .await
            .unwrap();
        assert!(!outcome.focused);
    }

    #[tokio::test]
    async fn test_sync_with_null_generator_spawns_nothing() {
        let launcher = launcher(RecordingRunner::new());
        launcher.sync_if_needed(&AssetChanges::new()).await.unwrap();
        launcher.sync_all().await.unwrap();
        launcher.regenerate().await.unwrap();
        assert_eq!(launcher.runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_running_servers() {
        let launcher = launcher(RecordingRunner::with_outcomes([FakeOutcome::Success(
            "/tmp/nvimsocket\n/tmp/other\n".to_string(),
        )]));
        let servers = launcher.running_servers().await.unwrap();
        assert_eq!(servers, vec!["/tmp/nvimsocket", "/tmp/other"]);
        assert_eq!(launcher.runner.commands()[0].arguments, vec!["--serverlist"]);
    }

    #[test]
    fn test_toggle_generation_flag() {
        let mut launcher = launcher(RecordingRunner::new());
        assert!(!launcher.generation_flags().contains(GenerationFlag::Git));
        assert!(launcher.toggle_generation_flag(GenerationFlag::Git));
        assert!(!launcher.toggle_generation_flag(GenerationFlag::Git));
        assert_eq!(launcher.generation_flags(), &GenerationFlags::default());
    }

    #[test]
    fn test_from_settings_uses_configured_name_when_tool_missing() {
        let mut settings = Settings::default();
        settings.editor.remote_tool = "definitely-not-a-real-nvr".to_string();
        settings.editor.servername = "/tmp/configured.sock".to_string();
        settings.editor.focus_app = String::new();

        let availability = ToolAvailability::check(&settings.editor.remote_tool);
        let launcher = ExternalEditorLauncher::from_settings(
            &settings,
            Path::new("/project"),
            &availability,
            RecordingRunner::new(),
            NullProjectGenerator::default(),
        );

        let installations = launcher.list_installations();
        assert_eq!(installations.len(), 1);
        assert_eq!(installations[0].name, "Neovim");
        assert_eq!(installations[0].path, "definitely-not-a-real-nvr");
        assert_eq!(launcher.remote().servername(), "/tmp/configured.sock");
        assert!(launcher.focus.is_none());
    }

    #[test]
    fn test_resolve_file_path() {
        assert_eq!(resolve_file_path("/abs/a.cs", Path::new("/p")), "/abs/a.cs");
        assert_eq!(resolve_file_path("rel/a.cs", Path::new("/p")), "/p/rel/a.cs");
    }

    #[test]
    fn test_launch_error_from_core_error() {
        let err: LaunchError = Error::tool_not_found("nvr").into();
        assert!(matches!(err, LaunchError::SpawnFailed { .. }));
        assert_eq!(err.program(), Some("nvr"));

        let err: LaunchError = Error::invalid_request("empty").into();
        assert!(matches!(err, LaunchError::InvalidRequest(_)));
        assert_eq!(err.program(), None);

        let err: LaunchError = Error::process_exit("nvr", None, "killed").into();
        assert_eq!(err.to_string(), "nvr exited with a signal: killed");

        let err: LaunchError = Error::process_wait("nvr", "pipe closed").into();
        assert!(matches!(err, LaunchError::WaitFailed { .. }));
        assert_eq!(err.program(), Some("nvr"));
        assert_eq!(err.to_string(), "Lost track of nvr: pipe closed");
    }
}
