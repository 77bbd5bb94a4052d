//! Host plugin boundary
//!
//! The editor host speaks a small, lossy contract: integers with `-1`
//! sentinels in, booleans out. [`HostAdapter`] translates that contract onto
//! [`ExternalEditorLauncher`] and reports every outcome through a
//! [`Notifier`], so failures are surfaced without ever reaching the host as
//! an error.

use std::collections::BTreeSet;

use serde::Serialize;

use nvb_core::prelude::*;
use nvb_core::{AssetChanges, CursorPosition, Installation, OpenRequest};
use nvb_process::CommandRunner;

use crate::editor::{ExternalEditorLauncher, LaunchError};
use crate::generation::ProjectGenerator;

/// Something the host should be told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// A file was delivered to the editor
    FileOpened {
        file: String,
        line: u32,
        column: u32,
        command: String,
        focused: bool,
    },

    /// A file could not be opened
    OpenFailed { file: String, error: String },

    /// Asset changes were forwarded to the project generator
    ProjectSynced { changed: usize, imported: usize },

    /// Full regeneration finished
    ProjectRegenerated,

    /// A sync or regeneration failed
    SyncFailed { error: String },
}

impl HostEvent {
    pub fn file_opened(
        file: impl Into<String>,
        position: CursorPosition,
        command: impl Into<String>,
        focused: bool,
    ) -> Self {
        Self::FileOpened {
            file: file.into(),
            line: position.line,
            column: position.column,
            command: command.into(),
            focused,
        }
    }

    pub fn open_failed(file: impl Into<String>, error: &LaunchError) -> Self {
        Self::OpenFailed {
            file: file.into(),
            error: error.to_string(),
        }
    }

    pub fn sync_failed(error: &LaunchError) -> Self {
        Self::SyncFailed {
            error: error.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::OpenFailed { .. } | Self::SyncFailed { .. })
    }
}

/// Receives host-facing notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, event: &HostEvent);
}

/// [`Notifier`] that only writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &HostEvent) {
        if event.is_failure() {
            warn!("{:?}", event);
        } else {
            info!("{:?}", event);
        }
    }
}

/// Adapts [`ExternalEditorLauncher`] to the host plugin contract.
pub struct HostAdapter<R, G, N> {
    launcher: ExternalEditorLauncher<R, G>,
    notifier: N,
}

impl<R, G, N> HostAdapter<R, G, N>
where
    R: CommandRunner + Sync,
    G: ProjectGenerator + Sync,
    N: Notifier,
{
    pub fn new(launcher: ExternalEditorLauncher<R, G>, notifier: N) -> Self {
        Self { launcher, notifier }
    }

    pub fn launcher(&self) -> &ExternalEditorLauncher<R, G> {
        &self.launcher
    }

    pub fn launcher_mut(&mut self) -> &mut ExternalEditorLauncher<R, G> {
        &mut self.launcher
    }

    pub fn installations(&self) -> &[Installation] {
        self.launcher.list_installations()
    }

    pub fn try_get_installation_for_path(&self, path: &str) -> Option<&Installation> {
        self.launcher.find_installation(path)
    }

    /// Open `path` at `line`/`column` (`-1` = unset). Never fails; returns
    /// whether the editor accepted the file.
    pub async fn open_project(&self, path: &str, line: i32, column: i32) -> bool {
        let request = OpenRequest::from_host(path, line, column);
        match self.launcher.open_file(&request).await {
            Ok(outcome) => {
                self.notifier.notify(&HostEvent::file_opened(
                    outcome.file,
                    outcome.position,
                    outcome.command.command_line(),
                    outcome.focused,
                ));
                true
            }
            Err(e) => {
                warn!("Could not open {}: {}", path, e);
                self.notifier.notify(&HostEvent::open_failed(path, &e));
                false
            }
        }
    }

    /// Host-side change notification. Returns whether the generator succeeded.
    pub async fn sync_if_needed(
        &self,
        added: &[String],
        deleted: &[String],
        moved: &[String],
        moved_from: &[String],
        imported: &[String],
    ) -> bool {
        let changes = AssetChanges {
            added: to_set(added),
            deleted: to_set(deleted),
            moved: to_set(moved),
            moved_from: to_set(moved_from),
            imported: to_set(imported),
        };
        self.sync_changes(&changes).await
    }

    /// Forward an already-batched set of changes.
    pub async fn sync_changes(&self, changes: &AssetChanges) -> bool {
        match self.launcher.sync_if_needed(changes).await {
            Ok(()) => {
                self.notifier.notify(&HostEvent::ProjectSynced {
                    changed: changes.changed_paths().len(),
                    imported: changes.imported.len(),
                });
                true
            }
            Err(e) => {
                self.notifier.notify(&HostEvent::sync_failed(&e));
                false
            }
        }
    }

    /// Sync with no changes, regenerating missing or stale project files.
    pub async fn sync_all(&self) -> bool {
        match self.launcher.sync_all().await {
            Ok(()) => {
                self.notifier.notify(&HostEvent::ProjectSynced {
                    changed: 0,
                    imported: 0,
                });
                true
            }
            Err(e) => {
                self.notifier.notify(&HostEvent::sync_failed(&e));
                false
            }
        }
    }

    pub async fn regenerate(&self) -> bool {
        match self.launcher.regenerate().await {
            Ok(()) => {
                self.notifier.notify(&HostEvent::ProjectRegenerated);
                true
            }
            Err(e) => {
                self.notifier.notify(&HostEvent::sync_failed(&e));
                false
            }
        }
    }
}

fn to_set(paths: &[String]) -> BTreeSet<String> {
    paths.iter().cloned().collect()
}
