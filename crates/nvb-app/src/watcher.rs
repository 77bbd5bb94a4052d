//! Asset file watcher
//!
//! Watches the project's asset directories and turns debounced filesystem
//! events into [`AssetChanges`] batches, the same shape the host uses for its
//! own change notifications.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use tokio::sync::{mpsc, oneshot};

use nvb_core::prelude::*;
use nvb_core::AssetChanges;

use crate::config::WatcherSettings;

/// Messages produced by [`AssetWatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherEvent {
    /// One debounced batch of relevant changes (never empty)
    Changes(AssetChanges),
    /// The watcher hit an error; it keeps running unless it could not start
    Error { message: String },
}

/// Configuration for the asset watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Paths to watch (relative to project root)
    pub paths: Vec<PathBuf>,
    pub debounce: Duration,
    /// File extensions to watch (empty = all files)
    pub extensions: Vec<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::from(&WatcherSettings::default())
    }
}

impl From<&WatcherSettings> for WatcherConfig {
    fn from(settings: &WatcherSettings) -> Self {
        Self {
            paths: settings.paths.iter().map(PathBuf::from).collect(),
            debounce: Duration::from_millis(settings.debounce_ms),
            extensions: settings.extensions.clone(),
        }
    }
}

impl WatcherConfig {
    fn matches(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }
}

/// Watches a project's asset directories
pub struct AssetWatcher {
    project_root: PathBuf,
    config: WatcherConfig,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl AssetWatcher {
    pub fn new(project_root: PathBuf, config: WatcherConfig) -> Self {
        Self {
            project_root,
            config,
            stop_tx: None,
        }
    }

    /// Start watching. Batches are delivered on `event_tx`.
    pub fn start(&mut self, event_tx: mpsc::Sender<WatcherEvent>) -> Result<()> {
        if self.is_running() {
            return Err(Error::watcher("Watcher is already running"));
        }

        let project_root = self.project_root.clone();
        let config = self.config.clone();
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        tokio::task::spawn_blocking(move || {
            run_watcher(project_root, config, event_tx, stop_rx);
        });

        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }
}

impl Drop for AssetWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_watcher(
    project_root: PathBuf,
    config: WatcherConfig,
    event_tx: mpsc::Sender<WatcherEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let tx = event_tx.clone();
    let root = project_root.clone();
    let filter = config.clone();

    let debouncer_result = new_debouncer(
        config.debounce,
        None,
        move |result: DebounceEventResult| match result {
            Ok(events) => {
                let events: Vec<Event> = events.into_iter().map(|e| e.event).collect();
                let changes = classify_events(&events, &root, &filter);
                if changes.is_empty() {
                    return;
                }
                debug!("Asset watcher batched {} change(s)", changes.len());
                if tx.blocking_send(WatcherEvent::Changes(changes)).is_err() {
                    trace!("Watcher receiver dropped");
                }
            }
            Err(errors) => {
                for error in errors {
                    warn!("File watcher error: {:?}", error);
                    let _ = tx.blocking_send(WatcherEvent::Error {
                        message: error.to_string(),
                    });
                }
            }
        },
    );

    let mut debouncer = match debouncer_result {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to create file watcher: {}", e);
            let _ = event_tx.blocking_send(WatcherEvent::Error {
                message: format!("Failed to create watcher: {}", e),
            });
            return;
        }
    };

    for relative_path in &config.paths {
        let full_path = project_root.join(relative_path);
        if !full_path.exists() {
            warn!("Watch path does not exist: {}", full_path.display());
            continue;
        }
        match debouncer.watch(&full_path, RecursiveMode::Recursive) {
            Ok(()) => info!("Watching: {}", full_path.display()),
            Err(e) => warn!("Failed to watch {}: {}", full_path.display(), e),
        }
    }

    loop {
        match stop_rx.try_recv() {
            Ok(()) | Err(oneshot::error::TryRecvError::Closed) => {
                info!("Asset watcher stopping");
                break;
            }
            Err(oneshot::error::TryRecvError::Empty) => {
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

/// Fold filesystem events into one [`AssetChanges`] batch.
///
/// Paths are reported relative to `project_root` when they live under it.
/// Events whose paths all fail the extension filter are dropped.
pub fn classify_events(
    events: &[Event],
    project_root: &Path,
    config: &WatcherConfig,
) -> AssetChanges {
    let mut changes = AssetChanges::new();

    for event in events {
        if !event.paths.iter().any(|p| config.matches(p)) {
            continue;
        }
        let paths: Vec<String> = event
            .paths
            .iter()
            .map(|p| relative_display(p, project_root))
            .collect();

        match event.kind {
            EventKind::Create(_) => changes.added.extend(paths),
            EventKind::Remove(_) => {
                for path in paths {
                    changes.added.remove(&path);
                    changes.imported.remove(&path);
                    changes.deleted.insert(path);
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                let mut paths = paths.into_iter();
                if let Some(from) = paths.next() {
                    changes.moved_from.insert(from);
                }
                changes.moved.extend(paths);
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                changes.moved_from.extend(paths)
            }
            EventKind::Modify(ModifyKind::Name(_)) => changes.moved.extend(paths),
            EventKind::Modify(ModifyKind::Metadata(_)) | EventKind::Access(_) => {}
            EventKind::Modify(_) => changes.imported.extend(paths),
            EventKind::Any | EventKind::Other => {}
        }
    }

    changes
}

fn relative_display(path: &Path, project_root: &Path) -> String {
    path.strip_prefix(project_root)
        .unwrap_or(path)
        .display()
        .to_string()
}
