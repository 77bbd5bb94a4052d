//! Subcommand execution
//!
//! Every command builds the launcher from `.nvb/config.toml` and reports
//! through a [`ConsoleNotifier`]. Commands return `Ok(false)` for failures
//! that were already reported, so `main` only has to pick the exit code.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use nvb_app::{
    config, AssetWatcher, ConfiguredGenerator, ExternalEditorLauncher, GenerationFlag,
    HostAdapter, Settings, WatcherConfig, WatcherEvent,
};
use nvb_process::{ToolAvailability, TokioCommandRunner};

use crate::cli::{Args, Command, FlagsAction};
use crate::output::{enabled_keys, CliEvent, ConsoleNotifier};

type Generator = ConfiguredGenerator<TokioCommandRunner>;
type Launcher = ExternalEditorLauncher<TokioCommandRunner, Generator>;
type Adapter = HostAdapter<TokioCommandRunner, Generator, ConsoleNotifier>;

/// Resolve the project root: `--project`, else the current directory.
pub fn project_root(arg: Option<PathBuf>) -> PathBuf {
    let root = arg
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    canonicalize_or_keep(&root)
}

fn canonicalize_or_keep(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Build the launcher for `project_root` from its settings.
pub fn build_launcher(settings: &Settings, project_root: &Path) -> Launcher {
    build_launcher_with_availability(settings, project_root).0
}

/// Like [`build_launcher`], also returning the remote-tool lookup it used.
pub fn build_launcher_with_availability(
    settings: &Settings,
    project_root: &Path,
) -> (Launcher, ToolAvailability) {
    let availability = ToolAvailability::check(&settings.editor.remote_tool);
    let runner = TokioCommandRunner::new();
    let generator = ConfiguredGenerator::from_settings(&settings.generation, project_root, runner);
    let launcher = ExternalEditorLauncher::from_settings(
        settings,
        project_root,
        &availability,
        runner,
        generator,
    );
    (launcher, availability)
}

/// Run one parsed command line. Returns whether it succeeded.
pub async fn run(args: Args) -> Result<bool> {
    let root = project_root(args.project);
    let console = ConsoleNotifier::new(args.json);
    debug!("Project root: {}", root.display());

    let settings = config::load_settings(&root);
    let (launcher, availability) = build_launcher_with_availability(&settings, &root);
    let adapter = HostAdapter::new(launcher, console);

    match args.command {
        Command::Open { path, line, column } => Ok(adapter.open_project(&path, line, column).await),
        Command::Installations => {
            console.emit(&CliEvent::Installations {
                installations: adapter.installations().to_vec(),
            });
            Ok(true)
        }
        Command::Find { path } => {
            let installation = adapter.try_get_installation_for_path(&path).cloned();
            let found = installation.is_some();
            console.emit(&CliEvent::InstallationFound { path, installation });
            Ok(found)
        }
        Command::Sync {
            added,
            deleted,
            moved,
            moved_from,
            imported,
        } => Ok(adapter
            .sync_if_needed(&added, &deleted, &moved, &moved_from, &imported)
            .await),
        Command::SyncAll => Ok(adapter.sync_all().await),
        Command::Regenerate => Ok(adapter.regenerate().await),
        Command::Flags { action } => flags(adapter, &root, action, console),
        Command::Status => status(&adapter, &availability, console).await,
        Command::Watch => watch(adapter, &settings, &root, console).await,
        Command::Init => init(&root, console),
    }
}

fn init(root: &Path, console: ConsoleNotifier) -> Result<bool> {
    let created = config::init_config_dir(root)?;
    console.emit(&CliEvent::ConfigInitialized {
        path: config::config_path(root).display().to_string(),
        created,
    });
    Ok(true)
}

fn flags(
    mut adapter: Adapter,
    root: &Path,
    action: Option<FlagsAction>,
    console: ConsoleNotifier,
) -> Result<bool> {
    match action {
        None => {
            console.emit(&CliEvent::Flags {
                enabled: enabled_keys(adapter.launcher().generation_flags()),
            });
        }
        Some(FlagsAction::Toggle { flag }) => {
            let flag: GenerationFlag = flag.parse()?;
            // The file is rewritten below; never replace a broken one with defaults
            let mut settings = config::read_settings(root)?;
            let enabled = adapter.launcher_mut().toggle_generation_flag(flag);
            settings.generation.flags = adapter.launcher().generation_flags().clone();
            config::save_settings(root, &settings)?;
            console.emit(&CliEvent::FlagToggled {
                flag: flag.key().to_string(),
                enabled,
            });
        }
    }
    Ok(true)
}

async fn status(
    adapter: &Adapter,
    availability: &ToolAvailability,
    console: ConsoleNotifier,
) -> Result<bool> {
    let servers = if availability.remote_tool_available() {
        match adapter.launcher().running_servers().await {
            Ok(servers) => servers,
            Err(e) => {
                warn!("Server list failed: {}", e);
                console.emit(&CliEvent::Error {
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    console.emit(&CliEvent::Status {
        remote_tool: availability.remote_tool_location(),
        available: availability.remote_tool_available(),
        servers,
    });
    Ok(availability.remote_tool_available())
}

async fn watch(
    adapter: Adapter,
    settings: &Settings,
    root: &Path,
    console: ConsoleNotifier,
) -> Result<bool> {
    let mut watcher = AssetWatcher::new(root.to_path_buf(), WatcherConfig::from(&settings.watcher));
    let (tx, mut rx) = mpsc::channel(32);
    watcher.start(tx)?;

    console.emit(&CliEvent::Watching {
        paths: settings.watcher.paths.clone(),
    });

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(WatcherEvent::Changes(changes)) => {
                    adapter.sync_changes(&changes).await;
                }
                Some(WatcherEvent::Error { message }) => {
                    console.emit(&CliEvent::Error { message });
                }
                None => {
                    watcher.stop();
                    return Err(eyre!("File watcher stopped unexpectedly"));
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; stopping watcher");
                watcher.stop();
                return Ok(true);
            }
        }
    }
}
