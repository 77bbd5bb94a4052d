//! # nvb-app - Launcher and Project Sync Orchestration
//!
//! Ties the process layer to the host contract: configuration loading, the
//! [`ExternalEditorLauncher`], the project-generation boundary and the asset
//! file watcher.
//!
//! ## Public API
//!
//! ### Launcher (`editor`)
//! - [`ExternalEditorLauncher`] - Installations, open-at-cursor, sync forwarding
//! - [`LaunchError`] - Spawn / request / tool-exit / timeout / generator failures
//! - [`OpenOutcome`] - What an open dispatched
//!
//! ### Host Boundary (`host`)
//! - [`HostAdapter`] - `-1` sentinels in, booleans out
//! - [`Notifier`], [`HostEvent`] - Outcome reporting
//!
//! ### Project Generation (`generation`)
//! - [`ProjectGenerator`] - External collaborator contract
//! - [`CommandProjectGenerator`], [`NullProjectGenerator`], [`ConfiguredGenerator`]
//! - [`GenerationFlag`], [`GenerationFlags`]
//!
//! ### Configuration (`config`)
//! - [`Settings`] - `.nvb/config.toml`
//!
//! ### File Watching (`watcher`)
//! - [`AssetWatcher`] - Debounced asset change batches

pub mod config;
pub mod editor;
pub mod generation;
pub mod host;
pub mod watcher;

pub use config::{
    init_config_dir, load_settings, read_settings, save_settings, EditorSettings,
    GenerationSettings, Settings, WatcherSettings,
};
pub use editor::{
    resolve_file_path, ExternalEditorLauncher, LaunchError, LaunchResult, OpenOutcome,
};
pub use generation::{
    CommandProjectGenerator, ConfiguredGenerator, GenerationFlag, GenerationFlags,
    LocalProjectGenerator, NullProjectGenerator, ProjectGenerator,
};
pub use host::{HostAdapter, HostEvent, Notifier, TracingNotifier};
pub use watcher::{classify_events, AssetWatcher, WatcherConfig, WatcherEvent};
