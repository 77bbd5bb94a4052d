//! Configuration file parsing for neovim-bridge
//!
//! Supports:
//! - `.nvb/config.toml` - Project settings (editor, generation, watcher)

pub mod settings;
pub mod types;

pub use settings::{config_path, init_config_dir, load_settings, read_settings, save_settings};
pub use types::*;
