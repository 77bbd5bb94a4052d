//! # nvb-core - Core Domain Types
//!
//! Foundation crate for neovim-bridge. Provides the value types passed between
//! the host and the launcher, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, serde_json, thiserror, tracing, tracing-subscriber,
//! tracing-appender, dirs).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Installation`] - A named external editor the host can address
//! - [`OpenRequest`] - File path plus optional line/column from the host
//! - [`CursorPosition`] - Normalized line/column (line >= 1)
//! - [`CommandSpec`] - Structured process invocation (no shell involved)
//! - [`AssetChanges`] - One batch of added/deleted/moved/imported paths
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use nvb_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::{
    AssetChanges, CommandSpec, CursorPosition, Installation, OpenRequest, DEFAULT_COLUMN,
    DEFAULT_LINE, HOST_UNSET,
};
