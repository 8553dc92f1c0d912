//! General utilities for NovaDE Core.
//!
//! - [`fs`]: directory creation with [`crate::error::CoreError`] mapping.
//! - [`paths`]: XDG configuration and state directories.

pub mod fs;
pub mod paths;

pub use fs::ensure_dir_exists;
