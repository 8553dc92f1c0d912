//! Error handling for the NovaDE core layer.
//!
//! This module defines the error types shared by the NovaDE compositing stack,
//! using the `thiserror` crate for ergonomic error definition.
//!
//! The main error type for this crate is [`CoreError`], which encapsulates
//! more specific errors like [`ConfigError`] and [`LoggingError`].
//!
//! # Examples
//!
//! ```rust
//! use novade_core::error::{CoreError, ConfigError};
//!
//! fn check_fps(max_fps: u32) -> Result<(), CoreError> {
//!     if max_fps == 0 {
//!         return Err(ConfigError::ValidationError("max_fps must be positive".into()).into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_fps(0).is_err());
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for the NovaDE compositing stack.
///
/// This enum represents all possible errors that can occur in the core layer.
/// Higher layers usually wrap it (see `novade_compositing::CompositingError`).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while installing the global `tracing` subscriber.
    #[error("Logging Initialization Failed: {0}")]
    LoggingInitialization(#[from] LoggingError),

    /// Filesystem operations (creating state directories, opening log files)
    /// that are not covered by a more specific variant.
    #[error("Filesystem Error: {message} (Path: {path:?})")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not covered by other specific variants.
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for configuration-related operations.
///
/// Typically wrapped by [`CoreError::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An error occurred while attempting to read a configuration file.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The document parsed but holds values outside the accepted range.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// A required base directory (e.g., XDG config/state home) could not be determined.
    #[error("Could not determine base directory for {dir_type}")]
    DirectoryUnavailable { dir_type: String },
}

/// Error type for logging-related operations.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The logging configuration could not be turned into a subscriber
    /// (bad level, or a global subscriber is already installed).
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),

    /// Failed to set or parse a log filter.
    #[error("Failed to set log filter: {0}")]
    FilterError(String),

    /// An I/O error occurred during logging, such as failing to open a log file.
    #[error("Logging I/O error: {0}")]
    IoError(#[from] io::Error),
}
