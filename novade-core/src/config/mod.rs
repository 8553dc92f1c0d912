//! Configuration Management for NovaDE Core.
//!
//! - [`types`]: the schema ([`CoreConfig`], [`LoggingConfig`], [`CompositingConfig`]).
//! - [`defaults`]: serde default functions for every field.
//! - [`loader`]: [`ConfigLoader`], which reads, merges and validates TOML documents.
//!
//! ## Configuration Loading Process
//!
//! 1. `ConfigLoader::load()` reads the system file and then the user file.
//! 2. Tables from the user file override the system file key by key.
//! 3. Missing sections and fields take their defaults.
//! 4. The result is validated: log level/format are lower-cased, compositing
//!    values are range-checked. Failures map to
//!    [`crate::error::ConfigError::ValidationError`].
//!
//! # Examples
//!
//! ```rust
//! use novade_core::config::{CompositingBackend, ConfigLoader};
//!
//! let config = ConfigLoader::load_from_str(r#"
//! [compositing]
//! backend = "opengl"
//! max_fps = 120
//! "#).unwrap();
//! assert_eq!(config.compositing.backend, CompositingBackend::OpenGl);
//! assert_eq!(config.logging.level, "info");
//! ```

mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{CompositingBackend, CompositingConfig, CoreConfig, LoggingConfig};
