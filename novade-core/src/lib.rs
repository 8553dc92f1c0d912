//! # NovaDE Core Library (`novade-core`)
//!
//! The foundational layer of the NovaDE compositing stack. It provides:
//!
//! - **Error Handling**: [`CoreError`] with the more specific [`ConfigError`] and [`LoggingError`].
//! - **Configuration**: TOML loading with defaults and validation via [`ConfigLoader`].
//! - **Logging**: `tracing` subscriber setup for console and rolling log files.
//! - **Geometry**: integer [`Point`], [`Size`], [`Rect`] and the disjoint-rectangle [`Region`].
//! - **Utilities**: XDG path resolution and directory creation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use novade_core::config::ConfigLoader;
//! use novade_core::logging::init_logging;
//! use novade_core::error::CoreError;
//!
//! fn main() -> Result<(), CoreError> {
//!     let core_config = ConfigLoader::load()?;
//!     init_logging(&core_config.logging, false)?;
//!     tracing::info!(max_fps = core_config.compositing.max_fps, "NovaDE core initialized");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

pub use config::{CompositingBackend, CompositingConfig, ConfigLoader, CoreConfig, LoggingConfig};
pub use error::{ConfigError, CoreError, LoggingError};
pub use logging::{init_logging, init_minimal_logging};
pub use types::{Point, Rect, Region, Size};
pub use utils::ensure_dir_exists;

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(CoreError: std::error::Error, Send, Sync);
    assert_impl_all!(Region: Clone, Send, Sync, PartialEq);
    assert_impl_all!(CoreConfig: Clone, Send, Sync);
}
