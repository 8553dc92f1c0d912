//! Configuration Data Structures for NovaDE Core.
//!
//! This module defines the structures used to represent the configuration of the
//! NovaDE compositing stack. They are populated by deserializing a TOML document.
//!
//! # Key Structs
//! - [`CoreConfig`]: The root configuration structure.
//! - [`LoggingConfig`]: Configuration specific to the logging subsystem.
//! - [`CompositingConfig`]: The handful of values the compositor reads at setup time.
//!
//! Missing fields fall back to the functions in [`super::defaults`]; unknown fields
//! are rejected via `#[serde(deny_unknown_fields)]`.

use super::defaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration settings for the logging subsystem.
///
/// # Examples
///
/// ```
/// use novade_core::config::LoggingConfig;
/// use std::path::PathBuf;
///
/// let default_log_config = LoggingConfig::default();
/// assert_eq!(default_log_config.level, "info");
/// assert_eq!(default_log_config.file_path, None);
/// assert_eq!(default_log_config.format, "text");
///
/// let toml_str = r#"
/// level = "debug"
/// file_path = "/var/log/novade/compositor.log"
/// format = "json"
/// "#;
/// let log_config: LoggingConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, Some(PathBuf::from("/var/log/novade/compositor.log")));
/// assert_eq!(log_config.format, "json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// The minimum log level to record.
    /// Valid values (case-insensitive): "trace", "debug", "info", "warn", "error".
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional path to a file where logs should be written.
    /// Relative paths are resolved against the application's state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// The format for log messages. Valid values (case-insensitive): "text", "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Renderer family the compositor asks its scene to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositingBackend {
    /// Render-extension based 2D compositing.
    #[serde(rename = "xrender")]
    XRender,
    /// GL based compositing.
    #[serde(rename = "opengl")]
    OpenGl,
    /// Compositing is configured off; `setup()` never builds a scene.
    None,
}

impl CompositingBackend {
    /// The renderer family string reported over the control surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositingBackend::XRender => "xrender",
            CompositingBackend::OpenGl => "opengl",
            CompositingBackend::None => "none",
        }
    }
}

/// Compositor settings, read on `setup()` and on reconfiguration only.
///
/// # Examples
///
/// ```
/// use novade_core::config::{CompositingBackend, CompositingConfig};
///
/// let config: CompositingConfig = toml::from_str(r#"
/// max_fps = 120
/// unredirect_fullscreen = true
/// "#).unwrap();
/// assert!(config.enabled);
/// assert_eq!(config.backend, CompositingBackend::XRender);
/// assert_eq!(config.max_fps, 120);
/// assert!(config.unredirect_fullscreen);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositingConfig {
    /// When `false` the compositor starts suspended on behalf of the user.
    #[serde(default = "defaults::default_compositing_enabled")]
    pub enabled: bool,
    #[serde(default = "defaults::default_compositing_backend")]
    pub backend: CompositingBackend,
    /// Upper bound on the paint rate. Must be within `1..=1000`.
    #[serde(default = "defaults::default_max_fps")]
    pub max_fps: u32,
    /// Display refresh rate in Hz; `0` uses whatever the display reports.
    #[serde(default = "defaults::default_refresh_rate")]
    pub refresh_rate: u32,
    /// Estimated paint time before the vertical blank, in microseconds.
    #[serde(default = "defaults::default_vblank_time_us")]
    pub vblank_time_us: u32,
    /// Let eligible full-screen windows bypass compositing.
    #[serde(default = "defaults::default_unredirect_fullscreen")]
    pub unredirect_fullscreen: bool,
    /// Global shortcut shown to the user when compositing is suspended remotely.
    #[serde(default = "defaults::default_suspend_shortcut")]
    pub suspend_shortcut: Option<String>,
}

impl CompositingConfig {
    /// The frame interval implied by `max_fps`.
    pub fn max_fps_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.max_fps.max(1)))
    }

    pub fn vblank_time(&self) -> Duration {
        Duration::from_micros(u64::from(self.vblank_time_us))
    }
}

impl Default for CompositingConfig {
    fn default() -> Self {
        defaults::default_compositing_config()
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use novade_core::config::CoreConfig;
///
/// let core_config = CoreConfig::default();
/// assert_eq!(core_config.logging.level, "info");
/// assert_eq!(core_config.compositing.max_fps, 60);
///
/// let loaded: CoreConfig = toml::from_str(r#"
/// [logging]
/// level = "warn"
///
/// [compositing]
/// enabled = false
/// "#).unwrap();
/// assert_eq!(loaded.logging.level, "warn");
/// assert!(!loaded.compositing.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_compositing_config")]
    pub compositing: CompositingConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            logging: defaults::default_logging_config(),
            compositing: defaults::default_compositing_config(),
        }
    }
}
