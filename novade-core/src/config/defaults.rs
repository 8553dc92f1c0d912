//! Default configuration values for NovaDE Core.
//!
//! These functions are used by `serde`'s `default` attribute in the configuration
//! structures to provide sensible default values when they are not specified in
//! the configuration file.

use crate::config::{CompositingBackend, CompositingConfig, LoggingConfig};
use std::path::PathBuf;

/// Returns the default `LoggingConfig`.
///
/// Used by `CoreConfig` if the `logging` section is missing from `config.toml`.
pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

/// Returns the default log level string (`"info"`).
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// Returns the default log file path (`None`, console only).
pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// Returns the default log format string (`"text"`).
pub(super) fn default_log_format() -> String {
    "text".to_string()
}

/// Returns the default `CompositingConfig`.
///
/// Used by `CoreConfig` if the `compositing` section is missing.
pub(super) fn default_compositing_config() -> CompositingConfig {
    CompositingConfig {
        enabled: default_compositing_enabled(),
        backend: default_compositing_backend(),
        max_fps: default_max_fps(),
        refresh_rate: default_refresh_rate(),
        vblank_time_us: default_vblank_time_us(),
        unredirect_fullscreen: default_unredirect_fullscreen(),
        suspend_shortcut: default_suspend_shortcut(),
    }
}

pub(super) fn default_compositing_enabled() -> bool {
    true
}

pub(super) fn default_compositing_backend() -> CompositingBackend {
    CompositingBackend::XRender
}

/// 60 frames per second.
pub(super) fn default_max_fps() -> u32 {
    60
}

/// `0` means "ask the display for its refresh rate".
pub(super) fn default_refresh_rate() -> u32 {
    0
}

/// Estimated time a paint pass needs before the vertical blank, in microseconds.
pub(super) fn default_vblank_time_us() -> u32 {
    6000
}

pub(super) fn default_unredirect_fullscreen() -> bool {
    false
}

pub(super) fn default_suspend_shortcut() -> Option<String> {
    Some("Alt+Shift+F12".to_string())
}
