//! Configuration Loading for NovaDE Core.
//!
//! This module provides the [`ConfigLoader`] struct, which is responsible for
//! loading, parsing, and validating the [`CoreConfig`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use novade_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("max fps: {}", config.compositing.max_fps),
//!     Err(e) => {
//!         novade_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration loading failed: {}", e);
//!     }
//! }
//! ```
//!
//! ## Configuration File Location
//!
//! `ConfigLoader::load()` reads the system file (`/etc/novade/config.toml`, or the
//! path in `NOVADE_SYSTEM_CONFIG`) and the user file (`config.toml` in the
//! application config directory). User values override system values key by key.
//! Missing files are not an error; the defaults are used instead.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as nova_fs;
use crate::utils::paths::{get_app_config_dir, get_app_state_dir};

/// Environment variable overriding the system-wide configuration path.
pub const SYSTEM_CONFIG_ENV: &str = "NOVADE_SYSTEM_CONFIG";
const DEFAULT_SYSTEM_CONFIG: &str = "/etc/novade/config.toml";

/// `ConfigLoader` provides static methods to load and validate `CoreConfig`.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads, merges and validates the system and user configuration files.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReadError`] if a file exists but cannot be read.
    /// - [`ConfigError::ParseError`] for malformed TOML or unknown keys.
    /// - [`ConfigError::ValidationError`] for out-of-range values.
    /// - [`ConfigError::DirectoryUnavailable`] if the config/state directories cannot be resolved.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let system_config_path = env::var_os(SYSTEM_CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SYSTEM_CONFIG));
        let system_toml_value = Self::read_toml_value(&system_config_path)?;

        let user_config_path = get_app_config_dir()?.join("config.toml");
        let user_toml_value = Self::read_toml_value(&user_config_path)?;

        let mut final_config: CoreConfig = match Self::merge_toml_values(system_toml_value, user_toml_value) {
            Some(value) => value
                .try_into()
                .map_err(|e| CoreError::Config(ConfigError::ParseError(e)))?,
            None => CoreConfig::default(),
        };

        Self::validate_config(&mut final_config)?;
        Self::resolve_log_path(&mut final_config)?;
        tracing::debug!(
            system = %system_config_path.display(),
            user = %user_config_path.display(),
            "Configuration loaded"
        );
        Ok(final_config)
    }

    /// Parses and validates a single TOML document.
    ///
    /// Relative log file paths are left untouched; only [`ConfigLoader::load`]
    /// resolves them against the state directory.
    pub fn load_from_str(content: &str) -> Result<CoreConfig, CoreError> {
        let mut config: CoreConfig = toml::from_str(content).map_err(ConfigError::ParseError)?;
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    fn read_toml_value(path: &Path) -> Result<Option<Value>, CoreError> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => content
                .parse::<Value>()
                .map(Some)
                .map_err(|e| CoreError::Config(ConfigError::ParseError(e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Config(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })),
        }
    }

    /// Merges two optional TOML values. `override_val` takes precedence.
    fn merge_toml_values(base: Option<Value>, override_val: Option<Value>) -> Option<Value> {
        match (base, override_val) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(Value::Table(mut base_table)), Some(Value::Table(override_table))) => {
                Self::merge_toml_tables(&mut base_table, &override_table);
                Some(Value::Table(base_table))
            }
            (_, Some(o)) => Some(o),
        }
    }

    /// Recursively merges `override_table` into `base_table`.
    fn merge_toml_tables(base_table: &mut toml::map::Map<String, Value>, override_table: &toml::map::Map<String, Value>) {
        for (key, override_item) in override_table {
            match base_table.get_mut(key) {
                Some(base_item) => {
                    if let (Value::Table(bt), Value::Table(ot)) = (&mut *base_item, override_item) {
                        Self::merge_toml_tables(bt, ot);
                    } else {
                        *base_item = override_item.clone();
                    }
                }
                None => {
                    base_table.insert(key.clone(), override_item.clone());
                }
            }
        }
    }

    /// Normalises and range-checks a parsed configuration.
    fn validate_config(config: &mut CoreConfig) -> Result<(), CoreError> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level_lower,
            _ => {
                return Err(CoreError::Config(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                ))));
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => config.logging.format = format_lower,
            _ => {
                return Err(CoreError::Config(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                ))));
            }
        }

        let compositing = &mut config.compositing;
        if !(1..=1000).contains(&compositing.max_fps) {
            return Err(CoreError::Config(ConfigError::ValidationError(format!(
                "Invalid max_fps: {}. Must be within 1..=1000.",
                compositing.max_fps
            ))));
        }
        if compositing.refresh_rate > 1000 {
            return Err(CoreError::Config(ConfigError::ValidationError(format!(
                "Invalid refresh_rate: {}. Must be 0 (auto) or at most 1000.",
                compositing.refresh_rate
            ))));
        }
        // A vblank estimate longer than a whole frame at the slowest rate makes no sense.
        if compositing.vblank_time_us >= 1_000_000 {
            return Err(CoreError::Config(ConfigError::ValidationError(format!(
                "Invalid vblank_time_us: {}. Must be below one second.",
                compositing.vblank_time_us
            ))));
        }
        if let Some(shortcut) = &compositing.suspend_shortcut {
            if shortcut.trim().is_empty() {
                compositing.suspend_shortcut = None;
            }
        }
        Ok(())
    }

    /// Makes a relative log path absolute under the state directory and
    /// ensures its parent directory exists.
    fn resolve_log_path(config: &mut CoreConfig) -> Result<(), CoreError> {
        if let Some(path) = &config.logging.file_path {
            let absolute = if path.is_absolute() {
                path.clone()
            } else {
                get_app_state_dir()?.join(path)
            };
            if let Some(parent_dir) = absolute.parent() {
                if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                    nova_fs::ensure_dir_exists(parent_dir)?;
                }
            }
            config.logging.file_path = Some(absolute);
        }
        Ok(())
    }
}
