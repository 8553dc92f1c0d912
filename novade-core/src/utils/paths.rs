//! XDG base directory resolution for NovaDE, via `directories-next`.
//!
//! - [`get_app_config_dir()`]: e.g. `~/.config/novade` on Linux, holds `config.toml`.
//! - [`get_app_state_dir()`]: e.g. `~/.local/state/NovaDE`, the base for relative log paths.
//!
//! Both return [`ConfigError::DirectoryUnavailable`] (wrapped in [`CoreError`])
//! when no home directory can be determined.

use crate::error::{ConfigError, CoreError};
use directories_next::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "NovaDE";
const APPLICATION: &str = "NovaDE";

fn unavailable(dir_type: &str) -> CoreError {
    CoreError::Config(ConfigError::DirectoryUnavailable {
        dir_type: dir_type.to_string(),
    })
}

/// Returns the user's configuration directory for NovaDE.
///
/// # Examples
/// ```
/// if let Ok(path) = novade_core::utils::paths::get_app_config_dir() {
///     assert!(path.to_string_lossy().to_lowercase().contains("novade"));
/// }
/// ```
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| unavailable("App Config"))
}

/// Returns the user's state directory for NovaDE.
///
/// On Linux this honours `$XDG_STATE_HOME` and falls back to `~/.local/state`.
/// Elsewhere the platform's local data directory is used.
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    let base = BaseDirs::new().ok_or_else(|| unavailable("State Base"))?;

    #[cfg(target_os = "linux")]
    let state_base = std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .unwrap_or_else(|| base.home_dir().join(".local/state"));
    #[cfg(not(target_os = "linux"))]
    let state_base = base.data_local_dir().to_path_buf();

    Ok(state_base.join(APPLICATION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_dirs_are_application_scoped() {
        // The project path is platform-specific; Linux lowercases it.
        if let (Ok(config_dir), Some(dirs)) = (
            get_app_config_dir(),
            ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION),
        ) {
            assert!(config_dir.ends_with(dirs.project_path()));
        }
        if let Ok(state_dir) = get_app_state_dir() {
            assert!(state_dir.ends_with(APPLICATION));
        }
    }
}
