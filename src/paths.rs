//! Centralized path resolution for hvctl
//!
//! # Environment Variables
//!
//! - `HVCTL_CONFIG` - Provider config file (read by the `--config` flag)
//! - `HVCTL_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `XDG_CONFIG_HOME/hvctl` (if set)
//! 2. Platform default:
//!    - Windows: `%APPDATA%\hvctl`
//!    - macOS/Linux: `~/.config/hvctl`
//!
//! For state_dir():
//! 1. `HVCTL_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/hvctl` (if set)
//! 3. Platform default:
//!    - Windows: `%LOCALAPPDATA%\hvctl`
//!    - macOS/Linux: `~/.local/state/hvctl`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "HVCTL_STATE_DIR";

/// Declared resources, looked up in the working directory by default
pub const RESOURCES_FILE: &str = "hvctl.resources.toml";

/// Get the hvctl config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("hvctl");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            return Ok(app_data.join("hvctl"));
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("hvctl"))
}

/// Get the hvctl state directory path
///
/// Priority:
/// 1. `HVCTL_STATE_DIR` env var
/// 2. `XDG_STATE_HOME/hvctl`
/// 3. Platform default
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join("hvctl");
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(local_app_data) = dirs::data_local_dir() {
            return Ok(local_app_data.join("hvctl"));
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".local").join("state").join("hvctl"))
}

/// Provider config file: the explicit path, or `config.toml` in the config dir.
pub fn config_file(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(path)),
        None => Ok(config_dir()?.join("config.toml")),
    }
}

/// State file: the explicit path, or `state.toml` in the state dir.
pub fn state_file(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(path)),
        None => Ok(state_dir()?.join("state.toml")),
    }
}

/// Resources file: the explicit path, or `hvctl.resources.toml` here.
pub fn resources_file(explicit: Option<&str>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(RESOURCES_FILE), expand)
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
