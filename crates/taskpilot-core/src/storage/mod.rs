mod config;

pub use config::{CacheConfig, Config};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// Resolution order:
/// 1. `$TASKPILOT_HOME` when set
/// 2. `~/.config/taskpilot-dev/` when `TASKPILOT_ENV=dev`
/// 3. `~/.config/taskpilot/`
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TASKPILOT_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TASKPILOT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("taskpilot-dev")
            } else {
                base_dir.join("taskpilot")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::NoDataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Default location of the exported workspace snapshot.
pub fn default_workspace_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("workspace.json"))
}
