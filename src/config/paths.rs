//! Path management for reimburse-cli
//!
//! ## Path Resolution Order
//!
//! 1. `REIMBURSE_CLI_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `reimburse-cli`
//!    (`~/.config/reimburse-cli` on Linux, `~/Library/Application Support/reimburse-cli`
//!    on macOS, `%APPDATA%\reimburse-cli\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ReimburseError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "REIMBURSE_CLI_DATA_DIR";

/// Manages all paths used by reimburse-cli
#[derive(Debug, Clone)]
pub struct ReimbursePaths {
    base_dir: PathBuf,
}

impl ReimbursePaths {
    /// Create a new ReimbursePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and no
    /// override is set.
    pub fn new() -> Result<Self, ReimburseError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) => PathBuf::from(custom),
            None => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create ReimbursePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the set of transactions left unprocessed by the last run
    pub fn state_file(&self) -> PathBuf {
        self.base_dir.join("unprocessed.json")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), ReimburseError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ReimburseError::Io(format!("Failed to create base directory: {}", e)))
    }

    /// Check if a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, ReimburseError> {
    ProjectDirs::from("", "", "reimburse-cli")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            ReimburseError::Config(format!(
                "Could not determine a config directory; set {}",
                DATA_DIR_ENV
            ))
        })
}
