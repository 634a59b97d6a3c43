//! User settings for reimburse-cli
//!
//! Holds the non-secret knobs of a run: which ledger names to resolve, how far
//! back to look, and which endpoints and model to talk to. Credentials are
//! never stored here; they come from flags or the environment.

use serde::{Deserialize, Serialize};

use super::paths::ReimbursePaths;
use crate::error::ReimburseError;

/// User settings for reimburse-cli
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Category holding incoming reimbursement transfers
    #[serde(default = "default_reimbursement_category")]
    pub reimbursement_category: String,

    /// Category assigned to committed groups and reimbursed split portions
    #[serde(default = "default_reimbursed_category")]
    pub reimbursed_category: String,

    /// Tag marking expenses that are waiting to be paid back
    #[serde(default = "default_pending_tag")]
    pub pending_tag: String,

    /// How many days of uncleared transactions to consider
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Chat model used for matching
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Ledger API base URL
    #[serde(default = "default_ledger_api_base")]
    pub ledger_api_base: String,

    /// Chat completions API base URL
    #[serde(default = "default_openai_api_base")]
    pub openai_api_base: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_reimbursement_category() -> String {
    "Venmo".to_string()
}

fn default_reimbursed_category() -> String {
    "Reimbursed".to_string()
}

fn default_pending_tag() -> String {
    "Pending Venmo".to_string()
}

fn default_lookback_days() -> u32 {
    60
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_ledger_api_base() -> String {
    "https://dev.lunchmoney.app/v1".to_string()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            reimbursement_category: default_reimbursement_category(),
            reimbursed_category: default_reimbursed_category(),
            pending_tag: default_pending_tag(),
            lookback_days: default_lookback_days(),
            openai_model: default_openai_model(),
            ledger_api_base: default_ledger_api_base(),
            openai_api_base: default_openai_api_base(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &ReimbursePaths) -> Result<Self, ReimburseError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ReimburseError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                ReimburseError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ReimbursePaths) -> Result<(), ReimburseError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ReimburseError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            ReimburseError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
