//! Custom error types for reimburse-cli
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for reimburse-cli operations
#[derive(Error, Debug)]
pub enum ReimburseError {
    /// Configuration-related errors (missing category, tag, or credential)
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The ledger API rejected or failed a request
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// The matching oracle could not be reached or returned an API error
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// The matching oracle answered, but not in the agreed shape
    #[error("Oracle response violates the grouping contract: {reason}\nRaw response:\n{raw}")]
    OracleContract { reason: String, raw: String },

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ReimburseError {
    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a contract violation carrying the raw oracle response
    pub fn contract(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::OracleContract {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Check if this is an oracle contract violation
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::OracleContract { .. })
    }
}

impl From<std::io::Error> for ReimburseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ReimburseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for reimburse-cli operations
pub type ReimburseResult<T> = Result<T, ReimburseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReimburseError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = ReimburseError::transaction_not_found("42");
        assert_eq!(err.to_string(), "Transaction not found: 42");
    }

    #[test]
    fn test_contract_error_includes_raw_response() {
        let err = ReimburseError::contract("expected an array", "{\"oops\": 1}");
        assert!(err.is_contract_violation());
        let text = err.to_string();
        assert!(text.contains("expected an array"));
        assert!(text.contains("{\"oops\": 1}"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReimburseError = io_err.into();
        assert!(matches!(err, ReimburseError::Io(_)));
    }
}
