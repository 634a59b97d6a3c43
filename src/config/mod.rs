//! Configuration module for reimburse-cli
//!
//! This module provides configuration management including:
//! - Platform path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::ReimbursePaths;
pub use settings::Settings;
