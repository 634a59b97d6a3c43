//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod run;
pub mod state;

pub use run::{handle_run_command, RunArgs};
pub use state::{handle_state_command, StateCommands};
