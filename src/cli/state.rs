//! `state` commands
//!
//! Inspect or clear the unprocessed set left behind by the last run.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::ReimbursePaths;
use crate::display::format_run_state;
use crate::error::ReimburseResult;
use crate::storage::RunStateStore;

/// State subcommands
#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Show the transactions left unprocessed by the last run
    Show {
        /// State file to read instead of the default
        #[arg(long)]
        state_file: Option<PathBuf>,
    },
    /// Forget the last run so the next one always consults the oracle
    Reset {
        /// State file to remove instead of the default
        #[arg(long)]
        state_file: Option<PathBuf>,
    },
}

/// Handle a state command
pub fn handle_state_command(paths: &ReimbursePaths, cmd: StateCommands) -> ReimburseResult<()> {
    match cmd {
        StateCommands::Show { state_file } => {
            let store = RunStateStore::new(state_file.unwrap_or_else(|| paths.state_file()));
            let state = store.load()?;
            println!("State file: {}", store.path().display());
            print!("{}", format_run_state(&state));
        }
        StateCommands::Reset { state_file } => {
            let store = RunStateStore::new(state_file.unwrap_or_else(|| paths.state_file()));
            if store.reset()? {
                println!("Removed {}", store.path().display());
            } else {
                println!("No state file at {}", store.path().display());
            }
        }
    }

    Ok(())
}
