//! Storage layer for reimburse-cli
//!
//! The only state the tool owns is the unprocessed-transaction set carried
//! between runs; everything else lives in the ledger.

pub mod file_io;
pub mod run_state;

pub use file_io::{read_json, write_json_atomic};
pub use run_state::{RunState, RunStateStore};
