//! Display formatting for terminal output
//!
//! Plain-text renderings of transactions, groups and run reports.

pub mod report;
pub mod transaction;

pub use report::{format_group, format_run_report, format_run_state};
pub use transaction::{format_id_list, format_transaction_list, format_transaction_row};
