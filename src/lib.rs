//! reimburse-cli - reconcile peer reimbursements against a Lunch Money ledger
//!
//! Friends pay back shared expenses through a payments app. Those transfers
//! land in the ledger as separate income, disconnected from the purchase they
//! cover. This crate asks a language model which transfers pay back which
//! expenses, checks the answer, splits off the share the user kept, and
//! groups each expense with its reimbursements in the ledger.
//!
//! # Architecture
//!
//! - `config`: paths and persisted settings
//! - `error`: the crate error type
//! - `models`: transactions, money, identifiers and reimbursement groups
//! - `ledger`: the ledger trait, the Lunch Money client and an in-memory ledger
//! - `oracle`: prompt construction, the chat-completions client and the
//!   response contract
//! - `notify`: Telegram summaries of committed groups
//! - `storage`: atomic JSON files and the run state
//! - `services`: candidate selection, committing and the run itself
//! - `cli`, `display`: the command-line surface
//!
//! # Example
//!
//! ```rust,ignore
//! use reimburse_cli::ledger::LunchMoneyClient;
//! use reimburse_cli::oracle::OpenAiOracle;
//! use reimburse_cli::services::Reconciler;
//!
//! let ledger = LunchMoneyClient::new(token, &settings.ledger_api_base)?;
//! let oracle = OpenAiOracle::new(key, &settings.openai_model, &settings.openai_api_base)?;
//! let report = Reconciler::new(&ledger, &oracle).run(&options)?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod oracle;
pub mod services;
pub mod storage;

pub use error::{ReimburseError, ReimburseResult};
