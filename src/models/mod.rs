//! Core data models for reimburse-cli
//!
//! This module contains the data structures the reconciler works with:
//! ledger transactions, categories and tags, money, and reimbursement groups.

pub mod category;
pub mod group;
pub mod ids;
pub mod money;
pub mod note;
pub mod transaction;

pub use category::{find_category, find_tag, Category, Tag};
pub use group::{Readiness, ReimbursementGroup};
pub use ids::{CategoryId, TagId, TransactionId};
pub use money::Money;
pub use note::extract_primary_note;
pub use transaction::{NewTransactionGroup, SplitPortion, Transaction, TransactionStatus};
