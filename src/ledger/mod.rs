//! Ledger collaborator
//!
//! The reconciler reads transactions, categories, and tags from the user's
//! ledger and issues exactly two kinds of mutation: splitting a transaction
//! and bundling transactions into a group. Everything else about the ledger
//! provider stays behind this trait.

pub mod lunchmoney;
pub mod memory;

use chrono::NaiveDate;

use crate::error::ReimburseResult;
use crate::models::{
    Category, NewTransactionGroup, SplitPortion, Tag, Transaction, TransactionId,
    TransactionStatus,
};

pub use lunchmoney::LunchMoneyClient;
pub use memory::InMemoryLedger;

/// Filter for listing transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionQuery {
    pub status: Option<TransactionStatus>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TransactionQuery {
    /// Uncleared transactions dated within `[start_date, end_date]`
    pub fn uncleared(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            status: Some(TransactionStatus::Uncleared),
            start_date,
            end_date,
        }
    }

    pub fn includes(&self, txn: &Transaction) -> bool {
        self.status.map_or(true, |s| s == txn.status)
            && txn.date >= self.start_date
            && txn.date <= self.end_date
    }
}

/// Read and write access to the user's ledger
pub trait Ledger {
    fn categories(&self) -> ReimburseResult<Vec<Category>>;

    fn tags(&self) -> ReimburseResult<Vec<Tag>>;

    fn transactions(&self, query: &TransactionQuery) -> ReimburseResult<Vec<Transaction>>;

    fn transaction(&self, id: TransactionId) -> ReimburseResult<Transaction>;

    /// Replace a transaction with the given portions; returns the new transaction IDs
    fn split_transaction(
        &self,
        id: TransactionId,
        portions: &[SplitPortion],
    ) -> ReimburseResult<Vec<TransactionId>>;

    /// Bundle transactions into a group; returns the group's ID
    fn create_group(&self, group: &NewTransactionGroup) -> ReimburseResult<TransactionId>;
}
