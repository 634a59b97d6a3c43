//! In-process ledger
//!
//! Behaves like the remote ledger for the operations the reconciler uses:
//! splits replace the parent with new transactions, groups stamp their
//! members with the new group's ID. Used for tests and local experiments.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use crate::error::{ReimburseError, ReimburseResult};
use crate::models::{
    Category, Money, NewTransactionGroup, SplitPortion, Tag, Transaction, TransactionId,
    TransactionStatus,
};

use super::{Ledger, TransactionQuery};

#[derive(Debug, Default)]
struct LedgerData {
    categories: Vec<Category>,
    tags: Vec<Tag>,
    transactions: BTreeMap<TransactionId, Transaction>,
    splits: Vec<(TransactionId, Vec<SplitPortion>)>,
    groups: Vec<(TransactionId, NewTransactionGroup)>,
    failing: HashSet<TransactionId>,
    next_id: i64,
}

/// A ledger held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    data: RwLock<LedgerData>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(self, category: Category) -> Self {
        self.write(|d| d.categories.push(category));
        self
    }

    pub fn with_tag(self, tag: Tag) -> Self {
        self.write(|d| d.tags.push(tag));
        self
    }

    pub fn with_transaction(self, txn: Transaction) -> Self {
        self.write(|d| {
            d.next_id = d.next_id.max(txn.id.get() + 1);
            d.transactions.insert(txn.id, txn);
        });
        self
    }

    /// Make every split or group touching `id` fail with a ledger error
    pub fn fail_mutations_for(self, id: TransactionId) -> Self {
        self.write(|d| {
            d.failing.insert(id);
        });
        self
    }

    /// Look up a transaction by ID, including split results and groups
    pub fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.read(|d| d.transactions.get(&id).cloned())
    }

    /// Every split performed so far: parent ID and requested portions
    pub fn splits(&self) -> Vec<(TransactionId, Vec<SplitPortion>)> {
        self.read(|d| d.splits.clone())
    }

    /// Every group created so far: group ID and request
    pub fn groups(&self) -> Vec<(TransactionId, NewTransactionGroup)> {
        self.read(|d| d.groups.clone())
    }

    pub fn mutation_count(&self) -> usize {
        self.read(|d| d.splits.len() + d.groups.len())
    }

    fn read<T>(&self, f: impl FnOnce(&LedgerData) -> T) -> T {
        match self.data.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut LedgerData) -> T) -> T {
        match self.data.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl LedgerData {
    fn allocate_id(&mut self) -> TransactionId {
        let id = TransactionId::new(self.next_id.max(1));
        self.next_id = id.get() + 1;
        id
    }

    fn check_not_failing(&self, id: TransactionId) -> ReimburseResult<()> {
        if self.failing.contains(&id) {
            return Err(ReimburseError::Ledger(format!(
                "ledger rejected mutation of transaction {}",
                id
            )));
        }
        Ok(())
    }
}

impl Ledger for InMemoryLedger {
    fn categories(&self) -> ReimburseResult<Vec<Category>> {
        Ok(self.read(|d| d.categories.clone()))
    }

    fn tags(&self) -> ReimburseResult<Vec<Tag>> {
        Ok(self.read(|d| d.tags.clone()))
    }

    fn transactions(&self, query: &TransactionQuery) -> ReimburseResult<Vec<Transaction>> {
        Ok(self.read(|d| {
            d.transactions
                .values()
                .filter(|t| query.includes(t))
                .cloned()
                .collect()
        }))
    }

    fn transaction(&self, id: TransactionId) -> ReimburseResult<Transaction> {
        self.get(id)
            .ok_or_else(|| ReimburseError::transaction_not_found(id.to_string()))
    }

    fn split_transaction(
        &self,
        id: TransactionId,
        portions: &[SplitPortion],
    ) -> ReimburseResult<Vec<TransactionId>> {
        self.write(|d| {
            d.check_not_failing(id)?;

            let parent = d
                .transactions
                .get(&id)
                .cloned()
                .ok_or_else(|| ReimburseError::transaction_not_found(id.to_string()))?;

            let total: Money = portions.iter().map(|p| p.amount).sum();
            if total != parent.amount {
                return Err(ReimburseError::Ledger(format!(
                    "split portions total {} but transaction {} is {}",
                    total, id, parent.amount
                )));
            }

            d.transactions.remove(&id);
            let mut child_ids = Vec::with_capacity(portions.len());
            for portion in portions {
                let child_id = d.allocate_id();
                let mut child = Transaction::new(child_id, portion.date, portion.amount);
                child.category_id = portion.category_id;
                child.payee = parent.payee.clone();
                child.original_name = parent.original_name.clone();
                child.notes = Some(portion.notes.clone());
                child.status = parent.status;
                child.tags = parent.tags.clone();
                d.transactions.insert(child_id, child);
                child_ids.push(child_id);
            }

            d.splits.push((id, portions.to_vec()));
            Ok(child_ids)
        })
    }

    fn create_group(&self, group: &NewTransactionGroup) -> ReimburseResult<TransactionId> {
        self.write(|d| {
            let mut total = Money::zero();
            for id in &group.transactions {
                d.check_not_failing(*id)?;
                let member = d
                    .transactions
                    .get(id)
                    .ok_or_else(|| ReimburseError::transaction_not_found(id.to_string()))?;
                if member.is_grouped() {
                    return Err(ReimburseError::Ledger(format!(
                        "transaction {} already belongs to a group",
                        id
                    )));
                }
                total += member.amount;
            }

            let group_id = d.allocate_id();
            for id in &group.transactions {
                if let Some(member) = d.transactions.get_mut(id) {
                    member.group_id = Some(group_id);
                }
            }

            let mut parent = Transaction::new(group_id, group.date, total)
                .with_payee(group.payee.clone())
                .with_category(group.category_id)
                .with_notes(group.notes.clone());
            parent.status = TransactionStatus::Cleared;
            d.transactions.insert(group_id, parent);

            d.groups.push((group_id, group.clone()));
            Ok(group_id)
        })
    }
}
