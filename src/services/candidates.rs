//! Candidate selection
//!
//! Narrows the ledger's uncleared transactions down to the ones worth showing
//! the matching oracle, then splits them into incoming reimbursements and the
//! expenses they might pay back.

use std::collections::BTreeSet;

use crate::models::{CategoryId, TagId, Transaction, TransactionId};

/// What marks a transaction as part of the reimbursement workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRules {
    pub reimbursement_category: CategoryId,
    pub pending_tag: TagId,
}

impl CandidateRules {
    /// Whether a transaction should be offered for matching
    ///
    /// Grouped transactions are never candidates. Reimbursement-category
    /// transactions must be incoming money; everything else must carry the
    /// pending tag.
    pub fn is_candidate(&self, txn: &Transaction) -> bool {
        if txn.is_grouped() {
            return false;
        }

        if txn.in_category(self.reimbursement_category) {
            !txn.is_expense()
        } else {
            txn.has_tag(self.pending_tag)
        }
    }

    pub fn is_reimbursement(&self, txn: &Transaction) -> bool {
        txn.in_category(self.reimbursement_category)
    }
}

/// Candidates partitioned for matching
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    reimbursements: Vec<Transaction>,
    mains: Vec<Transaction>,
}

impl CandidateSet {
    /// Filter and partition, preserving ledger order within each side
    pub fn select(
        transactions: impl IntoIterator<Item = Transaction>,
        rules: &CandidateRules,
    ) -> Self {
        let mut set = Self::default();
        for txn in transactions {
            if !rules.is_candidate(&txn) {
                continue;
            }
            if rules.is_reimbursement(&txn) {
                set.reimbursements.push(txn);
            } else {
                set.mains.push(txn);
            }
        }
        set
    }

    pub fn reimbursements(&self) -> &[Transaction] {
        &self.reimbursements
    }

    pub fn mains(&self) -> &[Transaction] {
        &self.mains
    }

    /// Both sides are non-empty, so there is something to match
    pub fn is_actionable(&self) -> bool {
        !self.reimbursements.is_empty() && !self.mains.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reimbursements.len() + self.mains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every candidate, reimbursements first
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.reimbursements.iter().chain(self.mains.iter())
    }

    pub fn ids(&self) -> BTreeSet<TransactionId> {
        self.iter().map(|t| t.id).collect()
    }

    pub fn main(&self, id: TransactionId) -> Option<&Transaction> {
        self.mains.iter().find(|t| t.id == id)
    }

    pub fn reimbursement(&self, id: TransactionId) -> Option<&Transaction> {
        self.reimbursements.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, Tag};
    use chrono::NaiveDate;

    const VENMO: CategoryId = CategoryId::new(1);
    const SNACKS: CategoryId = CategoryId::new(2);
    const PENDING: TagId = TagId::new(9);

    fn rules() -> CandidateRules {
        CandidateRules {
            reimbursement_category: VENMO,
            pending_tag: PENDING,
        }
    }

    fn txn(id: i64, cents: i64, category: CategoryId) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            Money::from_cents(cents),
        )
        .with_category(category)
    }

    fn pending() -> Tag {
        Tag::new(PENDING, "Pending Venmo")
    }

    #[test]
    fn test_incoming_reimbursement_is_candidate() {
        assert!(rules().is_candidate(&txn(1, -600, VENMO)));
    }

    #[test]
    fn test_outgoing_reimbursement_category_is_excluded() {
        assert!(!rules().is_candidate(&txn(1, 600, VENMO)));
        assert!(!rules().is_candidate(&txn(1, 600, VENMO).with_tag(pending())));
    }

    #[test]
    fn test_untagged_expense_is_excluded() {
        assert!(!rules().is_candidate(&txn(1, 1200, SNACKS)));
        assert!(rules().is_candidate(&txn(1, 1200, SNACKS).with_tag(pending())));
    }

    #[test]
    fn test_grouped_is_never_candidate() {
        let group = TransactionId::new(500);
        assert!(!rules().is_candidate(&txn(1, -600, VENMO).with_group(group)));
        assert!(!rules().is_candidate(&txn(2, 1200, SNACKS).with_tag(pending()).with_group(group)));
    }

    #[test]
    fn test_select_partitions() {
        let set = CandidateSet::select(
            vec![
                txn(1, -600, VENMO),
                txn(2, 1200, SNACKS).with_tag(pending()),
                txn(3, 2400, SNACKS),
                txn(4, -300, VENMO),
            ],
            &rules(),
        );

        let reimbursement_ids: Vec<_> = set.reimbursements().iter().map(|t| t.id.get()).collect();
        let main_ids: Vec<_> = set.mains().iter().map(|t| t.id.get()).collect();
        assert_eq!(reimbursement_ids, vec![1, 4]);
        assert_eq!(main_ids, vec![2]);
        assert!(set.is_actionable());
        assert_eq!(set.ids().len(), 3);
        assert!(set.main(TransactionId::new(2)).is_some());
        assert!(set.main(TransactionId::new(1)).is_none());
        assert!(set.reimbursement(TransactionId::new(4)).is_some());
    }

    #[test]
    fn test_one_sided_set_is_not_actionable() {
        let only_reimbursements = CandidateSet::select(vec![txn(1, -600, VENMO)], &rules());
        assert!(!only_reimbursements.is_actionable());
        assert!(!only_reimbursements.is_empty());

        let only_mains =
            CandidateSet::select(vec![txn(2, 1200, SNACKS).with_tag(pending())], &rules());
        assert!(!only_mains.is_actionable());
    }
}
