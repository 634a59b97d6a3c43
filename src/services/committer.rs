//! Grouping committer
//!
//! Writes a ready reimbursement group into the ledger. When the user kept a
//! share of the expense, the expense is first split so that only the
//! reimbursed portion joins the group; the self-paid portion stays in its
//! original category with the purchase description as its note.

use crate::error::{ReimburseError, ReimburseResult};
use crate::ledger::Ledger;
use crate::models::{
    CategoryId, NewTransactionGroup, ReimbursementGroup, SplitPortion, TransactionId,
};

/// Payee used for the group when the expense has none
pub const FALLBACK_GROUP_PAYEE: &str = "Venmo Reimbursement";

/// Result of committing one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// The ledger group that now holds the reimbursed portion and its matches
    pub group_id: TransactionId,
    /// The transaction grouped with the matches: the expense or its reimbursed split
    pub anchor_id: TransactionId,
    /// Transactions created by splitting the expense, if it was split
    pub split_ids: Vec<TransactionId>,
}

impl CommitOutcome {
    pub fn was_split(&self) -> bool {
        !self.split_ids.is_empty()
    }
}

/// Service for committing groups to a ledger
pub struct GroupCommitter<'a> {
    ledger: &'a dyn Ledger,
    reimbursed_category: CategoryId,
}

impl<'a> GroupCommitter<'a> {
    pub fn new(ledger: &'a dyn Ledger, reimbursed_category: CategoryId) -> Self {
        Self {
            ledger,
            reimbursed_category,
        }
    }

    /// The split that would be requested for a group, or `None` if it is
    /// fully reimbursed
    pub fn split_portions(&self, group: &ReimbursementGroup) -> Option<[SplitPortion; 2]> {
        if group.you_pay().is_zero() {
            return None;
        }

        let main = group.main();
        Some([
            SplitPortion {
                date: main.date,
                category_id: Some(self.reimbursed_category),
                notes: String::new(),
                amount: group.they_pay(),
            },
            SplitPortion {
                date: main.date,
                category_id: main.category_id,
                notes: group.main_note().to_string(),
                amount: group.you_pay(),
            },
        ])
    }

    /// The group request that bundles `anchor` with the matches
    pub fn group_request(
        &self,
        group: &ReimbursementGroup,
        anchor: TransactionId,
    ) -> NewTransactionGroup {
        let main = group.main();
        let mut transactions = Vec::with_capacity(group.matches().len() + 1);
        transactions.push(anchor);
        transactions.extend(group.matches().iter().map(|m| m.id));

        NewTransactionGroup {
            date: main.date,
            payee: main.payee_or(FALLBACK_GROUP_PAYEE).to_string(),
            category_id: self.reimbursed_category,
            notes: group.attribution(),
            transactions,
        }
    }

    /// Split the expense if needed, then group the anchor with the matches
    pub fn commit(&self, group: &ReimbursementGroup) -> ReimburseResult<CommitOutcome> {
        if !group.is_ready() {
            return Err(ReimburseError::Validation(format!(
                "group for transaction {} is not ready: {}",
                group.main().id,
                group.readiness()
            )));
        }

        let (anchor_id, split_ids) = match self.split_portions(group) {
            None => (group.main().id, Vec::new()),
            Some(portions) => {
                let split_ids = self.ledger.split_transaction(group.main().id, &portions)?;
                let anchor_id = self
                    .find_reimbursed_split(&split_ids)
                    .map_err(|e| ungrouped_split(group.main().id, &split_ids, e))?;
                (anchor_id, split_ids)
            }
        };

        let group_id = self
            .ledger
            .create_group(&self.group_request(group, anchor_id))
            .map_err(|e| {
                if split_ids.is_empty() {
                    e
                } else {
                    ungrouped_split(group.main().id, &split_ids, e)
                }
            })?;

        tracing::debug!(
            main = %group.main().id,
            anchor = %anchor_id,
            group = %group_id,
            split = !split_ids.is_empty(),
            "committed reimbursement group"
        );

        Ok(CommitOutcome {
            group_id,
            anchor_id,
            split_ids,
        })
    }

    /// Fetch the split results and pick the one in the reimbursed category
    fn find_reimbursed_split(&self, split_ids: &[TransactionId]) -> ReimburseResult<TransactionId> {
        for id in split_ids {
            let txn = self.ledger.transaction(*id)?;
            if txn.in_category(self.reimbursed_category) {
                return Ok(txn.id);
            }
        }

        Err(ReimburseError::Ledger(format!(
            "none of the split transactions {:?} landed in the reimbursed category",
            split_ids.iter().map(|id| id.get()).collect::<Vec<_>>()
        )))
    }
}

/// The split already happened, so its children are left in the ledger without a group
fn ungrouped_split(
    main: TransactionId,
    split_ids: &[TransactionId],
    error: ReimburseError,
) -> ReimburseError {
    let children = split_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    tracing::error!(
        main = %main,
        children = %children,
        "split transactions left ungrouped"
    );
    ReimburseError::Ledger(format!(
        "transaction {} was split into [{}] but the split was not grouped, \
         group those transactions by hand: {}",
        main, children, error
    ))
}
