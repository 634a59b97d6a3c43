//! Reimbursement group model
//!
//! One expense plus the reimbursement transfers the oracle matched to it.
//! A group is built once from an oracle proposal and never changes; every
//! financial figure is derived on demand from the member transactions.

use std::collections::HashSet;
use std::fmt;

use super::ids::TransactionId;
use super::money::Money;
use super::note::extract_primary_note;
use super::transaction::Transaction;
use crate::error::{ReimburseError, ReimburseResult};

/// Why a group may or may not be committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Safe to split and group in the ledger
    Ready,
    /// The main transaction's note implies more reimbursers than were matched
    MissingReimbursements,
    /// The matches add up to more than the main transaction
    OverMatched { excess: Money },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::MissingReimbursements => write!(f, "waiting on more reimbursements"),
            Self::OverMatched { excess } => {
                write!(f, "matches exceed the expense by {}", excess)
            }
        }
    }
}

/// An expense and the transfers that reimburse it
#[derive(Debug, Clone, PartialEq)]
pub struct ReimbursementGroup {
    main: Transaction,
    matches: Vec<Transaction>,
    missing_reimbursements: bool,
    confidence: f64,
    confidence_reason: String,
}

impl ReimbursementGroup {
    /// Build a group, rejecting matches that repeat or include the main transaction
    pub fn new(
        main: Transaction,
        matches: Vec<Transaction>,
        missing_reimbursements: bool,
        confidence: f64,
        confidence_reason: impl Into<String>,
    ) -> ReimburseResult<Self> {
        let mut seen = HashSet::new();
        for m in &matches {
            if m.id == main.id {
                return Err(ReimburseError::Validation(format!(
                    "transaction {} cannot reimburse itself",
                    main.id
                )));
            }
            if !seen.insert(m.id) {
                return Err(ReimburseError::Validation(format!(
                    "transaction {} matched more than once to {}",
                    m.id, main.id
                )));
            }
        }

        Ok(Self {
            main,
            matches,
            missing_reimbursements,
            confidence,
            confidence_reason: confidence_reason.into(),
        })
    }

    /// The expense being reimbursed
    pub fn main(&self) -> &Transaction {
        &self.main
    }

    /// The reimbursement transfers, in oracle order
    pub fn matches(&self) -> &[Transaction] {
        &self.matches
    }

    pub fn missing_reimbursements(&self) -> bool {
        self.missing_reimbursements
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn confidence_reason(&self) -> &str {
        &self.confidence_reason
    }

    /// Total paid back by others; the sign of each transfer is irrelevant
    pub fn they_pay(&self) -> Money {
        self.matches.iter().map(|m| m.amount.abs()).sum()
    }

    /// What the user still covers themselves; negative when over-matched
    pub fn you_pay(&self) -> Money {
        self.main.amount - self.they_pay()
    }

    pub fn readiness(&self) -> Readiness {
        let you_pay = self.you_pay();
        if self.missing_reimbursements {
            Readiness::MissingReimbursements
        } else if you_pay.is_negative() {
            Readiness::OverMatched { excess: you_pay.abs() }
        } else {
            Readiness::Ready
        }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness().is_ready()
    }

    /// Purchase description carried onto the self-paid split
    pub fn main_note(&self) -> &str {
        extract_primary_note(self.main.notes.as_deref())
    }

    /// Every member, main first
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        std::iter::once(&self.main).chain(self.matches.iter())
    }

    pub fn transaction_ids(&self) -> Vec<TransactionId> {
        self.transactions().map(|t| t.id).collect()
    }

    /// Short attribution for the ledger group: first word of each payer's name
    pub fn attribution(&self) -> String {
        self.matches
            .iter()
            .filter_map(|m| m.payee_first_word())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
