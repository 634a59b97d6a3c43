//! Transaction model
//!
//! A read-only view of a ledger transaction plus the two mutation requests the
//! reconciler issues against the ledger: splitting a transaction and grouping
//! several transactions together.
//!
//! Amounts follow one convention everywhere: expenses are positive, income
//! (including incoming reimbursements) is negative.

use chrono::NaiveDate;
use std::fmt;

use super::category::Tag;
use super::ids::{CategoryId, TagId, TransactionId};
use super::money::Money;

/// Clearing status of a ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionStatus {
    /// Not yet reviewed in the ledger
    #[default]
    Uncleared,
    /// Reviewed in the ledger
    Cleared,
    /// Still pending at the bank
    Pending,
}

impl TransactionStatus {
    /// The wire name used by the ledger API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uncleared => "uncleared",
            Self::Cleared => "cleared",
            Self::Pending => "pending",
        }
    }

    /// Parse the ledger's wire name
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "uncleared" => Some(Self::Uncleared),
            "cleared" => Some(Self::Cleared),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uncleared => write!(f, "Uncleared"),
            Self::Cleared => write!(f, "Cleared"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

/// A ledger transaction as seen by the reconciler
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Ledger identifier
    pub id: TransactionId,

    /// Transaction date
    pub date: NaiveDate,

    /// Payee name, if the ledger has one
    pub payee: Option<String>,

    /// Amount (positive for expenses, negative for income)
    pub amount: Money,

    /// Category, if assigned
    pub category_id: Option<CategoryId>,

    /// Free-text notes
    pub notes: Option<String>,

    /// Name as reported by the original source (bank, payments app)
    pub original_name: Option<String>,

    /// The ledger group this transaction already belongs to
    pub group_id: Option<TransactionId>,

    /// Tags attached to the transaction
    pub tags: Vec<Tag>,

    /// Clearing status
    pub status: TransactionStatus,
}

impl Transaction {
    /// Create a bare transaction
    pub fn new(id: TransactionId, date: NaiveDate, amount: Money) -> Self {
        Self {
            id,
            date,
            payee: None,
            amount,
            category_id: None,
            notes: None,
            original_name: None,
            group_id: None,
            tags: Vec::new(),
            status: TransactionStatus::Uncleared,
        }
    }

    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_original_name(mut self, original_name: impl Into<String>) -> Self {
        self.original_name = Some(original_name.into());
        self
    }

    pub fn with_group(mut self, group_id: TransactionId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Check if this transaction already belongs to a ledger group
    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }

    /// Check if this is money going out (positive amount)
    pub fn is_expense(&self) -> bool {
        self.amount.is_positive()
    }

    /// Check if the transaction carries the given tag
    pub fn has_tag(&self, tag_id: TagId) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    /// Check if the transaction is in the given category
    pub fn in_category(&self, category_id: CategoryId) -> bool {
        self.category_id == Some(category_id)
    }

    /// Payee name, or `fallback` when the ledger has none
    pub fn payee_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.payee.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => fallback,
        }
    }

    /// First whitespace-delimited word of the payee (usually a first name)
    pub fn payee_first_word(&self) -> Option<&str> {
        self.payee.as_deref().and_then(|p| p.split_whitespace().next())
    }

    pub fn notes_str(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.payee_or("(no payee)"),
            self.amount
        )
    }
}

/// One portion of a split request
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPortion {
    pub date: NaiveDate,
    /// `None` leaves the portion uncategorized
    pub category_id: Option<CategoryId>,
    pub notes: String,
    /// Same sign as the parent transaction
    pub amount: Money,
}

/// Request to bundle several transactions into one ledger group
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransactionGroup {
    pub date: NaiveDate,
    pub payee: String,
    pub category_id: CategoryId,
    pub notes: String,
    pub transactions: Vec<TransactionId>,
}
