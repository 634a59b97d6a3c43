//! Service layer
//!
//! Business logic on top of the ledger and oracle collaborators: resolving
//! configured names, selecting candidates, committing groups and driving a
//! whole reconciliation run.

pub mod candidates;
pub mod committer;
pub mod reconcile;
pub mod resolve;

pub use candidates::{CandidateRules, CandidateSet};
pub use committer::{CommitOutcome, GroupCommitter, FALLBACK_GROUP_PAYEE};
pub use reconcile::{
    CommittedGroup, FailedGroup, Reconciler, RunOptions, RunOutcome, RunReport,
};
pub use resolve::{LedgerNames, ResolvedNames};
