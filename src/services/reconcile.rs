//! Reconciliation run
//!
//! Drives one pass over the ledger: resolve the configured names, select
//! candidates, skip the oracle when nothing changed since the last run, ask
//! the oracle for groupings, commit the ready ones and remember what is left.
//!
//! Configuration problems and oracle failures abort the run. Anything that
//! goes wrong while committing or announcing a single group is recorded in
//! the report and the run moves on to the next group.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate};

use crate::error::{ReimburseError, ReimburseResult};
use crate::ledger::{Ledger, TransactionQuery};
use crate::models::{ReimbursementGroup, TransactionId};
use crate::notify::Notifier;
use crate::oracle::{build_request, interpret_response, MatchOracle};
use crate::storage::{RunState, RunStateStore};

use super::candidates::{CandidateRules, CandidateSet};
use super::committer::{CommitOutcome, GroupCommitter};
use super::resolve::LedgerNames;

/// Per-run settings
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub names: LedgerNames,
    /// How far back to look for uncleared transactions
    pub lookback_days: u32,
    /// End of the lookback window
    pub today: NaiveDate,
    /// Report what would happen without touching the ledger or the state file
    pub dry_run: bool,
    pub state_file: PathBuf,
}

impl RunOptions {
    /// First day of the lookback window
    pub fn start_date(&self) -> ReimburseResult<NaiveDate> {
        self.today
            .checked_sub_signed(Duration::days(i64::from(self.lookback_days)))
            .ok_or_else(|| {
                ReimburseError::Config(format!(
                    "lookback of {} days is out of range",
                    self.lookback_days
                ))
            })
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No reimbursements or no pending expenses to match
    NothingToDo,
    /// Candidates identical to the last run; the oracle was not consulted
    Unchanged,
    /// The oracle was consulted and its groups handled
    Processed,
}

/// A ready group and what committing it produced
#[derive(Debug, Clone)]
pub struct CommittedGroup {
    pub group: ReimbursementGroup,
    /// `None` on a dry run
    pub commit: Option<CommitOutcome>,
}

/// A ready group whose commit or notification failed
#[derive(Debug)]
pub struct FailedGroup {
    pub group: ReimbursementGroup,
    pub error: ReimburseError,
}

impl FailedGroup {
    pub fn payee(&self) -> &str {
        self.group.main().payee_or("(no payee)")
    }
}

/// Everything a run did, for display
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub dry_run: bool,
    pub candidates: CandidateSet,
    pub committed: Vec<CommittedGroup>,
    pub unready: Vec<ReimbursementGroup>,
    pub failed: Vec<FailedGroup>,
    /// The state recorded for the next run (not written on a dry run)
    pub unprocessed: RunState,
}

impl RunReport {
    fn new(outcome: RunOutcome, dry_run: bool, candidates: CandidateSet) -> Self {
        Self {
            outcome,
            dry_run,
            candidates,
            committed: Vec::new(),
            unready: Vec::new(),
            failed: Vec::new(),
            unprocessed: RunState::default(),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Service that runs one reconciliation pass
pub struct Reconciler<'a> {
    ledger: &'a dyn Ledger,
    oracle: &'a dyn MatchOracle,
    notifier: Option<&'a dyn Notifier>,
}

impl<'a> Reconciler<'a> {
    pub fn new(ledger: &'a dyn Ledger, oracle: &'a dyn MatchOracle) -> Self {
        Self {
            ledger,
            oracle,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: &'a dyn Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn run(&self, options: &RunOptions) -> ReimburseResult<RunReport> {
        let categories = self.ledger.categories()?;
        let tags = self.ledger.tags()?;
        let resolved = options.names.resolve_in(&categories, &tags)?;

        let rules = CandidateRules {
            reimbursement_category: resolved.reimbursement_category.id,
            pending_tag: resolved.pending_tag.id,
        };

        let query = TransactionQuery::uncleared(options.start_date()?, options.today);
        let transactions = self.ledger.transactions(&query)?;
        let fetched = transactions.len();
        let candidates = CandidateSet::select(transactions, &rules);
        let candidate_ids = candidates.ids();

        tracing::debug!(
            fetched,
            reimbursements = candidates.reimbursements().len(),
            mains = candidates.mains().len(),
            "selected candidates"
        );

        let store = RunStateStore::new(&options.state_file);

        if !candidates.is_actionable() {
            tracing::info!(
                reimbursements = candidates.reimbursements().len(),
                mains = candidates.mains().len(),
                "nothing to match"
            );
            let mut report = RunReport::new(RunOutcome::NothingToDo, options.dry_run, candidates);
            report.unprocessed = RunState::new(candidate_ids);
            if !options.dry_run {
                store.save(&report.unprocessed)?;
            }
            return Ok(report);
        }

        let previous = store.load()?;
        if previous.matches(&candidate_ids) {
            tracing::info!(
                candidates = candidate_ids.len(),
                "candidates unchanged since last run, skipping oracle"
            );
            let mut report = RunReport::new(RunOutcome::Unchanged, options.dry_run, candidates);
            report.unprocessed = previous;
            return Ok(report);
        }

        let request = build_request(
            &resolved.reimbursement_category.name,
            &categories,
            candidates.iter(),
        )?;
        tracing::debug!(
            prompt_bytes = request.system_prompt.len(),
            table_bytes = request.table_csv.len(),
            "built match request"
        );

        let raw = self.oracle.propose(&request)?;

        let groups = interpret_response(&raw, &candidates)?;

        let committer = GroupCommitter::new(self.ledger, resolved.reimbursed_category.id);
        let mut report = RunReport::new(RunOutcome::Processed, options.dry_run, candidates);
        let mut settled: BTreeSet<TransactionId> = BTreeSet::new();

        for group in groups {
            if !group.is_ready() {
                tracing::warn!(
                    payee = group.main().payee_or("(no payee)"),
                    readiness = %group.readiness(),
                    reason = group.confidence_reason(),
                    "group not ready, leaving for a later run"
                );
                report.unready.push(group);
                continue;
            }

            if options.dry_run {
                settled.extend(group.transaction_ids());
                report.committed.push(CommittedGroup {
                    group,
                    commit: None,
                });
                continue;
            }

            match self.commit_and_notify(&committer, &group) {
                Ok(commit) => {
                    settled.extend(group.transaction_ids());
                    report.committed.push(CommittedGroup {
                        group,
                        commit: Some(commit),
                    });
                }
                Err(error) => {
                    tracing::error!(
                        payee = group.main().payee_or("(no payee)"),
                        error = %error,
                        "failed to process group"
                    );
                    report.failed.push(FailedGroup { group, error });
                }
            }
        }

        report.unprocessed = RunState::new(candidate_ids.difference(&settled).copied());
        if !options.dry_run {
            store.save(&report.unprocessed)?;
        }

        tracing::info!(
            committed = report.committed.len(),
            unready = report.unready.len(),
            failed = report.failed.len(),
            unprocessed = report.unprocessed.len(),
            "run complete"
        );

        Ok(report)
    }

    fn commit_and_notify(
        &self,
        committer: &GroupCommitter<'_>,
        group: &ReimbursementGroup,
    ) -> ReimburseResult<CommitOutcome> {
        let commit = committer.commit(group)?;
        if let Some(notifier) = self.notifier {
            notifier.notify(group)?;
        }
        Ok(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(today: NaiveDate, lookback_days: u32) -> RunOptions {
        RunOptions {
            names: LedgerNames {
                reimbursement_category: "Venmo".into(),
                reimbursed_category: "Reimbursed".into(),
                pending_tag: "Pending Venmo".into(),
            },
            lookback_days,
            today,
            dry_run: false,
            state_file: PathBuf::from("unprocessed.json"),
        }
    }

    #[test]
    fn test_start_date() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(
            options(today, 60).start_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
        assert_eq!(options(today, 0).start_date().unwrap(), today);
    }

    #[test]
    fn test_start_date_out_of_range() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let err = options(today, 200_000_000).start_date().unwrap_err();
        assert!(matches!(err, ReimburseError::Config(_)));
        assert!(err.to_string().contains("200000000 days"));
    }
}
