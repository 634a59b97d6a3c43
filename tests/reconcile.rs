//! End-to-end runs against the in-memory ledger and a scripted oracle

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use reimburse_cli::error::{ReimburseError, ReimburseResult};
use reimburse_cli::ledger::InMemoryLedger;
use reimburse_cli::models::{
    Category, CategoryId, Money, ReimbursementGroup, Tag, TagId, Transaction, TransactionId,
};
use reimburse_cli::notify::Notifier;
use reimburse_cli::oracle::{MatchOracle, MatchRequest};
use reimburse_cli::services::{LedgerNames, Reconciler, RunOptions, RunOutcome};

const VENMO: CategoryId = CategoryId::new(1);
const REIMBURSED: CategoryId = CategoryId::new(2);
const SNACKS: CategoryId = CategoryId::new(3);
const PENDING: TagId = TagId::new(9);

struct ScriptedOracle {
    response: String,
    calls: Cell<usize>,
    last_request: RefCell<Option<MatchRequest>>,
}

impl ScriptedOracle {
    fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: Cell::new(0),
            last_request: RefCell::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl MatchOracle for ScriptedOracle {
    fn propose(&self, request: &MatchRequest) -> ReimburseResult<String> {
        self.calls.set(self.calls.get() + 1);
        *self.last_request.borrow_mut() = Some(request.clone());
        Ok(self.response.clone())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: RefCell<Vec<TransactionId>>,
    fail: bool,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, group: &ReimbursementGroup) -> ReimburseResult<()> {
        if self.fail {
            return Err(ReimburseError::Notify("chat not found".into()));
        }
        self.sent.borrow_mut().push(group.main().id);
        Ok(())
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn main_txn(id: i64, cents: i64, payee: &str, notes: &str) -> Transaction {
    Transaction::new(TransactionId::new(id), date(), Money::from_cents(cents))
        .with_category(SNACKS)
        .with_payee(payee)
        .with_notes(notes)
        .with_tag(Tag::new(PENDING, "Pending Venmo"))
}

fn reimbursement(id: i64, cents: i64, payee: &str) -> Transaction {
    Transaction::new(TransactionId::new(id), date(), Money::from_cents(cents))
        .with_category(VENMO)
        .with_payee(payee)
        .with_notes("thanks!")
}

fn base_ledger() -> InMemoryLedger {
    InMemoryLedger::new()
        .with_category(Category::new(VENMO, "Venmo"))
        .with_category(Category::new(REIMBURSED, "Reimbursed"))
        .with_category(Category::new(SNACKS, "Snacks"))
        .with_tag(Tag::new(PENDING, "Pending Venmo"))
}

fn options(dir: &TempDir) -> RunOptions {
    RunOptions {
        names: LedgerNames {
            reimbursement_category: "Venmo".into(),
            reimbursed_category: "Reimbursed".into(),
            pending_tag: "Pending Venmo".into(),
        },
        lookback_days: 60,
        today: today(),
        dry_run: false,
        state_file: dir.path().join("unprocessed.json"),
    }
}

fn proposal(main: i64, matches: &[i64], missing: bool) -> String {
    format!(
        r#"{{"transaction_id": {}, "matches": {:?}, "missing_reimbursements": {}, "confidence": 0.9, "confidence_reason": "Amounts and dates line up"}}"#,
        main, matches, missing
    )
}

fn response(proposals: &[String]) -> String {
    format!("[{}]", proposals.join(","))
}

fn stored_ids(path: &Path) -> Vec<i64> {
    let contents = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&contents).unwrap()
}

fn state_path(dir: &TempDir) -> PathBuf {
    dir.path().join("unprocessed.json")
}

#[test]
fn test_partial_reimbursement_is_split_then_grouped() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 1200, "Boba Guys", "Waiting on Eric [Boba]"))
        .with_transaction(reimbursement(200, -600, "Eric Smith"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[200], false)]));

    let report = Reconciler::new(&ledger, &oracle).run(&options(&dir)).unwrap();

    assert_eq!(report.outcome, RunOutcome::Processed);
    assert_eq!(report.committed.len(), 1);
    assert!(report.failed.is_empty());

    let splits = ledger.splits();
    assert_eq!(splits.len(), 1);
    let (parent, portions) = &splits[0];
    assert_eq!(*parent, TransactionId::new(100));
    assert_eq!(portions[0].amount, Money::from_cents(600));
    assert_eq!(portions[0].category_id, Some(REIMBURSED));
    assert_eq!(portions[0].notes, "");
    assert_eq!(portions[1].amount, Money::from_cents(600));
    assert_eq!(portions[1].category_id, Some(SNACKS));
    assert_eq!(portions[1].notes, "Boba");

    let commit = report.committed[0].commit.as_ref().unwrap();
    assert!(commit.was_split());
    let (_, request) = &ledger.groups()[0];
    assert_eq!(
        request.transactions,
        vec![commit.anchor_id, TransactionId::new(200)]
    );
    assert_eq!(request.category_id, REIMBURSED);
    assert_eq!(request.payee, "Boba Guys");
    assert_eq!(request.notes, "Eric");

    assert!(report.unprocessed.is_empty());
    assert!(stored_ids(&state_path(&dir)).is_empty());
}

#[test]
fn test_full_reimbursement_is_grouped_without_split() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 600, "Tacos", "Waiting on Dana [Lunch]"))
        .with_transaction(reimbursement(200, -600, "Dana Lee"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[200], false)]));

    let report = Reconciler::new(&ledger, &oracle).run(&options(&dir)).unwrap();

    assert!(ledger.splits().is_empty());
    let (group_id, request) = &ledger.groups()[0];
    assert_eq!(
        request.transactions,
        vec![TransactionId::new(100), TransactionId::new(200)]
    );
    assert_eq!(ledger.get(TransactionId::new(100)).unwrap().group_id, Some(*group_id));
    assert!(!report.committed[0].commit.as_ref().unwrap().was_split());
}

#[test]
fn test_missing_reimbursements_are_reported_and_kept() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 1200, "Pizza", "Waiting on Eric and Dana [Pizza]"))
        .with_transaction(reimbursement(200, -800, "Eric Smith"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[200], true)]));

    let report = Reconciler::new(&ledger, &oracle).run(&options(&dir)).unwrap();

    assert!(report.committed.is_empty());
    assert_eq!(report.unready.len(), 1);
    assert_eq!(ledger.mutation_count(), 0);
    assert_eq!(stored_ids(&state_path(&dir)), vec![100, 200]);
}

#[test]
fn test_over_matched_group_is_not_committed() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 500, "Cafe", "Waiting on Eric [Coffee]"))
        .with_transaction(reimbursement(200, -900, "Eric Smith"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[200], false)]));

    let report = Reconciler::new(&ledger, &oracle).run(&options(&dir)).unwrap();

    assert_eq!(report.unready.len(), 1);
    assert_eq!(ledger.mutation_count(), 0);
    assert_eq!(report.unprocessed.len(), 2);
}

#[test]
fn test_unchanged_candidates_skip_the_oracle() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 1200, "Pizza", "Waiting on Eric and Dana [Pizza]"))
        .with_transaction(reimbursement(200, -800, "Eric Smith"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[200], true)]));
    let reconciler = Reconciler::new(&ledger, &oracle);

    let first = reconciler.run(&options(&dir)).unwrap();
    assert_eq!(first.outcome, RunOutcome::Processed);
    assert_eq!(oracle.calls(), 1);

    let second = reconciler.run(&options(&dir)).unwrap();
    assert_eq!(second.outcome, RunOutcome::Unchanged);
    assert_eq!(oracle.calls(), 1);
    assert_eq!(second.unprocessed, first.unprocessed);
}

#[test]
fn test_new_candidate_triggers_the_oracle_again() {
    let dir = TempDir::new().unwrap();
    std::fs::write(state_path(&dir), "[100]").unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 1200, "Pizza", "Waiting on Eric and Dana [Pizza]"))
        .with_transaction(reimbursement(200, -800, "Eric Smith"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[200], true)]));

    Reconciler::new(&ledger, &oracle).run(&options(&dir)).unwrap();
    assert_eq!(oracle.calls(), 1);
}

#[test]
fn test_one_failed_group_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 1200, "Boba Guys", "Waiting on Eric [Boba]"))
        .with_transaction(main_txn(101, 600, "Tacos", "Waiting on Dana [Lunch]"))
        .with_transaction(reimbursement(200, -600, "Eric Smith"))
        .with_transaction(reimbursement(201, -600, "Dana Lee"))
        .fail_mutations_for(TransactionId::new(100));
    let oracle = ScriptedOracle::new(response(&[
        proposal(100, &[200], false),
        proposal(101, &[201], false),
    ]));

    let report = Reconciler::new(&ledger, &oracle).run(&options(&dir)).unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].payee(), "Boba Guys");
    assert_eq!(report.committed.len(), 1);
    assert_eq!(report.committed[0].group.main().id, TransactionId::new(101));
    assert_eq!(stored_ids(&state_path(&dir)), vec![100, 200]);
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 1200, "Boba Guys", "Waiting on Eric [Boba]"))
        .with_transaction(reimbursement(200, -600, "Eric Smith"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[200], false)]));
    let notifier = RecordingNotifier::default();
    let mut opts = options(&dir);
    opts.dry_run = true;

    let report = Reconciler::new(&ledger, &oracle)
        .with_notifier(&notifier)
        .run(&opts)
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(oracle.calls(), 1);
    assert_eq!(report.committed.len(), 1);
    assert!(report.committed[0].commit.is_none());
    assert_eq!(ledger.mutation_count(), 0);
    assert!(notifier.sent.borrow().is_empty());
    assert!(!state_path(&dir).exists());
}

#[test]
fn test_malformed_response_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 1200, "Boba Guys", "Waiting on Eric [Boba]"))
        .with_transaction(reimbursement(200, -600, "Eric Smith"));
    let oracle = ScriptedOracle::new("I think 100 goes with 200.");

    let err = Reconciler::new(&ledger, &oracle)
        .run(&options(&dir))
        .unwrap_err();

    assert!(err.is_contract_violation());
    assert!(err.to_string().contains("I think 100 goes with 200."));
    assert_eq!(ledger.mutation_count(), 0);
    assert!(!state_path(&dir).exists());
}

#[test]
fn test_unknown_match_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 1200, "Boba Guys", "Waiting on Eric [Boba]"))
        .with_transaction(reimbursement(200, -600, "Eric Smith"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[999], false)]));

    let err = Reconciler::new(&ledger, &oracle)
        .run(&options(&dir))
        .unwrap_err();

    assert!(err.is_contract_violation());
    assert_eq!(ledger.mutation_count(), 0);
}

#[test]
fn test_missing_category_fails_before_the_oracle() {
    let dir = TempDir::new().unwrap();
    let ledger = InMemoryLedger::new()
        .with_category(Category::new(VENMO, "Venmo"))
        .with_tag(Tag::new(PENDING, "Pending Venmo"))
        .with_transaction(main_txn(100, 1200, "Boba Guys", "Waiting on Eric [Boba]"))
        .with_transaction(reimbursement(200, -600, "Eric Smith"));
    let oracle = ScriptedOracle::new("[]");

    let err = Reconciler::new(&ledger, &oracle)
        .run(&options(&dir))
        .unwrap_err();

    assert!(matches!(err, ReimburseError::Config(_)));
    assert!(err.to_string().contains("Reimbursed"));
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn test_nothing_to_do_records_candidates() {
    let dir = TempDir::new().unwrap();
    let ledger =
        base_ledger().with_transaction(main_txn(100, 1200, "Boba Guys", "Waiting on Eric [Boba]"));
    let oracle = ScriptedOracle::new("[]");

    let report = Reconciler::new(&ledger, &oracle).run(&options(&dir)).unwrap();

    assert_eq!(report.outcome, RunOutcome::NothingToDo);
    assert_eq!(oracle.calls(), 0);
    assert_eq!(stored_ids(&state_path(&dir)), vec![100]);
}

#[test]
fn test_grouped_and_stale_transactions_are_not_offered() {
    let dir = TempDir::new().unwrap();
    let stale = Transaction::new(
        TransactionId::new(300),
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        Money::from_cents(-500),
    )
    .with_category(VENMO);
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 1200, "Boba Guys", "Waiting on Eric [Boba]"))
        .with_transaction(reimbursement(200, -600, "Eric Smith"))
        .with_transaction(reimbursement(201, -400, "Dana Lee").with_group(TransactionId::new(50)))
        .with_transaction(stale);
    let oracle = ScriptedOracle::new("[]");

    let report = Reconciler::new(&ledger, &oracle).run(&options(&dir)).unwrap();

    assert_eq!(report.outcome, RunOutcome::Processed);
    assert_eq!(report.candidates.len(), 2);
    let request = oracle.last_request.borrow().clone().unwrap();
    assert!(request.table_csv.contains("100"));
    assert!(request.table_csv.contains("200"));
    assert!(!request.table_csv.contains("201"));
    assert!(!request.table_csv.contains("300"));
    assert!(request.system_prompt.contains("Venmo"));
    assert_eq!(stored_ids(&state_path(&dir)), vec![100, 200]);
}

#[test]
fn test_committed_groups_are_announced() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 600, "Tacos", "Waiting on Dana [Lunch]"))
        .with_transaction(reimbursement(200, -600, "Dana Lee"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[200], false)]));
    let notifier = RecordingNotifier::default();

    Reconciler::new(&ledger, &oracle)
        .with_notifier(&notifier)
        .run(&options(&dir))
        .unwrap();

    assert_eq!(*notifier.sent.borrow(), vec![TransactionId::new(100)]);
}

#[test]
fn test_failed_notification_keeps_the_group_pending() {
    let dir = TempDir::new().unwrap();
    let ledger = base_ledger()
        .with_transaction(main_txn(100, 600, "Tacos", "Waiting on Dana [Lunch]"))
        .with_transaction(reimbursement(200, -600, "Dana Lee"));
    let oracle = ScriptedOracle::new(response(&[proposal(100, &[200], false)]));
    let notifier = RecordingNotifier {
        fail: true,
        ..Default::default()
    };

    let report = Reconciler::new(&ledger, &oracle)
        .with_notifier(&notifier)
        .run(&options(&dir))
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].error, ReimburseError::Notify(_)));
    assert_eq!(ledger.groups().len(), 1);
    assert_eq!(stored_ids(&state_path(&dir)), vec![100, 200]);
}
