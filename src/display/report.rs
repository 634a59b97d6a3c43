//! Run report formatting
//!
//! Renders what a reconciliation run did (or would do, on a dry run) as plain
//! text for the terminal.

use crate::models::ReimbursementGroup;
use crate::services::{RunOutcome, RunReport};
use crate::storage::RunState;

use super::transaction::{format_id_list, truncate};

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Format one group: the expense, each match, and the user's share
pub fn format_group(group: &ReimbursementGroup) -> String {
    let main = group.main();
    let mut output = format!(
        "{} {} ({})  confidence {:.0}%\n",
        main.date.format("%Y-%m-%d"),
        main.payee_or("(no payee)"),
        main.amount,
        group.confidence() * 100.0
    );

    for m in group.matches() {
        output.push_str(&format!(
            "    → {} paid {}",
            truncate(m.payee_or("Someone"), 20).trim_end(),
            m.amount.abs()
        ));
        if !m.notes_str().is_empty() {
            output.push_str(&format!(" [{}]", m.notes_str()));
        }
        output.push('\n');
    }

    output.push_str(&format!("    → You paid {}\n", group.you_pay()));
    if !group.confidence_reason().is_empty() {
        output.push_str(&format!("    {}\n", group.confidence_reason()));
    }
    output
}

/// Format the full report for a run
pub fn format_run_report(report: &RunReport) -> String {
    let mut output = String::new();

    if report.dry_run {
        output.push_str("Dry run: no changes were made to the ledger or the state file.\n\n");
    }

    output.push_str(&format!(
        "Candidates: {} reimbursement(s), {} pending expense(s)\n",
        report.candidates.reimbursements().len(),
        report.candidates.mains().len()
    ));

    match report.outcome {
        RunOutcome::NothingToDo => {
            output.push_str("Nothing to match.\n");
            return output;
        }
        RunOutcome::Unchanged => {
            output.push_str("No changes since the last run; skipped matching.\n");
            return output;
        }
        RunOutcome::Processed => {}
    }

    let committed_title = if report.dry_run {
        "Would commit"
    } else {
        "Committed"
    };
    output.push('\n');
    output.push_str(&format!("{} ({})\n", committed_title, report.committed.len()));
    output.push_str(&separator(50));
    output.push('\n');
    for entry in &report.committed {
        output.push_str(&format_group(&entry.group));
        if let Some(commit) = &entry.commit {
            let split = if commit.was_split() { ", split" } else { "" };
            output.push_str(&format!("    group {}{}\n", commit.group_id, split));
        }
    }

    if !report.unready.is_empty() {
        output.push('\n');
        output.push_str(&format!("Not ready ({})\n", report.unready.len()));
        output.push_str(&separator(50));
        output.push('\n');
        for group in &report.unready {
            output.push_str(&format_group(group));
            output.push_str(&format!("    {}\n", group.readiness()));
        }
    }

    if !report.failed.is_empty() {
        output.push('\n');
        output.push_str(&format!("Failed ({})\n", report.failed.len()));
        output.push_str(&separator(50));
        output.push('\n');
        for failure in &report.failed {
            output.push_str(&format!("  {}: {}\n", failure.payee(), failure.error));
        }
    }

    output.push('\n');
    output.push_str(&format_run_state(&report.unprocessed));
    output
}

/// Format the unprocessed set
pub fn format_run_state(state: &RunState) -> String {
    if state.is_empty() {
        "Unprocessed: none\n".to_string()
    } else {
        format!(
            "Unprocessed ({}): {}\n",
            state.len(),
            format_id_list(state.unprocessed())
        )
    }
}
