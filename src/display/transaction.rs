//! Transaction display formatting

use crate::models::{Transaction, TransactionId};

/// Format a single transaction for display (one line)
pub fn format_transaction_row(txn: &Transaction) -> String {
    let grouped = if txn.is_grouped() { "⛓" } else { " " };

    format!(
        "{} {:>8} {} {:20} {:>12}  {}",
        grouped,
        txn.id,
        txn.date.format("%Y-%m-%d"),
        truncate(txn.payee_or("(no payee)"), 20),
        txn.amount,
        txn.notes_str()
    )
}

/// Format a titled list of transactions
pub fn format_transaction_list(title: &str, transactions: &[Transaction]) -> String {
    let mut output = format!("{} ({})\n", title, transactions.len());
    if transactions.is_empty() {
        output.push_str("  (none)\n");
        return output;
    }

    for txn in transactions {
        output.push_str("  ");
        output.push_str(&format_transaction_row(txn));
        output.push('\n');
    }
    output
}

/// Format a set of IDs as a comma-separated list
pub fn format_id_list<'a>(ids: impl IntoIterator<Item = &'a TransactionId>) -> String {
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pad or truncate to exactly `max_len` characters
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
