//! Outbound half of the matching contract
//!
//! Builds the instruction document and the CSV table of candidates sent to
//! the oracle.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{ReimburseError, ReimburseResult};
use crate::models::{Category, CategoryId, Transaction};

use super::MatchRequest;

/// Lowest confidence the oracle is asked to report
pub const MIN_CONFIDENCE: f64 = 0.4;

const INSTRUCTIONS: &str = r#"
You are given a CSV of my personal bank transactions. Positive amounts are
expenses, negative amounts are income. Match reimbursement transactions in the
`{category}` category to the other transactions (not in `{category}`) that
they pay back. Many `{category}` transactions may match one main transaction,
but a `{category}` transaction belongs to at most one group.

Use the `notes` column of each `{category}` transaction to find the `payee` of
the main transaction it pays back. The notes are typed by the friend paying me
back, so they rarely match the payee exactly; an exact match deserves very high
confidence. Every main transaction in the table is tagged as waiting on a
reimbursement, so it very likely has matching `{category}` transactions.

Example input:

```csv
transaction_id,category,payee,amount,notes,original_name
242330919,"{category}","Eric",-6.00,"Thanks for Boba Guys","Venmo"
242330918,"Snack","Boba Guys",12.00,"Waiting on Eric [Boba]","BOBAGUYS"
242330917,"Gas","BP Gas",24.00,"","BP"
```

I paid for Boba Guys and Eric paid me back $6 for his half. This is a HIGH
confidence match: the amount divides evenly and the note names the payee.

Example output:

```json
[
  {
    "transaction_id": 242330918,
    "matches": [242330919],
    "missing_reimbursements": false,
    "confidence": 0.9,
    "confidence_reason": "Amount evenly divides and the exact payee name is in the note"
  }
]
```

Rules:

- The output schema ALWAYS matches the example: `transaction_id` (integer),
  `matches` (non-empty list of integers), `missing_reimbursements` (boolean),
  `confidence` (number between 0 and 1), `confidence_reason` (string). No
  other fields.
- Usually part of a main transaction is my own share. Occasionally the
  `{category}` transactions cover all of it.
- A main transaction's notes may say who I am waiting on, in the form
  `Waiting on Alice and Bob [description]`. If some of those people have no
  matching `{category}` transaction yet, set `missing_reimbursements` to true.
- `confidence_reason` must say specifically WHY the matched transactions were
  included.
- Main transactions must not be in the `{category}` category.
- Only include main transactions that have matching `{category}` transactions.
  It is fine to return an empty list.
- A `{category}` transaction may be someone paying me for something I sold
  them rather than a reimbursement; leave those unmatched.
- Only include groups with confidence of at least {min_confidence}.
- DO NOT write code; do the matching yourself.
- Output ONLY valid machine-readable JSON. Do not explain or ask for
  clarification.
"#;

/// One row of the outbound table
#[derive(Debug, Serialize)]
struct PromptRow<'a> {
    transaction_id: i64,
    category: Option<&'a str>,
    payee: &'a str,
    amount: String,
    notes: &'a str,
    original_name: &'a str,
}

/// Instruction document for the given reimbursement category name
pub fn instructions(category: &str) -> String {
    INSTRUCTIONS
        .replace("{category}", category)
        .replace("{min_confidence}", &MIN_CONFIDENCE.to_string())
        .trim()
        .to_string()
}

/// Render candidates as CSV, skipping anything already grouped
pub fn transactions_table<'a>(
    categories: &[Category],
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> ReimburseResult<String> {
    let names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(Vec::new());

    for txn in transactions.into_iter().filter(|t| !t.is_grouped()) {
        writer
            .serialize(PromptRow {
                transaction_id: txn.id.get(),
                category: txn.category_id.and_then(|id| names.get(&id).copied()),
                payee: txn.payee.as_deref().unwrap_or(""),
                amount: txn.amount.to_decimal_string(),
                notes: txn.notes_str(),
                original_name: txn.original_name.as_deref().unwrap_or(""),
            })
            .map_err(|e| ReimburseError::Oracle(format!("Failed to build table: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReimburseError::Oracle(format!("Failed to build table: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| ReimburseError::Oracle(format!("Table is not valid UTF-8: {}", e)))
}

/// Assemble the full oracle request
pub fn build_request<'a>(
    category: &str,
    categories: &[Category],
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> ReimburseResult<MatchRequest> {
    Ok(MatchRequest {
        system_prompt: instructions(category),
        table_csv: transactions_table(categories, transactions)?,
    })
}
