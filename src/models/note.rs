//! Primary-note extraction
//!
//! Expenses awaiting reimbursement are annotated like
//! `Waiting on Alice and Bob [Dinner at Nopa]`. The text before the brackets
//! is bookkeeping for the reimbursement itself; the bracketed tail describes
//! the purchase and is what gets carried onto the self-paid split.

/// Return the contents of the bracketed segment that ends the note
///
/// Returns an empty string when the note is absent, empty, or does not end
/// in a `[...]` segment. Trailing whitespace after the closing bracket is
/// ignored, as is whitespace just inside the brackets.
pub fn extract_primary_note(note: Option<&str>) -> &str {
    let Some(note) = note else {
        return "";
    };

    let trimmed = note.trim_end();
    let Some(body) = trimmed.strip_suffix(']') else {
        return "";
    };

    match body.rfind('[') {
        Some(open) => body[open + 1..].trim(),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_bracketed_description() {
        assert_eq!(extract_primary_note(Some("Waiting on Alice [Dinner]")), "Dinner");
        assert_eq!(
            extract_primary_note(Some("Waiting on Alice and Bob [Dinner at Nopa]")),
            "Dinner at Nopa"
        );
    }

    #[test]
    fn test_missing_brackets_yield_empty() {
        assert_eq!(extract_primary_note(Some("Waiting on Alice")), "");
        assert_eq!(extract_primary_note(Some("")), "");
        assert_eq!(extract_primary_note(None), "");
    }

    #[test]
    fn test_only_trailing_segment_counts() {
        assert_eq!(extract_primary_note(Some("[Lunch] and more")), "");
        assert_eq!(extract_primary_note(Some("[old] Waiting on Eve [Tickets]")), "Tickets");
        assert_eq!(extract_primary_note(Some("Waiting on Eve [Tickets]  ")), "Tickets");
    }

    #[test]
    fn test_unbalanced_closing_bracket() {
        assert_eq!(extract_primary_note(Some("Waiting on Eve]")), "");
        assert_eq!(extract_primary_note(Some("[]")), "");
    }
}
