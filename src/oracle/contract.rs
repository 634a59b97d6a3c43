//! Inbound half of the matching contract
//!
//! The oracle's answer is a JSON array of grouping proposals. Interpretation
//! is all-or-nothing: any shape mismatch or reference to a transaction that
//! was not offered fails the whole run with the raw response attached, so a
//! half-understood answer can never reach the ledger.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{ReimburseError, ReimburseResult};
use crate::models::{ReimbursementGroup, TransactionId};
use crate::services::CandidateSet;

/// One grouping proposed by the oracle
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupProposal {
    pub transaction_id: TransactionId,
    pub matches: Vec<TransactionId>,
    pub missing_reimbursements: bool,
    pub confidence: f64,
    pub confidence_reason: String,
}

/// Strip a single surrounding markdown code fence, if present
fn unfence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => trimmed,
    }
}

/// Parse the raw response into proposals without consulting the candidates
pub fn parse_proposals(raw: &str) -> ReimburseResult<Vec<GroupProposal>> {
    serde_json::from_str(unfence(raw))
        .map_err(|e| ReimburseError::contract(format!("malformed proposals: {}", e), raw))
}

/// Turn proposals into groups, checking every reference against the candidates
pub fn build_groups(
    proposals: Vec<GroupProposal>,
    candidates: &CandidateSet,
    raw: &str,
) -> ReimburseResult<Vec<ReimbursementGroup>> {
    let violation = |reason: String| ReimburseError::contract(reason, raw);

    let mut seen_mains = HashSet::new();
    let mut seen_matches = HashSet::new();
    let mut groups = Vec::with_capacity(proposals.len());

    for proposal in proposals {
        let main = candidates.main(proposal.transaction_id).ok_or_else(|| {
            violation(format!(
                "transaction {} is not a main transaction from the table",
                proposal.transaction_id
            ))
        })?;

        if !seen_mains.insert(proposal.transaction_id) {
            return Err(violation(format!(
                "transaction {} is proposed more than once",
                proposal.transaction_id
            )));
        }

        if proposal.matches.is_empty() {
            return Err(violation(format!(
                "transaction {} has no matches",
                proposal.transaction_id
            )));
        }

        if !(0.0..=1.0).contains(&proposal.confidence) {
            return Err(violation(format!(
                "confidence {} for transaction {} is outside [0, 1]",
                proposal.confidence, proposal.transaction_id
            )));
        }

        let mut matches = Vec::with_capacity(proposal.matches.len());
        for id in &proposal.matches {
            let matched = candidates.reimbursement(*id).ok_or_else(|| {
                violation(format!(
                    "match {} for transaction {} is not a reimbursement from the table",
                    id, proposal.transaction_id
                ))
            })?;
            if !seen_matches.insert(*id) {
                return Err(violation(format!(
                    "reimbursement {} is matched more than once",
                    id
                )));
            }
            matches.push(matched.clone());
        }

        let group = ReimbursementGroup::new(
            main.clone(),
            matches,
            proposal.missing_reimbursements,
            proposal.confidence,
            proposal.confidence_reason,
        )
        .map_err(|e| violation(e.to_string()))?;
        groups.push(group);
    }

    Ok(groups)
}

/// Parse and validate a raw oracle response in one step
pub fn interpret_response(
    raw: &str,
    candidates: &CandidateSet,
) -> ReimburseResult<Vec<ReimbursementGroup>> {
    let proposals = parse_proposals(raw)?;
    build_groups(proposals, candidates, raw)
}
