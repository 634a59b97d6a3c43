//! Matching oracle collaborator
//!
//! An external language model proposes which reimbursements pay back which
//! expenses. The oracle only ever sees a request and returns raw text; the
//! contract module decides whether that text is usable.

pub mod contract;
pub mod openai;
pub mod prompt;

use crate::error::ReimburseResult;

pub use contract::{interpret_response, GroupProposal};
pub use openai::OpenAiOracle;
pub use prompt::build_request;

/// Everything sent to the oracle in one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    /// Fixed instruction document
    pub system_prompt: String,
    /// Candidate transactions as CSV
    pub table_csv: String,
}

/// Proposes groupings for a table of candidate transactions
pub trait MatchOracle {
    /// Send the request and return the raw response text
    fn propose(&self, request: &MatchRequest) -> ReimburseResult<String>;
}
