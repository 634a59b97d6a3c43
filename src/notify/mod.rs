//! Notification collaborator
//!
//! After a group is committed the user gets a short summary. Delivery is
//! best-effort: callers log failures and carry on.

pub mod telegram;

use crate::error::ReimburseResult;
use crate::models::ReimbursementGroup;

pub use telegram::TelegramNotifier;

/// Announces committed groups
pub trait Notifier {
    fn notify(&self, group: &ReimbursementGroup) -> ReimburseResult<()>;
}
