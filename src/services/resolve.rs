//! Resolution of configured names against the ledger
//!
//! The user configures categories and the pending tag by display name. A run
//! resolves them to ledger IDs up front and aborts before any oracle call if
//! one of them does not exist.

use crate::error::{ReimburseError, ReimburseResult};
use crate::models::{find_category, find_tag, Category, Tag};

/// Display names as configured by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerNames {
    /// Category holding incoming reimbursement transfers
    pub reimbursement_category: String,
    /// Category assigned to groups and reimbursed split portions
    pub reimbursed_category: String,
    /// Tag on expenses awaiting reimbursement
    pub pending_tag: String,
}

/// The configured names, resolved to ledger entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub reimbursement_category: Category,
    pub reimbursed_category: Category,
    pub pending_tag: Tag,
}

impl LedgerNames {
    /// Resolve against categories and tags already fetched from the ledger
    pub fn resolve_in(
        &self,
        categories: &[Category],
        tags: &[Tag],
    ) -> ReimburseResult<ResolvedNames> {
        let category = |name: &str| {
            find_category(categories, name).cloned().ok_or_else(|| {
                ReimburseError::Config(format!("Category '{}' not found in the ledger", name))
            })
        };

        let pending_tag = find_tag(tags, &self.pending_tag).cloned().ok_or_else(|| {
            ReimburseError::Config(format!(
                "Tag '{}' not found in the ledger",
                self.pending_tag
            ))
        })?;

        Ok(ResolvedNames {
            reimbursement_category: category(&self.reimbursement_category)?,
            reimbursed_category: category(&self.reimbursed_category)?,
            pending_tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, TagId};

    fn names() -> LedgerNames {
        LedgerNames {
            reimbursement_category: "Venmo".into(),
            reimbursed_category: "Reimbursed".into(),
            pending_tag: "Pending Venmo".into(),
        }
    }

    #[test]
    fn test_resolves_all_names() {
        let categories = vec![
            Category::new(CategoryId::new(1), "Venmo"),
            Category::new(CategoryId::new(2), "Reimbursed"),
        ];
        let tags = vec![Tag::new(TagId::new(7), "Pending Venmo")];

        let resolved = names().resolve_in(&categories, &tags).unwrap();
        assert_eq!(resolved.reimbursement_category.id, CategoryId::new(1));
        assert_eq!(resolved.reimbursed_category.id, CategoryId::new(2));
        assert_eq!(resolved.pending_tag.id, TagId::new(7));
    }

    #[test]
    fn test_missing_category_is_config_error() {
        let categories = vec![Category::new(CategoryId::new(1), "Venmo")];
        let tags = vec![Tag::new(TagId::new(7), "Pending Venmo")];

        let err = names().resolve_in(&categories, &tags).unwrap_err();
        assert!(matches!(err, ReimburseError::Config(_)));
        assert!(err.to_string().contains("Reimbursed"));
    }

    #[test]
    fn test_missing_tag_is_config_error() {
        let categories = vec![
            Category::new(CategoryId::new(1), "Venmo"),
            Category::new(CategoryId::new(2), "Reimbursed"),
        ];

        let err = names().resolve_in(&categories, &[]).unwrap_err();
        assert!(err.to_string().contains("Pending Venmo"));
    }
}
