//! Category and tag models
//!
//! Categories and tags are owned by the ledger; the reconciler only needs
//! their IDs and display names to resolve the names the user configured.

use super::ids::{CategoryId, TagId};

/// A ledger category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A ledger tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl Tag {
    pub fn new(id: TagId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Find a category by its exact display name
pub fn find_category<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.name == name)
}

/// Find a tag by its exact display name
pub fn find_tag<'a>(tags: &'a [Tag], name: &str) -> Option<&'a Tag> {
    tags.iter().find(|t| t.name == name)
}
