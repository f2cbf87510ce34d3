//! Account, identity and category list model.
//!
//! # Responsibility
//! - Describe the actors and lists the classifier and follower gate reason about.
//! - Provide pagination request/response shapes for paged enumeration.
//!
//! # Invariants
//! - `Identity` is resolved once per session and never refreshed.
//! - `CategoryList::title` is the lookup key for a category.

use serde::{Deserialize, Serialize};

/// Remote account identifier.
pub type AccountId = String;
/// Remote list identifier.
pub type ListId = String;

/// Default page size for paged remote enumeration.
pub const DEFAULT_PAGE_LIMIT: u32 = 40;

/// Authenticated actor on whose behalf remote calls are made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: AccountId,
    /// Handle, e.g. `bot@example.social`.
    pub acct: String,
}

impl Identity {
    pub fn new(id: impl Into<AccountId>, acct: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            acct: acct.into(),
        }
    }

    /// Returns this identity viewed as a plain remote account.
    pub fn as_account(&self) -> Account {
        Account::new(self.id.clone(), self.acct.clone())
    }
}

/// Remote actor being classified or checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Handle used in error and log messages.
    pub acct: String,
}

impl Account {
    pub fn new(id: impl Into<AccountId>, acct: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            acct: acct.into(),
        }
    }
}

/// Remote named list backing one category ("mark").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryList {
    pub id: ListId,
    /// Category name; unique per identity.
    pub title: String,
}

impl CategoryList {
    pub fn new(id: impl Into<ListId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Pagination request for paged remote enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    /// Opaque cursor returned by the previous page, if any.
    pub max_id: Option<String>,
}

impl Page {
    /// First page with the default limit.
    pub fn first() -> Self {
        Self::with_limit(DEFAULT_PAGE_LIMIT)
    }

    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            max_id: None,
        }
    }

    /// Page following `cursor`, keeping this page's limit.
    pub fn after(&self, cursor: impl Into<String>) -> Self {
        Self {
            limit: self.limit,
            max_id: Some(cursor.into()),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first()
    }
}

/// One page of follower accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerPage {
    pub accounts: Vec<Account>,
    /// Cursor for the following page; `None` when this is the last page.
    pub next: Option<String>,
}
