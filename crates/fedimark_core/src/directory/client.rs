//! Directory client contract and remote error taxonomy.
//!
//! # Responsibility
//! - Describe account, list, follower and notification calls against a
//!   Mastodon-compatible server.
//! - Keep transport details (HTTP, OAuth, WebSocket) outside core.
//!
//! # Invariants
//! - Implementations return explicit errors and never retry on their own.
//! - `add_member` is idempotent on the remote side.

use crate::model::account::{Account, CategoryList, FollowerPage, Identity, Page};
use crate::model::notification::{Notification, StreamEvent};
use crossbeam_channel::Receiver;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Remote-call failure reported by a directory client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Network or protocol failure before a response was received.
    Transport(String),
    /// Credentials were rejected.
    Unauthorized,
    /// Server asked the client to slow down.
    RateLimited,
    /// Referenced remote object does not exist.
    NotFound(String),
    /// Any other non-success response.
    Remote { status: u16, message: String },
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "directory transport failure: {message}"),
            Self::Unauthorized => write!(f, "directory rejected credentials"),
            Self::RateLimited => write!(f, "directory rate limit exceeded"),
            Self::NotFound(what) => write!(f, "directory object not found: {what}"),
            Self::Remote { status, message } => {
                write!(f, "directory call failed with status {status}: {message}")
            }
        }
    }
}

impl Error for DirectoryError {}

/// Remote directory calls consumed by the classification engine.
///
/// Identity-scoped calls receive the authenticated identity id explicitly so
/// implementations need not resolve it themselves.
pub trait DirectoryClient {
    /// Resolves the authenticated identity.
    fn resolve_self(&self) -> DirectoryResult<Identity>;

    /// Returns one page of accounts following `identity_id`.
    fn list_followers(&self, identity_id: &str, page: &Page) -> DirectoryResult<FollowerPage>;

    /// Returns every list owned by `identity_id`.
    fn list_category_lists(&self, identity_id: &str) -> DirectoryResult<Vec<CategoryList>>;

    /// Returns the lists owned by `identity_id` that contain `account_id`.
    fn list_account_category_lists(
        &self,
        identity_id: &str,
        account_id: &str,
    ) -> DirectoryResult<Vec<CategoryList>>;

    /// Creates a list titled `title` owned by `identity_id`.
    fn create_category_list(
        &self,
        identity_id: &str,
        title: &str,
    ) -> DirectoryResult<CategoryList>;

    fn add_member(&self, list_id: &str, account_id: &str) -> DirectoryResult<()>;

    fn remove_member(&self, list_id: &str, account_id: &str) -> DirectoryResult<()>;

    /// Fetches pending notifications, oldest first.
    fn fetch_notifications(&self, page: &Page) -> DirectoryResult<Vec<Notification>>;

    /// Clears the whole pending notification backlog.
    fn clear_notifications(&self) -> DirectoryResult<()>;

    /// Dismisses pending notifications up to and including `watermark`.
    fn dismiss_notifications_through(&self, watermark: &str) -> DirectoryResult<()>;

    /// Opens the live event stream; the receiver disconnects when the
    /// underlying connection closes.
    fn open_event_stream(&self) -> DirectoryResult<Receiver<StreamEvent>>;
}

impl<C: DirectoryClient + ?Sized> DirectoryClient for &C {
    fn resolve_self(&self) -> DirectoryResult<Identity> {
        (**self).resolve_self()
    }

    fn list_followers(&self, identity_id: &str, page: &Page) -> DirectoryResult<FollowerPage> {
        (**self).list_followers(identity_id, page)
    }

    fn list_category_lists(&self, identity_id: &str) -> DirectoryResult<Vec<CategoryList>> {
        (**self).list_category_lists(identity_id)
    }

    fn list_account_category_lists(
        &self,
        identity_id: &str,
        account_id: &str,
    ) -> DirectoryResult<Vec<CategoryList>> {
        (**self).list_account_category_lists(identity_id, account_id)
    }

    fn create_category_list(
        &self,
        identity_id: &str,
        title: &str,
    ) -> DirectoryResult<CategoryList> {
        (**self).create_category_list(identity_id, title)
    }

    fn add_member(&self, list_id: &str, account_id: &str) -> DirectoryResult<()> {
        (**self).add_member(list_id, account_id)
    }

    fn remove_member(&self, list_id: &str, account_id: &str) -> DirectoryResult<()> {
        (**self).remove_member(list_id, account_id)
    }

    fn fetch_notifications(&self, page: &Page) -> DirectoryResult<Vec<Notification>> {
        (**self).fetch_notifications(page)
    }

    fn clear_notifications(&self) -> DirectoryResult<()> {
        (**self).clear_notifications()
    }

    fn dismiss_notifications_through(&self, watermark: &str) -> DirectoryResult<()> {
        (**self).dismiss_notifications_through(watermark)
    }

    fn open_event_stream(&self) -> DirectoryResult<Receiver<StreamEvent>> {
        (**self).open_event_stream()
    }
}

/// Returns whether `accounts` contains an account with the same id.
pub(crate) fn contains_account(accounts: &[Account], account: &Account) -> bool {
    accounts.iter().any(|candidate| candidate.id == account.id)
}

#[cfg(test)]
mod tests {
    use super::{contains_account, DirectoryError};
    use crate::model::account::Account;

    #[test]
    fn display_messages_are_descriptive() {
        assert_eq!(
            DirectoryError::Remote {
                status: 502,
                message: "bad gateway".to_string()
            }
            .to_string(),
            "directory call failed with status 502: bad gateway"
        );
        assert!(DirectoryError::NotFound("list 9".to_string())
            .to_string()
            .contains("list 9"));
    }

    #[test]
    fn contains_account_matches_by_id_only() {
        let accounts = vec![Account::new("1", "a@x"), Account::new("2", "b@x")];
        assert!(contains_account(&accounts, &Account::new("2", "renamed@x")));
        assert!(!contains_account(&accounts, &Account::new("3", "a@x")));
    }
}
