//! Follower gate for rejecting actions from non-followers.
//!
//! # Responsibility
//! - Decide whether an account follows the authenticated identity.
//! - Expose follower enumeration as a lazy, restartable page sequence.
//!
//! # Invariants
//! - Nothing is cached; every check re-enumerates followers.
//! - Enumeration errors are returned unchanged, never mapped to "not a follower".
//! - A scan issues at most `page_limit` fetches and ends on a repeated cursor.

use crate::directory::client::{
    contains_account, DirectoryClient, DirectoryError, DirectoryResult,
};
use crate::directory::session::Session;
use crate::logging::sanitize_log_value;
use crate::model::account::{Account, Page, DEFAULT_PAGE_LIMIT};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default number of follower pages one check may fetch.
pub const DEFAULT_FOLLOWER_PAGE_BOUND: usize = 25;

/// Errors from the follower gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowerGateError {
    /// Account was not found among the scanned followers.
    NotFollower { acct: String },
    /// Authenticated identity could not be resolved.
    Identity(DirectoryError),
    /// Follower enumeration failed.
    Directory(DirectoryError),
}

impl Display for FollowerGateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFollower { acct } => write!(f, "ignore from non follower {acct}"),
            Self::Identity(err) => write!(f, "failed to resolve own identity: {err}"),
            Self::Directory(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FollowerGateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFollower { .. } => None,
            Self::Identity(err) | Self::Directory(err) => Some(err),
        }
    }
}

/// Lazy sequence of follower pages for one identity.
///
/// Each `next` issues one remote call. The sequence ends after the last page
/// (no cursor) or after the first error. A cursor that was already requested
/// yields a `DirectoryError::Transport` error instead of another fetch.
/// Create a new value to restart.
pub struct FollowerPages<'c, C: DirectoryClient> {
    client: &'c C,
    identity_id: String,
    pending: Option<Page>,
    seen_cursors: HashSet<String>,
}

impl<'c, C: DirectoryClient> FollowerPages<'c, C> {
    pub fn new(client: &'c C, identity_id: impl Into<String>, first: Page) -> Self {
        Self {
            client,
            identity_id: identity_id.into(),
            pending: Some(first),
            seen_cursors: HashSet::new(),
        }
    }
}

impl<C: DirectoryClient> Iterator for FollowerPages<'_, C> {
    type Item = DirectoryResult<Vec<Account>>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.pending.take()?;
        if let Some(cursor) = &page.max_id {
            if !self.seen_cursors.insert(cursor.clone()) {
                warn!(
                    "event=follower_pages_cursor_repeated module=follower_gate status=error cursor={}",
                    sanitize_log_value(cursor)
                );
                return Some(Err(DirectoryError::Transport(format!(
                    "follower cursor `{cursor}` did not advance"
                ))));
            }
        }

        match self.client.list_followers(&self.identity_id, &page) {
            Ok(result) => {
                self.pending = result.next.map(|cursor| page.after(cursor));
                Some(Ok(result.accounts))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Predicate service answering "does this account follow us?".
pub struct FollowerGate<'s, C: DirectoryClient> {
    session: &'s Session<C>,
    page_size: u32,
    page_limit: usize,
}

impl<'s, C: DirectoryClient> FollowerGate<'s, C> {
    /// Creates a gate scanning up to `DEFAULT_FOLLOWER_PAGE_BOUND` pages of
    /// `DEFAULT_PAGE_LIMIT` followers.
    pub fn new(session: &'s Session<C>) -> Self {
        Self {
            session,
            page_size: DEFAULT_PAGE_LIMIT,
            page_limit: DEFAULT_FOLLOWER_PAGE_BOUND,
        }
    }

    /// Bounds the scan to at most `pages` page fetches.
    ///
    /// Followers beyond the scanned pages are reported as non-followers.
    pub fn with_page_limit(mut self, pages: usize) -> Self {
        self.page_limit = pages;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Returns the lazy follower page sequence for the identity.
    pub fn follower_pages(&self) -> Result<FollowerPages<'s, C>, FollowerGateError> {
        let identity = self
            .session
            .identity()
            .map_err(FollowerGateError::Identity)?;
        Ok(FollowerPages::new(
            self.session.client(),
            identity.id.clone(),
            Page::with_limit(self.page_size),
        ))
    }

    /// Returns `Ok(())` iff `account` follows the identity.
    ///
    /// # Errors
    /// - `NotFollower` when no scanned page contains the account.
    /// - `Directory` when a page fetch fails or the server repeats a cursor;
    ///   scanning stops there.
    /// - `Identity` when the identity cannot be resolved.
    pub fn check_follower(&self, account: &Account) -> Result<(), FollowerGateError> {
        let pages = self.follower_pages()?;

        for page in pages.take(self.page_limit) {
            let followers = page.map_err(FollowerGateError::Directory)?;
            if contains_account(&followers, account) {
                return Ok(());
            }
        }

        info!(
            "event=follower_gate_rejected module=follower_gate status=ok acct={}",
            sanitize_log_value(&account.acct)
        );
        Err(FollowerGateError::NotFollower {
            acct: account.acct.clone(),
        })
    }
}
