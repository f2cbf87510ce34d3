//! Directory session with a once-resolved identity.
//!
//! # Responsibility
//! - Pair a directory client with the authenticated identity it acts for.
//! - Resolve that identity lazily, at most once per session.
//! - Hold the account lock registry every service on the session shares.
//!
//! # Invariants
//! - A successful resolution is never refreshed for the session lifetime.
//! - A failed resolution leaves the cache empty so a later call may retry.
//! - Concurrent first use performs a single assignment; no data race.

use crate::directory::client::{DirectoryClient, DirectoryResult};
use crate::directory::locks::AccountLocks;
use crate::logging::sanitize_log_value;
use crate::model::account::Identity;
use log::{error, info};
use once_cell::sync::OnceCell;

/// Directory client plus lazily cached identity.
pub struct Session<C: DirectoryClient> {
    client: C,
    identity: OnceCell<Identity>,
    account_locks: AccountLocks,
}

impl<C: DirectoryClient> Session<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            identity: OnceCell::new(),
            account_locks: AccountLocks::new(),
        }
    }

    /// Creates a session whose identity is already known.
    pub fn with_identity(client: C, identity: Identity) -> Self {
        Self {
            client,
            identity: OnceCell::with_value(identity),
            account_locks: AccountLocks::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the authenticated identity, resolving it on first use.
    ///
    /// # Errors
    /// - Returns the directory error when resolution fails. Callers treat
    ///   this as unrecoverable for the process.
    pub fn identity(&self) -> DirectoryResult<&Identity> {
        self.identity.get_or_try_init(|| {
            let identity = self.client.resolve_self().map_err(|err| {
                error!("event=identity_resolve module=directory status=error error={err}");
                err
            })?;
            info!(
                "event=identity_resolve module=directory status=ok acct={}",
                sanitize_log_value(&identity.acct)
            );
            Ok(identity)
        })
    }

    /// Returns the cached identity without resolving it.
    pub fn cached_identity(&self) -> Option<&Identity> {
        self.identity.get()
    }

    /// Per-account locks shared by every service built on this session.
    pub fn account_locks(&self) -> &AccountLocks {
        &self.account_locks
    }

    pub fn into_client(self) -> C {
        self.client
    }
}
