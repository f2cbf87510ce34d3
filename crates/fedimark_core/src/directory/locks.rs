//! Keyed mutual exclusion for per-account work.
//!
//! # Responsibility
//! - Serialize operations that touch the same remote account.
//! - Let operations on different accounts proceed independently.
//!
//! # Invariants
//! - An account id is present in the registry only while a guard for it is alive.
//! - Dropping a guard releases the id and wakes waiters.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Registry of account ids currently held by a guard.
#[derive(Debug, Default)]
pub struct AccountLocks {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until no other guard holds `account_id`, then holds it.
    pub fn lock(&self, account_id: &str) -> AccountGuard<'_> {
        let mut held = self.held_ids();
        while held.contains(account_id) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held.insert(account_id.to_string());
        AccountGuard {
            locks: self,
            account_id: account_id.to_string(),
        }
    }

    pub fn is_locked(&self, account_id: &str) -> bool {
        self.held_ids().contains(account_id)
    }

    /// Number of accounts currently held.
    pub fn len(&self) -> usize {
        self.held_ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn held_ids(&self) -> MutexGuard<'_, HashSet<String>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, account_id: &str) {
        self.held_ids().remove(account_id);
        self.released.notify_all();
    }
}

/// Holds one account id until dropped.
#[derive(Debug)]
pub struct AccountGuard<'l> {
    locks: &'l AccountLocks,
    account_id: String,
}

impl AccountGuard<'_> {
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        self.locks.release(&self.account_id);
    }
}
