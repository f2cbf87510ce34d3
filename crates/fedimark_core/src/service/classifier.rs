//! Account classification ("mark") use-case service.
//!
//! # Responsibility
//! - Move an account into exactly one category list among the lists the
//!   identity administers.
//! - Create missing category lists on first use.
//! - Report partial convergence instead of hiding failed removals.
//!
//! # Invariants
//! - Removal failures never abort a classification; they are logged and
//!   collected into `ClassifyReport`.
//! - Target list lookup/creation and the final add are fatal for the call.
//! - Calls for the same account id are serialized by the session's
//!   `AccountLocks`, across every classifier on that session.

use crate::directory::client::{DirectoryClient, DirectoryError};
use crate::directory::locks::AccountLocks;
use crate::directory::session::Session;
use crate::logging::sanitize_log_value;
use crate::model::account::{Account, CategoryList, Identity};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One stale membership that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalFailure {
    pub list: CategoryList,
    pub error: DirectoryError,
}

/// Outcome of a successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyReport {
    /// List the account now belongs to.
    pub list: CategoryList,
    /// Whether `list` was created by this call.
    pub created: bool,
    /// Stale lists the account was removed from.
    pub removed: Vec<CategoryList>,
    /// Stale lists the account is still in.
    pub removal_failures: Vec<RemovalFailure>,
    /// Set when current memberships could not be fetched; no removal was tried.
    pub membership_lookup_error: Option<DirectoryError>,
}

impl ClassifyReport {
    /// Returns true when no stale membership may remain.
    pub fn is_converged(&self) -> bool {
        self.removal_failures.is_empty() && self.membership_lookup_error.is_none()
    }

    /// Turns a non-converged report into `ClassifyError::PartialConvergence`.
    pub fn into_converged(self) -> Result<Self, ClassifyError> {
        if self.is_converged() {
            Ok(self)
        } else {
            Err(ClassifyError::PartialConvergence(Box::new(self)))
        }
    }
}

/// Errors from classification.
#[derive(Debug)]
pub enum ClassifyError {
    /// Category name is blank after trim.
    InvalidCategory,
    /// Authenticated identity could not be resolved.
    Identity(DirectoryError),
    /// Owned lists could not be enumerated.
    ListLookup(DirectoryError),
    /// Missing category list could not be created.
    ListCreate {
        title: String,
        source: DirectoryError,
    },
    /// Account could not be added to the target list.
    AddMember {
        list: CategoryList,
        source: DirectoryError,
    },
    /// Account was added but stale memberships may remain.
    PartialConvergence(Box<ClassifyReport>),
}

impl Display for ClassifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCategory => write!(f, "category name must not be blank"),
            Self::Identity(err) => write!(f, "failed to resolve own identity: {err}"),
            Self::ListLookup(err) => write!(f, "failed to list category lists: {err}"),
            Self::ListCreate { title, source } => {
                write!(f, "failed to create category list `{title}`: {source}")
            }
            Self::AddMember { list, source } => {
                write!(f, "failed to add account to list `{}`: {source}", list.title)
            }
            Self::PartialConvergence(report) => {
                write!(
                    f,
                    "account added to `{}` but {} stale membership(s) could not be removed",
                    report.list.title,
                    report.removal_failures.len()
                )?;
                if report.membership_lookup_error.is_some() {
                    write!(f, " (current memberships could not be fetched)")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for ClassifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCategory => None,
            Self::Identity(err) | Self::ListLookup(err) => Some(err),
            Self::ListCreate { source, .. } | Self::AddMember { source, .. } => Some(source),
            Self::PartialConvergence(report) => report
                .membership_lookup_error
                .as_ref()
                .or_else(|| report.removal_failures.first().map(|failure| &failure.error))
                .map(|err| err as &(dyn Error + 'static)),
        }
    }
}

#[derive(Default)]
struct StaleCleanup {
    removed: Vec<CategoryList>,
    failures: Vec<RemovalFailure>,
    lookup_error: Option<DirectoryError>,
}

/// Classification service over a directory session.
pub struct Classifier<'s, C: DirectoryClient> {
    session: &'s Session<C>,
}

impl<'s, C: DirectoryClient> Classifier<'s, C> {
    pub fn new(session: &'s Session<C>) -> Self {
        Self { session }
    }

    /// Puts `account` into the list titled `category`, removing it from every
    /// other list the identity administers.
    ///
    /// # Contract
    /// - Removal failures are collected into the report, not returned.
    /// - If current memberships cannot be fetched, removal is skipped and
    ///   the routine still proceeds to the add.
    /// - A list with a matching title is reused; otherwise exactly one list
    ///   is created.
    /// - Calling twice with the same arguments issues no removal or creation
    ///   on the second call.
    ///
    /// # Errors
    /// - `InvalidCategory` for a blank name, before any remote call.
    /// - `Identity`, `ListLookup`, `ListCreate`, `AddMember` for fatal
    ///   remote failures.
    pub fn classify(
        &self,
        account: &Account,
        category: &str,
    ) -> Result<ClassifyReport, ClassifyError> {
        if category.trim().is_empty() {
            return Err(ClassifyError::InvalidCategory);
        }

        let _guard = self.session.account_locks().lock(&account.id);

        let identity = self.session.identity().map_err(ClassifyError::Identity)?;
        let cleanup = self.remove_stale_memberships(identity, account, category);

        let (list, created) = self.resolve_list(identity, category)?;
        self.session
            .client()
            .add_member(&list.id, &account.id)
            .map_err(|source| ClassifyError::AddMember {
                list: list.clone(),
                source,
            })?;

        let report = ClassifyReport {
            list,
            created,
            removed: cleanup.removed,
            removal_failures: cleanup.failures,
            membership_lookup_error: cleanup.lookup_error,
        };
        debug!(
            "event=classify_done module=classifier status=ok acct={} list={} removed={} failures={}",
            sanitize_log_value(&account.acct),
            sanitize_log_value(&report.list.title),
            report.removed.len(),
            report.removal_failures.len()
        );
        Ok(report)
    }

    /// Lock registry used to serialize calls per account.
    pub fn locks(&self) -> &'s AccountLocks {
        self.session.account_locks()
    }

    fn remove_stale_memberships(
        &self,
        identity: &Identity,
        account: &Account,
        category: &str,
    ) -> StaleCleanup {
        let mut cleanup = StaleCleanup::default();
        let client = self.session.client();
        let current = match client.list_account_category_lists(&identity.id, &account.id) {
            Ok(lists) => lists,
            Err(err) => {
                warn!(
                    "event=classify_membership_lookup_failed module=classifier status=error acct={} error={err}",
                    sanitize_log_value(&account.acct)
                );
                cleanup.lookup_error = Some(err);
                return cleanup;
            }
        };

        for list in current.into_iter().filter(|list| list.title != category) {
            match client.remove_member(&list.id, &account.id) {
                Ok(()) => cleanup.removed.push(list),
                Err(error) => {
                    warn!(
                        "event=classify_removal_failed module=classifier status=error acct={} list={} error={error}",
                        sanitize_log_value(&account.acct),
                        sanitize_log_value(&list.title)
                    );
                    cleanup.failures.push(RemovalFailure { list, error });
                }
            }
        }
        cleanup
    }

    fn resolve_list(
        &self,
        identity: &Identity,
        title: &str,
    ) -> Result<(CategoryList, bool), ClassifyError> {
        let client = self.session.client();
        let lists = client
            .list_category_lists(&identity.id)
            .map_err(ClassifyError::ListLookup)?;
        if let Some(existing) = lists.into_iter().find(|list| list.title == title) {
            return Ok((existing, false));
        }

        let created = client
            .create_category_list(&identity.id, title)
            .map_err(|source| ClassifyError::ListCreate {
                title: title.to_string(),
                source,
            })?;
        info!(
            "event=classify_list_created module=classifier status=ok list={} id={}",
            sanitize_log_value(&created.title),
            created.id
        );
        Ok((created, true))
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassifyError, ClassifyReport, RemovalFailure};
    use crate::directory::client::DirectoryError;
    use crate::model::account::CategoryList;
    use std::error::Error;

    fn report() -> ClassifyReport {
        ClassifyReport {
            list: CategoryList::new("10", "friends"),
            created: false,
            removed: vec![],
            removal_failures: vec![],
            membership_lookup_error: None,
        }
    }

    #[test]
    fn clean_report_is_converged() {
        let report = report();
        assert!(report.is_converged());
        assert!(report.into_converged().is_ok());
    }

    #[test]
    fn removal_failure_turns_into_partial_convergence_error() {
        let mut report = report();
        report.removal_failures.push(RemovalFailure {
            list: CategoryList::new("11", "foes"),
            error: DirectoryError::RateLimited,
        });
        assert!(!report.is_converged());

        let err = report
            .into_converged()
            .expect_err("failed removal must not converge");
        assert!(matches!(err, ClassifyError::PartialConvergence(_)));
        assert!(err.to_string().contains("1 stale membership"));
        assert!(err.source().is_some());
    }

    #[test]
    fn membership_lookup_failure_is_not_converged() {
        let mut report = report();
        report.membership_lookup_error = Some(DirectoryError::Unauthorized);
        let err = report.into_converged().expect_err("lookup failure");
        assert!(err.to_string().contains("could not be fetched"));
    }
}
