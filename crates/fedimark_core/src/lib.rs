//! Core logic for fedimark bots.
//! This crate owns the classification invariants; transport lives elsewhere.

pub mod config;
pub mod directory;
pub mod logging;
pub mod model;
pub mod notify;
pub mod service;
pub mod text;

pub use config::{Config, ConfigError, DEFAULT_USER_AGENT};
pub use directory::client::{DirectoryClient, DirectoryError, DirectoryResult};
pub use directory::locks::{AccountGuard, AccountLocks};
pub use directory::session::Session;
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, sanitize_log_value,
    LogTarget,
};
pub use model::account::{
    Account, AccountId, CategoryList, FollowerPage, Identity, ListId, Page, DEFAULT_PAGE_LIMIT,
};
pub use model::notification::{
    Notification, NotificationId, NotificationKind, Status, StreamEvent,
};
pub use notify::handler::NotificationHandler;
pub use notify::pump::{
    watch_events, ClearMode, NotificationPump, PollReport, TriggerError, WatchReport,
};
pub use service::classifier::{Classifier, ClassifyError, ClassifyReport, RemovalFailure};
pub use service::follower_gate::{
    FollowerGate, FollowerGateError, FollowerPages, DEFAULT_FOLLOWER_PAGE_BOUND,
};
pub use text::{parse_markup, strip_markup, to_plain_text, MarkupNode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
