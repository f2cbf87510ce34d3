//! Notification and stream event model.
//!
//! # Responsibility
//! - Describe inbound events directed at the authenticated identity.
//! - Map notification kinds to and from their wire names.
//!
//! # Invariants
//! - A `Notification` is consumed exactly once by a handler and never stored.
//! - Unknown notification kinds are preserved verbatim in `Other`.

use crate::model::account::Account;
use crate::text::strip_markup;
use serde::{Deserialize, Serialize};

/// Remote notification identifier.
pub type NotificationId = String;

/// Category of action a remote account performed towards the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    Mention,
    Status,
    Reblog,
    Follow,
    FollowRequest,
    Favourite,
    Poll,
    Update,
    /// Kind this crate does not model; keeps the wire name.
    Other(String),
}

impl NotificationKind {
    /// Wire name as sent by the server.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mention => "mention",
            Self::Status => "status",
            Self::Reblog => "reblog",
            Self::Follow => "follow",
            Self::FollowRequest => "follow_request",
            Self::Favourite => "favourite",
            Self::Poll => "poll",
            Self::Update => "update",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Parses a wire name exactly as received; never fails.
    pub fn parse(value: &str) -> Self {
        match value {
            "mention" => Self::Mention,
            "status" => Self::Status,
            "reblog" => Self::Reblog,
            "follow" => Self::Follow,
            "follow_request" => Self::FollowRequest,
            "favourite" => Self::Favourite,
            "poll" => Self::Poll,
            "update" => Self::Update,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NotificationKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<NotificationKind> for String {
    fn from(value: NotificationKind) -> Self {
        value.as_str().to_string()
    }
}

/// Remote post attached to mention/status/reblog notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    /// HTML markup as rendered by the server.
    pub content: String,
}

impl Status {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Returns the content with markup flattened to plain text.
    pub fn plain_text(&self) -> String {
        strip_markup(&self.content)
    }
}

/// Inbound event describing an action by `account` directed at the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Serialized as `type` to match the server schema.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub account: Account,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl Notification {
    pub fn new(id: impl Into<NotificationId>, kind: NotificationKind, account: Account) -> Self {
        Self {
            id: id.into(),
            kind,
            account,
            status: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Plain-text body of the attached status, if any.
    pub fn plain_text(&self) -> Option<String> {
        self.status.as_ref().map(Status::plain_text)
    }
}

/// Event delivered by the live push stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum StreamEvent {
    Notification(Notification),
    Update(Status),
    Delete(String),
    Other { kind: String },
}

impl StreamEvent {
    /// Short event name for log lines.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Notification(_) => "notification",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Other { kind } => kind.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Notification, NotificationKind, Status, StreamEvent};
    use crate::model::account::Account;

    #[test]
    fn kind_parse_and_render_are_symmetric_for_known_kinds() {
        for name in [
            "mention",
            "status",
            "reblog",
            "follow",
            "follow_request",
            "favourite",
            "poll",
            "update",
        ] {
            assert_eq!(NotificationKind::parse(name).as_str(), name);
        }
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let kind = NotificationKind::parse("admin.sign_up");
        assert_eq!(kind, NotificationKind::Other("admin.sign_up".to_string()));
        assert_eq!(kind.as_str(), "admin.sign_up");
    }

    #[test]
    fn padded_kind_is_kept_verbatim() {
        let kind = NotificationKind::parse(" mention");
        assert_eq!(kind, NotificationKind::Other(" mention".to_string()));
        assert_eq!(String::from(kind), " mention");
    }

    #[test]
    fn plain_text_flattens_status_markup() {
        let notification = Notification::new(
            "7",
            NotificationKind::Mention,
            Account::new("2", "alice@example.social"),
        )
        .with_status(Status::new("70", "<p><span>@bot</span> mark me</p>"));

        assert_eq!(
            notification.plain_text().as_deref(),
            Some("@bot mark me\n\n")
        );
    }

    #[test]
    fn stream_event_kind_names() {
        assert_eq!(StreamEvent::Delete("1".to_string()).kind_name(), "delete");
        assert_eq!(
            StreamEvent::Other {
                kind: "filters_changed".to_string()
            }
            .kind_name(),
            "filters_changed"
        );
    }
}
