//! Application handler contract.

use crate::model::notification::Notification;

/// Receives notifications from a trigger loop.
///
/// Handlers own whatever they do with a notification (classifying the
/// sender, posting a reply); the loop neither awaits nor checks the result.
pub trait NotificationHandler {
    fn handle(&mut self, notification: Notification);
}

impl<F> NotificationHandler for F
where
    F: FnMut(Notification),
{
    fn handle(&mut self, notification: Notification) {
        self(notification)
    }
}
