//! Pull and push notification delivery.
//!
//! # Responsibility
//! - Pull: fetch one bounded batch, dispatch it in order, then dismiss it.
//! - Push: dispatch notification events from a live stream until it closes.
//!
//! # Invariants
//! - Pull dispatches before dismissing, so a crash mid-batch redelivers the
//!   batch on the next pull.
//! - In watermark mode only notifications up to the last dispatched id are
//!   dismissed; later arrivals survive.
//! - Push never reconnects; a closed channel ends the loop.

use crate::directory::client::{DirectoryClient, DirectoryError};
use crate::model::account::{Page, DEFAULT_PAGE_LIMIT};
use crate::model::notification::{NotificationId, StreamEvent};
use crate::notify::handler::NotificationHandler;
use crossbeam_channel::Receiver;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How the pull loop marks a processed batch as handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearMode {
    /// Dismiss through the id of the last dispatched notification.
    #[default]
    Watermark,
    /// Clear the whole remote backlog, including unseen arrivals.
    All,
}

/// Summary of one pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub dispatched: usize,
    /// Id of the last dispatched notification; `None` for an empty batch.
    pub watermark: Option<NotificationId>,
}

/// Summary of a finished push session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchReport {
    pub dispatched: usize,
    /// Non-notification events that were logged and dropped.
    pub ignored: usize,
}

/// Errors from the trigger loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    /// Pending notifications could not be fetched. Treated as fatal.
    Fetch(DirectoryError),
    /// Batch was dispatched but could not be dismissed.
    Clear(DirectoryError),
    /// Event stream could not be opened.
    Stream(DirectoryError),
}

impl TriggerError {
    /// Whether the process should stop instead of polling again.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Stream(_))
    }
}

impl Display for TriggerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "failed to fetch notifications: {err}"),
            Self::Clear(err) => write!(f, "failed to dismiss notifications: {err}"),
            Self::Stream(err) => write!(f, "failed to open event stream: {err}"),
        }
    }
}

impl Error for TriggerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(err) | Self::Clear(err) | Self::Stream(err) => Some(err),
        }
    }
}

/// Delivers remote notifications to a handler.
pub struct NotificationPump<'c, C: DirectoryClient> {
    client: &'c C,
    batch_size: u32,
    clear_mode: ClearMode,
}

impl<'c, C: DirectoryClient> NotificationPump<'c, C> {
    /// Creates a pump with a batch of `DEFAULT_PAGE_LIMIT` and watermark clearing.
    pub fn new(client: &'c C) -> Self {
        Self {
            client,
            batch_size: DEFAULT_PAGE_LIMIT,
            clear_mode: ClearMode::default(),
        }
    }

    pub fn with_clear_mode(mut self, clear_mode: ClearMode) -> Self {
        self.clear_mode = clear_mode;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn clear_mode(&self) -> ClearMode {
        self.clear_mode
    }

    /// Fetches one batch, dispatches it in received order, then dismisses it.
    ///
    /// # Contract
    /// - Exactly one dismiss call follows a non-empty batch, whatever its size.
    /// - `ClearMode::All` clears even after an empty batch.
    ///
    /// # Errors
    /// - `Fetch` when the batch cannot be fetched; nothing is dispatched.
    /// - `Clear` when dismissing fails; every handler call has already run.
    pub fn poll_once<H>(&self, handler: &mut H) -> Result<PollReport, TriggerError>
    where
        H: NotificationHandler + ?Sized,
    {
        let batch = self
            .client
            .fetch_notifications(&Page::with_limit(self.batch_size))
            .map_err(|err| {
                error!("event=notify_poll module=notify status=error stage=fetch error={err}");
                TriggerError::Fetch(err)
            })?;

        let watermark = batch.last().map(|notification| notification.id.clone());
        let dispatched = batch.len();
        for notification in batch {
            handler.handle(notification);
        }

        let cleared = match (self.clear_mode, watermark.as_deref()) {
            (ClearMode::All, _) => self.client.clear_notifications(),
            (ClearMode::Watermark, Some(id)) => self.client.dismiss_notifications_through(id),
            (ClearMode::Watermark, None) => Ok(()),
        };
        cleared.map_err(|err| {
            error!("event=notify_poll module=notify status=error stage=clear error={err}");
            TriggerError::Clear(err)
        })?;

        debug!(
            "event=notify_poll module=notify status=ok dispatched={} watermark={}",
            dispatched,
            watermark.as_deref().unwrap_or("-")
        );
        Ok(PollReport {
            dispatched,
            watermark,
        })
    }

    /// Opens the live stream and dispatches notifications until it closes.
    ///
    /// # Errors
    /// - `Stream` when the stream cannot be opened.
    pub fn watch<H>(&self, handler: &mut H) -> Result<WatchReport, TriggerError>
    where
        H: NotificationHandler + ?Sized,
    {
        let events = self.client.open_event_stream().map_err(|err| {
            error!("event=notify_stream_open module=notify status=error error={err}");
            TriggerError::Stream(err)
        })?;
        info!("event=notify_stream_open module=notify status=ok");
        Ok(watch_events(&events, handler))
    }
}

/// Dispatches notification events from `events` until the channel disconnects.
///
/// Non-notification events are logged and dropped.
pub fn watch_events<H>(events: &Receiver<StreamEvent>, handler: &mut H) -> WatchReport
where
    H: NotificationHandler + ?Sized,
{
    let mut report = WatchReport::default();
    for event in events.iter() {
        match event {
            StreamEvent::Notification(notification) => {
                report.dispatched += 1;
                handler.handle(notification);
            }
            other => {
                report.ignored += 1;
                debug!(
                    "event=notify_event_ignored module=notify status=ok kind={}",
                    other.kind_name()
                );
            }
        }
    }

    info!(
        "event=notify_stream_closed module=notify status=ok dispatched={} ignored={}",
        report.dispatched, report.ignored
    );
    report
}
