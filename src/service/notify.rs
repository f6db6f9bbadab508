//! Outbound notification seam.
//!
//! Services produce structured [`NotificationEvent`]s and hand them to a sink. Turning an
//! event into a chat message is the sink's concern.

use std::future::Future;

use tokio::sync::mpsc;

use crate::{error::notify::NotifyError, model::event::NotificationEvent};

/// Delivers notification events.
///
/// A successful return means the event was accepted. Waiver expirations are only marked
/// processed after delivery succeeds, so a sink must not return `Ok` for an event it
/// dropped.
pub trait NotificationSink: Send + Sync {
    fn deliver(
        &self,
        event: NotificationEvent,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Sink that forwards events over an unbounded channel to whatever owns the receiver.
///
/// The binary drains the receiver into the log; tests drain it to inspect what was sent.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<NotificationEvent>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NotificationEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelNotifier {
    async fn deliver(&self, event: NotificationEvent) -> Result<(), NotifyError> {
        tracing::debug!("Delivering {} notification", event.kind());

        self.sender
            .send(event)
            .map_err(|_| NotifyError::ChannelClosed)
    }
}
