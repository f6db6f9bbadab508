use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    /// The receiving side of the notification channel has been dropped.
    #[error("Notification channel is closed")]
    ChannelClosed,

    /// The external sender rejected the event.
    #[error("Notification delivery failed: {0}")]
    Rejected(String),
}
