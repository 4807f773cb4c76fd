//! Notification delivery backends.

use crate::{Notification, NotifyError};

/// Something that can display a notification.
pub trait Notifier: Send {
    fn show(&mut self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn show(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).show(notification)
    }
}

/// Writes notifications to the log instead of the desktop.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            title = %notification.title,
            urgency = ?notification.urgency,
            timeout_ms = notification.timeout_ms,
            "{}",
            notification.body
        );
        Ok(())
    }
}
