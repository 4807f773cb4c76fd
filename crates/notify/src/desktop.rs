//! freedesktop notifications via `notify-rust`.

use std::path::PathBuf;

use notify_rust::Timeout;

use crate::{Notification, Notifier, NotifyError, Urgency};

/// Shows notifications through the desktop notification service.
#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier {
    icon: Option<PathBuf>,
}

impl DesktopNotifier {
    pub fn new(icon: Option<PathBuf>) -> Self {
        Self { icon }
    }
}

fn urgency(urgency: Urgency) -> notify_rust::Urgency {
    match urgency {
        Urgency::Low => notify_rust::Urgency::Low,
        Urgency::Normal => notify_rust::Urgency::Normal,
        Urgency::Critical => notify_rust::Urgency::Critical,
    }
}

impl Notifier for DesktopNotifier {
    fn show(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        let mut n = notify_rust::Notification::new();
        n.summary(&notification.title)
            .body(&notification.body)
            .urgency(urgency(notification.urgency))
            .timeout(Timeout::Milliseconds(notification.timeout_ms as u32));
        if let Some(icon) = &self.icon {
            n.icon(&icon.to_string_lossy());
        }
        n.show()
            .map(|_| ())
            .map_err(|e| NotifyError::Backend(e.to_string()))
    }
}
