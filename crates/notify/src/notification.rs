/// Default title for indicator notifications.
pub const DEFAULT_TITLE: &str = "geo-cli";

/// Auto-close timeout for short status notifications.
pub const QUICK_TIMEOUT_MS: u64 = 1500;

/// Urgency hint passed to the notification server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Urgency {
    #[default]
    Low,
    Normal,
    Critical,
}

/// A single desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub urgency: Urgency,
    /// Time after which the notification closes itself.
    pub timeout_ms: u64,
}

impl Notification {
    /// Creates a notification with explicit title, body and timeout.
    pub fn new(title: impl Into<String>, body: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            urgency: Urgency::Low,
            timeout_ms,
        }
    }

    /// A short low-urgency status message titled `geo-cli`.
    pub fn quick(body: impl Into<String>) -> Self {
        Self::new(DEFAULT_TITLE, body, QUICK_TIMEOUT_MS)
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_notification_defaults() {
        let n = Notification::quick("DB Started: 9_7");
        assert_eq!(n.title, "geo-cli");
        assert_eq!(n.body, "DB Started: 9_7");
        assert_eq!(n.urgency, Urgency::Low);
        assert_eq!(n.timeout_ms, 1500);
    }

    #[test]
    fn explicit_title_and_urgency() {
        let n = Notification::new("Auto-Switch Tasks Complete", "DB[Done], \n", 4000)
            .with_urgency(Urgency::Critical);
        assert_eq!(n.title, "Auto-Switch Tasks Complete");
        assert_eq!(n.timeout_ms, 4000);
        assert_eq!(n.urgency, Urgency::Critical);
    }
}
