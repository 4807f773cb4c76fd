//! Desktop notifications for the geo-cli indicator.
//!
//! [`Presenter`] enforces a minimum gap between notifications: a request that
//! arrives too soon after the previous one is deferred until the gap has
//! passed. Whether notifications are enabled is passed in on every call so a
//! user setting toggled at runtime takes effect immediately.
//!
//! Delivery goes through the [`Notifier`] trait. [`LogNotifier`] writes to
//! the log; with the `desktop` feature, `DesktopNotifier` talks to the
//! freedesktop notification service.

mod backend;
#[cfg(feature = "desktop")]
mod desktop;
mod notification;
mod presenter;

pub use backend::{LogNotifier, Notifier};
#[cfg(feature = "desktop")]
pub use desktop::DesktopNotifier;
pub use notification::{DEFAULT_TITLE, Notification, QUICK_TIMEOUT_MS, Urgency};
pub use presenter::{MAX_PENDING, MIN_GAP, Presenter, Submitted};

/// Errors from a notification backend.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification backend error: {0}")]
    Backend(String),
}
