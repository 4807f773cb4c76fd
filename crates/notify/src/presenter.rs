//! Rate-limited notification presenter.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::{Notification, Notifier};

/// Minimum time between two shown notifications.
pub const MIN_GAP: Duration = Duration::from_millis(1500);

/// Most deferred notifications held at once.
pub const MAX_PENDING: usize = 8;

/// What happened to a submitted notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    /// Shown immediately.
    Shown,
    /// Queued; will be shown no earlier than `until`.
    Deferred { until: Instant },
    /// Dropped because notifications are disabled.
    Suppressed,
    /// Dropped because the queue is full.
    Dropped,
}

/// Shows notifications with a minimum gap between them.
///
/// The presenter never sleeps. Callers pass the current time, and poll
/// [`next_due`](Self::next_due) / [`fire_due`](Self::fire_due) to flush
/// deferred notifications from their own event loop.
pub struct Presenter<N: Notifier> {
    notifier: N,
    min_gap: Duration,
    last_shown: Option<Instant>,
    pending: VecDeque<Notification>,
}

impl<N: Notifier> Presenter<N> {
    pub fn new(notifier: N) -> Self {
        Self::with_gap(notifier, MIN_GAP)
    }

    pub fn with_gap(notifier: N, min_gap: Duration) -> Self {
        Self {
            notifier,
            min_gap,
            last_shown: None,
            pending: VecDeque::new(),
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Number of deferred notifications.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Requests `notification` at time `now`.
    ///
    /// `enabled` must reflect the user's setting at the time of the call.
    pub fn submit(&mut self, notification: Notification, now: Instant, enabled: bool) -> Submitted {
        if !enabled {
            tracing::trace!(body = %notification.body, "notifications disabled, dropping");
            return Submitted::Suppressed;
        }

        match self.last_shown {
            Some(last) if !self.pending.is_empty() || now < last + self.min_gap => {
                // An identical queued notification absorbs the new one.
                if let Some(slot) = self.pending.iter().position(|queued| {
                    queued.title == notification.title && queued.body == notification.body
                }) {
                    tracing::trace!(body = %notification.body, "duplicate notification merged");
                    return Submitted::Deferred {
                        until: last + self.min_gap * (slot as u32 + 1),
                    };
                }
                if self.pending.len() >= MAX_PENDING {
                    tracing::debug!(body = %notification.body, "notification queue full, dropping");
                    return Submitted::Dropped;
                }

                let ahead = self.pending.len() as u32 + 1;
                let until = last + self.min_gap * ahead;
                self.pending.push_back(notification);
                tracing::debug!(pending = self.pending.len(), "notification deferred");
                Submitted::Deferred { until }
            }
            _ => {
                self.show(&notification, now);
                Submitted::Shown
            }
        }
    }

    /// When the next deferred notification may be shown.
    pub fn next_due(&self) -> Option<Instant> {
        if self.pending.is_empty() {
            return None;
        }
        self.last_shown.map(|last| last + self.min_gap)
    }

    /// Shows deferred notifications whose time has come.
    ///
    /// At most one is shown per call since each one restarts the gap. When
    /// notifications have been disabled in the meantime, the queue is
    /// dropped. Returns the number shown.
    pub fn fire_due(&mut self, now: Instant, enabled: bool) -> usize {
        if !enabled {
            if !self.pending.is_empty() {
                tracing::debug!(
                    dropped = self.pending.len(),
                    "notifications disabled, clearing queue"
                );
                self.pending.clear();
            }
            return 0;
        }

        let mut shown = 0;
        while let Some(due) = self.next_due() {
            if now < due {
                break;
            }
            let Some(notification) = self.pending.pop_front() else {
                break;
            };
            self.show(&notification, now);
            shown += 1;
        }
        shown
    }

    fn show(&mut self, notification: &Notification, now: Instant) {
        self.last_shown = Some(now);
        if let Err(e) = self.notifier.show(notification) {
            tracing::warn!(title = %notification.title, "failed to show notification: {e}");
        }
    }
}
