//! The "Running DB" header item.

use geo_indicator_tray::DbState;

/// What the header currently says.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunningStatus {
    #[default]
    Checking,
    Starting(String),
    Stopping,
    Running(String),
    NoneRunning,
    Failed(String),
}

impl RunningStatus {
    pub fn label(&self) -> String {
        match self {
            RunningStatus::Checking => "Checking for DB...".into(),
            RunningStatus::Starting(_) => "Starting DB...".into(),
            RunningStatus::Stopping => "Stopping DB...".into(),
            RunningStatus::Running(name) => format!("Running DB [{name}]"),
            RunningStatus::NoneRunning => "No DB running".into(),
            RunningStatus::Failed(_) => "Failed to start DB".into(),
        }
    }

    /// The Stop/SSH/PSQL submenu only makes sense for a running database.
    pub fn has_actions(&self) -> bool {
        matches!(self, RunningStatus::Running(_))
    }
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningObservation {
    /// Icon state the header implies.
    pub db_state: DbState,
    /// Body of a "DB Started" notification, when one is due.
    pub notify: Option<String>,
    /// The running container changed since the previous poll.
    pub changed: bool,
}

#[derive(Debug, Default)]
pub struct RunningDbIndicator {
    status: RunningStatus,
    running: String,
    seen_first_tick: bool,
    /// Start initiated by the indicator itself; its notification is
    /// suppressed.
    expected: Option<String>,
}

impl RunningDbIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &RunningStatus {
        &self.status
    }

    pub fn label(&self) -> String {
        self.status.label()
    }

    /// Last observed running container.
    pub fn running(&self) -> Option<&str> {
        (!self.running.is_empty()).then_some(self.running.as_str())
    }

    /// Folds in the running container name reported by one poll (`""` for
    /// none).
    pub fn observe(&mut self, running: &str) -> RunningObservation {
        let first_tick = !self.seen_first_tick;
        self.seen_first_tick = true;
        let changed = running != self.running;

        if !changed && self.status == RunningStatus::Stopping {
            return RunningObservation {
                db_state: DbState::DbRunning,
                notify: None,
                changed,
            };
        }

        let mut notify = None;
        let db_state = if running.is_empty() {
            if matches!(self.status, RunningStatus::Failed(_)) {
                DbState::DbError
            } else {
                self.status = RunningStatus::NoneRunning;
                DbState::NoDbRunning
            }
        } else if !changed && matches!(self.status, RunningStatus::Failed(_)) {
            // A failed start stays visible until a different container runs.
            DbState::DbError
        } else {
            if changed {
                let self_started = self.expected.as_deref() == Some(running);
                if !first_tick && !self_started {
                    notify = Some(format!("DB Started: {running}"));
                }
                self.expected = None;
            }
            self.status = RunningStatus::Running(running.to_string());
            DbState::DbRunning
        };

        if changed {
            tracing::info!(from = %self.running, to = %running, "running database changed");
            self.running = running.to_string();
        }

        RunningObservation {
            db_state,
            notify,
            changed,
        }
    }

    /// Announces a start the indicator is about to perform.
    pub fn expect_start(&mut self, name: &str) {
        self.status = RunningStatus::Starting(name.to_string());
        self.expected = Some(name.to_string());
    }

    /// Settles a start the indicator performed, given the container now
    /// reported as running. Returns `false` if the start failed.
    pub fn finish_start(&mut self, name: &str, running_now: &str) -> bool {
        self.expected = None;
        if running_now == name {
            self.status = RunningStatus::Running(name.to_string());
            self.running = name.to_string();
            true
        } else {
            tracing::warn!(db = %name, running = %running_now, "database did not start");
            self.status = RunningStatus::Failed(name.to_string());
            false
        }
    }

    pub fn begin_stop(&mut self) {
        self.status = RunningStatus::Stopping;
    }

    pub fn finish_stop(&mut self) {
        self.status = RunningStatus::NoneRunning;
    }

    /// Backs out of a stop that did not happen, returning to the last
    /// observed container.
    pub fn abort_stop(&mut self) -> DbState {
        if self.running.is_empty() {
            self.status = RunningStatus::NoneRunning;
            DbState::NoDbRunning
        } else {
            self.status = RunningStatus::Running(self.running.clone());
            DbState::DbRunning
        }
    }
}
