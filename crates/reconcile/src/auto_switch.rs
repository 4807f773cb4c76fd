//! Tasks run when the checked-out MyGeotab release changes.
//!
//! Each task is independent and reports `Done` or `Fail`. The runner starts
//! every enabled task on a [`JoinSet`], never more than [`MAX_WORKERS`] at
//! once, and waits for all of them before returning a report in
//! registration order.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use geo_indicator_tray::ToggleId;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::release::ReleaseChange;

pub const MAX_WORKERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Done,
    Fail,
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Done => f.write_str("Done"),
            TaskOutcome::Fail => f.write_str("Fail"),
        }
    }
}

/// Everything a task needs to know about the switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSwitchContext {
    pub change: ReleaseChange,
    /// Database configured for the new release, if any.
    pub configured_db: Option<String>,
}

pub type TaskFuture = Pin<Box<dyn Future<Output = TaskOutcome> + Send>>;

pub trait AutoSwitchTask: Send + Sync {
    /// Name shown in the summary notification.
    fn name(&self) -> &str;

    /// Toggle that enables the task.
    fn toggle(&self) -> ToggleId;

    fn run(&self, ctx: &AutoSwitchContext) -> TaskFuture;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub name: String,
    pub outcome: TaskOutcome,
}

/// Summary notification body: `"<name>[<Done|Fail>], \n"` per task.
pub fn summary(reports: &[TaskReport]) -> String {
    reports
        .iter()
        .map(|r| format!("{}[{}], \n", r.name, r.outcome))
        .collect()
}

pub struct AutoSwitchRunner {
    tasks: Vec<Arc<dyn AutoSwitchTask>>,
    workers: usize,
}

impl Default for AutoSwitchRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoSwitchRunner {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            workers: MAX_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn register(&mut self, task: impl AutoSwitchTask + 'static) {
        self.tasks.push(Arc::new(task));
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Runs the tasks whose toggle `is_enabled` reports on. A task that
    /// panics is reported as `Fail`.
    pub async fn run<F>(&self, ctx: &AutoSwitchContext, is_enabled: F) -> Vec<TaskReport>
    where
        F: Fn(ToggleId) -> bool,
    {
        let selected: Vec<&Arc<dyn AutoSwitchTask>> =
            self.tasks.iter().filter(|t| is_enabled(t.toggle())).collect();
        if selected.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();
        for (idx, task) in selected.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let fut = task.run(ctx);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (idx, fut.await)
            });
        }

        let mut reports: Vec<TaskReport> = selected
            .iter()
            .map(|t| TaskReport {
                name: t.name().to_string(),
                outcome: TaskOutcome::Fail,
            })
            .collect();

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, outcome)) => reports[idx].outcome = outcome,
                Err(e) => tracing::error!(error = %e, "auto-switch task aborted"),
            }
        }

        for report in &reports {
            tracing::info!(
                task = %report.name,
                outcome = %report.outcome,
                "auto-switch task finished"
            );
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    fn ctx() -> AutoSwitchContext {
        AutoSwitchContext {
            change: ReleaseChange {
                current: "10.1".into(),
                previous: "9.7".into(),
            },
            configured_db: Some("10_1".into()),
        }
    }

    struct Fixed {
        name: String,
        toggle: ToggleId,
        outcome: TaskOutcome,
    }

    impl AutoSwitchTask for Fixed {
        fn name(&self) -> &str {
            &self.name
        }

        fn toggle(&self) -> ToggleId {
            self.toggle
        }

        fn run(&self, _ctx: &AutoSwitchContext) -> TaskFuture {
            let outcome = self.outcome;
            Box::pin(async move { outcome })
        }
    }

    struct Counting {
        name: String,
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl AutoSwitchTask for Counting {
        fn name(&self) -> &str {
            &self.name
        }

        fn toggle(&self) -> ToggleId {
            ToggleId::AutoSwitchDb
        }

        fn run(&self, _ctx: &AutoSwitchContext) -> TaskFuture {
            let active = Arc::clone(&self.active);
            let peak = Arc::clone(&self.peak);
            Box::pin(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                TaskOutcome::Done
            })
        }
    }

    struct Panicking;

    async fn explode() -> TaskOutcome {
        panic!("task blew up")
    }

    impl AutoSwitchTask for Panicking {
        fn name(&self) -> &str {
            "boom"
        }

        fn toggle(&self) -> ToggleId {
            ToggleId::AutoSwitchDb
        }

        fn run(&self, _ctx: &AutoSwitchContext) -> TaskFuture {
            Box::pin(explode())
        }
    }

    #[tokio::test]
    async fn reports_in_registration_order() {
        let mut runner = AutoSwitchRunner::new();
        runner.register(Fixed {
            name: "DB".into(),
            toggle: ToggleId::AutoSwitchDb,
            outcome: TaskOutcome::Done,
        });
        runner.register(Fixed {
            name: "npm install".into(),
            toggle: ToggleId::AutoNpmInstall,
            outcome: TaskOutcome::Fail,
        });

        let reports = runner.run(&ctx(), |_| true).await;
        assert_eq!(summary(&reports), "DB[Done], \nnpm install[Fail], \n");
    }

    #[tokio::test]
    async fn disabled_tasks_are_skipped() {
        let mut runner = AutoSwitchRunner::new();
        runner.register(Fixed {
            name: "DB".into(),
            toggle: ToggleId::AutoSwitchDb,
            outcome: TaskOutcome::Done,
        });
        runner.register(Fixed {
            name: "server.config".into(),
            toggle: ToggleId::AutoServerConfig,
            outcome: TaskOutcome::Done,
        });

        let reports = runner.run(&ctx(), |id| id == ToggleId::AutoServerConfig).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name, "server.config");

        assert!(runner.run(&ctx(), |_| false).await.is_empty());
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut runner = AutoSwitchRunner::new();
        for i in 0..8 {
            runner.register(Counting {
                name: format!("task{i}"),
                active: Arc::clone(&active),
                peak: Arc::clone(&peak),
            });
        }

        let reports = runner.run(&ctx(), |_| true).await;
        assert_eq!(reports.len(), 8);
        assert!(reports.iter().all(|r| r.outcome == TaskOutcome::Done));
        assert!(peak.load(Ordering::SeqCst) <= MAX_WORKERS);
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn panicking_task_is_a_failure() {
        let mut runner = AutoSwitchRunner::new().with_workers(2);
        runner.register(Panicking);
        runner.register(Fixed {
            name: "DB".into(),
            toggle: ToggleId::AutoSwitchDb,
            outcome: TaskOutcome::Done,
        });

        let reports = runner.run(&ctx(), |_| true).await;
        assert_eq!(summary(&reports), "boom[Fail], \nDB[Done], \n");
    }
}
