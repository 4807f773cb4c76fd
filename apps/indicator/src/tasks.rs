//! Built-in auto-switch tasks.

use geo_indicator_reconcile::{AutoSwitchContext, AutoSwitchTask, TaskFuture, TaskOutcome};
use geo_indicator_shell::{Docker, GeoCli, Terminal};
use geo_indicator_tray::ToggleId;

/// Starts the database configured for the new release.
pub struct DbSwitchTask {
    geo: GeoCli,
    docker: Docker,
    terminal: Terminal,
}

impl DbSwitchTask {
    pub fn new(geo: GeoCli, docker: Docker, terminal: Terminal) -> Self {
        Self { geo, docker, terminal }
    }
}

impl AutoSwitchTask for DbSwitchTask {
    fn name(&self) -> &str {
        "DB"
    }

    fn toggle(&self) -> ToggleId {
        ToggleId::AutoSwitchDb
    }

    fn run(&self, ctx: &AutoSwitchContext) -> TaskFuture {
        let geo = self.geo.clone();
        let docker = self.docker.clone();
        let terminal = self.terminal.clone();
        let db = ctx.configured_db.clone();
        Box::pin(async move {
            let Some(db) = db else {
                tracing::debug!("no database configured for release");
                return TaskOutcome::Done;
            };
            let (out, err) = geo.start_db(&db).await;
            if out.contains("Port error") || err.contains("Port error") {
                terminal.open(&geo.interactive_command_line(&format!("db start {db}")), None, true);
                return TaskOutcome::Fail;
            }
            if docker.running_db_name().await == db {
                TaskOutcome::Done
            } else {
                TaskOutcome::Fail
            }
        })
    }
}

/// Runs `geo init npm`, falling back to a terminal when npm reports errors.
pub struct NpmInstallTask {
    geo: GeoCli,
    terminal: Terminal,
}

impl NpmInstallTask {
    pub fn new(geo: GeoCli, terminal: Terminal) -> Self {
        Self { geo, terminal }
    }
}

impl AutoSwitchTask for NpmInstallTask {
    fn name(&self) -> &str {
        "npm install"
    }

    fn toggle(&self) -> ToggleId {
        ToggleId::AutoNpmInstall
    }

    fn run(&self, _ctx: &AutoSwitchContext) -> TaskFuture {
        let geo = self.geo.clone();
        let terminal = self.terminal.clone();
        Box::pin(async move {
            let (_, err) = geo.npm_install().await;
            if err.contains("ERR") {
                tracing::warn!("npm install reported errors, opening a terminal");
                terminal.open(&geo.interactive_command_line("init npm"), None, true);
                return TaskOutcome::Fail;
            }
            TaskOutcome::Done
        })
    }
}

/// Switches `server.config` between the two releases.
pub struct ServerConfigTask {
    geo: GeoCli,
}

impl ServerConfigTask {
    pub fn new(geo: GeoCli) -> Self {
        Self { geo }
    }
}

impl AutoSwitchTask for ServerConfigTask {
    fn name(&self) -> &str {
        "server.config"
    }

    fn toggle(&self) -> ToggleId {
        ToggleId::AutoServerConfig
    }

    fn run(&self, ctx: &AutoSwitchContext) -> TaskFuture {
        let geo = self.geo.clone();
        let change = ctx.change.clone();
        Box::pin(async move {
            let output = geo
                .auto_switch_server_config(&change.current, &change.previous)
                .await;
            if output.contains("Error") {
                tracing::warn!(%output, "failed to switch server.config");
                return TaskOutcome::Fail;
            }
            TaskOutcome::Done
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use geo_indicator_reconcile::ReleaseChange;
    use geo_indicator_shell::ShellRunner;

    use super::*;

    fn ctx(configured_db: Option<&str>) -> AutoSwitchContext {
        AutoSwitchContext {
            change: ReleaseChange {
                current: "10.1".into(),
                previous: "9.7".into(),
            },
            configured_db: configured_db.map(String::from),
        }
    }

    /// A `geo-cli.sh` whose body is `script`.
    fn fake_geo(dir: &Path, script: &str) -> GeoCli {
        std::fs::write(dir.join("geo-cli.sh"), format!("#!/bin/bash\n{script}\n")).unwrap();
        GeoCli::new(ShellRunner::default(), dir)
    }

    fn quiet_terminal() -> Terminal {
        Terminal::new("true")
    }

    #[tokio::test]
    async fn db_task_without_configured_db_is_done() {
        let tmp = tempfile::tempdir().unwrap();
        let geo = fake_geo(tmp.path(), "exit 1");
        let task = DbSwitchTask::new(geo, Docker::default(), quiet_terminal());
        assert_eq!(task.run(&ctx(None)).await, TaskOutcome::Done);
    }

    #[tokio::test]
    async fn db_task_port_error_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let geo = fake_geo(tmp.path(), "echo 'Port error: 5432 in use' >&2");
        let task = DbSwitchTask::new(geo, Docker::default(), quiet_terminal());
        assert_eq!(task.run(&ctx(Some("10_1"))).await, TaskOutcome::Fail);
    }

    #[tokio::test]
    async fn npm_errors_fail_the_task() {
        let tmp = tempfile::tempdir().unwrap();
        let geo = fake_geo(tmp.path(), "echo 'npm ERR! code ERESOLVE' >&2");
        let task = NpmInstallTask::new(geo, quiet_terminal());
        assert_eq!(task.run(&ctx(None)).await, TaskOutcome::Fail);
    }

    #[tokio::test]
    async fn npm_warnings_are_fine() {
        let tmp = tempfile::tempdir().unwrap();
        let geo = fake_geo(tmp.path(), "echo 'npm WARN deprecated' >&2");
        let task = NpmInstallTask::new(geo, quiet_terminal());
        assert_eq!(task.run(&ctx(None)).await, TaskOutcome::Done);
    }

    #[tokio::test]
    async fn server_config_checks_output() {
        let tmp = tempfile::tempdir().unwrap();
        let geo = fake_geo(tmp.path(), "[ \"$5\" = 10.1 ] && [ \"$6\" = 9.7 ] && echo switched");
        let task = ServerConfigTask::new(geo);
        assert_eq!(task.run(&ctx(None)).await, TaskOutcome::Done);

        let geo = fake_geo(tmp.path(), "echo 'Error: server.config missing'");
        let task = ServerConfigTask::new(geo);
        assert_eq!(task.run(&ctx(None)).await, TaskOutcome::Fail);
    }
}
