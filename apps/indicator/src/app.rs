//! Application orchestrator: owns all indicator state and drives it from a
//! single event loop.

use std::time::Duration;

use geo_indicator_config::ConfigCache;
use geo_indicator_notify::{LogNotifier, Notification, Notifier, Presenter};
use geo_indicator_reconcile::{
    AutoSwitchContext, AutoSwitchRunner, ContainerSetSnapshot, DbMenuModel, OpenTunnels,
    PreviousTunnels, ReleaseChange, ReleaseTracker, RunningDbIndicator, Toggles,
    best_db_for_release, db_for_release_key, summary,
};
use geo_indicator_shell::{Confirm, Docker, GeoCli, ShellRunner, Terminal};
use geo_indicator_tray::{
    DbState, GatewayCommand, IconManager, MenuAction, ToggleId, TrayConfig, TrayEndpoint,
    TrayEvent, TrayHandle,
};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::actions;
use crate::config::Config;
use crate::menu::{self, MenuView, UpdateStatus};
use crate::settings::Settings;
use crate::tasks::{DbSwitchTask, NpmInstallTask, ServerConfigTask};

const AUTO_SWITCH_TITLE: &str = "Auto-Switch Tasks Complete";
const AUTO_SWITCH_TIMEOUT_MS: u64 = 4000;
const DISABLE_DETAIL: &str =
    "The indicator can be re-enabled by running 'geo indicator enable' in a terminal.";

/// Runs the indicator until the user quits or shutdown is requested.
pub async fn run(config: Config, use_tray: bool) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    // -- Tray --
    let tray_config = TrayConfig {
        icon_dir: config.icon_dir(),
        ..TrayConfig::default()
    };
    let (tray, endpoint) = TrayHandle::new(tray_config);
    let backend = spawn_tray(endpoint, use_tray);

    // -- Notifications --
    let notifier = notifier(&config, use_tray);

    let mut indicator = Indicator::new(&config, tray, notifier, cancel);
    let result = indicator.run().await;

    // -- Graceful shutdown --
    indicator.tray.shutdown();
    drop(indicator);
    if let Err(e) = backend.await {
        tracing::warn!("tray backend panicked: {e}");
    }
    result
}

fn spawn_tray(endpoint: TrayEndpoint, use_tray: bool) -> JoinHandle<()> {
    #[cfg(feature = "desktop")]
    if use_tray {
        return tokio::task::spawn_blocking(move || geo_indicator_tray::ksni_backend::run(endpoint));
    }
    #[cfg(not(feature = "desktop"))]
    if use_tray {
        tracing::warn!("built without the desktop feature, running headless");
    }
    tokio::spawn(geo_indicator_tray::run_headless(endpoint))
}

#[cfg_attr(not(feature = "desktop"), allow(unused_variables))]
fn notifier(config: &Config, use_tray: bool) -> Box<dyn Notifier> {
    #[cfg(feature = "desktop")]
    if use_tray {
        let icon = config.icon_dir().join("geo-cli-logo.svg");
        return Box::new(geo_indicator_notify::DesktopNotifier::new(Some(icon)));
    }
    Box::new(LogNotifier)
}

/// Whether the loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Indicator {
    config: Config,
    geo: GeoCli,
    /// Same CLI with the long timeout, for database starts and npm.
    long_geo: GeoCli,
    docker: Docker,
    terminal: Terminal,
    confirm: Confirm,
    settings: Settings,
    tray: TrayHandle,
    presenter: Presenter<Box<dyn Notifier>>,
    icons: IconManager,
    dbs: DbMenuModel,
    running: RunningDbIndicator,
    toggles: Toggles,
    release: ReleaseTracker,
    configured_db: Option<String>,
    suggested_db: Option<String>,
    gateway_running: bool,
    previous_tunnels: PreviousTunnels,
    open_tunnels: OpenTunnels,
    update: UpdateStatus,
    auto_switch: AutoSwitchRunner,
    cancel: CancellationToken,
}

impl Indicator {
    fn new(
        config: &Config,
        tray: TrayHandle,
        notifier: Box<dyn Notifier>,
        cancel: CancellationToken,
    ) -> Self {
        let runner = ShellRunner::new(config.command_timeout());
        let long_runner = ShellRunner::new(config.long_command_timeout());
        let geo = GeoCli::new(runner.clone(), &config.geo_cli_dir);
        let long_geo = GeoCli::new(long_runner.clone(), &config.geo_cli_dir);
        let docker = Docker::new(runner.clone());
        let terminal = Terminal::default();

        let mut auto_switch = AutoSwitchRunner::new();
        auto_switch.register(DbSwitchTask::new(long_geo.clone(), docker.clone(), terminal.clone()));
        auto_switch.register(NpmInstallTask::new(long_geo.clone(), terminal.clone()));
        auto_switch.register(ServerConfigTask::new(long_geo.clone()));

        let toggles = Toggles::new();
        Self {
            config: config.clone(),
            settings: Settings::new(ConfigCache::new(&config.config_file), geo.clone()),
            confirm: Confirm::new(long_runner),
            geo,
            long_geo,
            docker,
            terminal,
            tray,
            presenter: Presenter::with_gap(notifier, config.notification_gap()),
            icons: IconManager::new(),
            dbs: DbMenuModel::new(toggles.sort_policy()),
            running: RunningDbIndicator::new(),
            toggles,
            release: ReleaseTracker::new(),
            configured_db: None,
            suggested_db: None,
            gateway_running: false,
            previous_tunnels: PreviousTunnels::default(),
            open_tunnels: OpenTunnels::default(),
            update: UpdateStatus::Checking,
            auto_switch,
            cancel,
        }
    }

    async fn run(&mut self) -> anyhow::Result<()> {
        self.startup().await;

        let mut db_tick = every(Duration::from_millis(self.config.db_poll_ms));
        let mut release_tick = every(Duration::from_millis(self.config.release_poll_ms));
        let mut config_tick = every(Duration::from_millis(self.config.toggle_poll_ms));
        let mut services_tick = every(Duration::from_millis(self.config.gateway_poll_ms));
        let mut update_tick = tokio::time::interval_at(
            Instant::now() + Duration::from_secs(2),
            Duration::from_secs(self.config.update_check_secs.max(1)),
        );
        update_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        tracing::info!("indicator ready");

        loop {
            let due = self.presenter.next_due();
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                _ = &mut ctrl_c => {
                    tracing::info!("SIGINT received, shutting down");
                    break;
                }
                _ = db_tick.tick() => self.poll_databases().await,
                _ = release_tick.tick() => self.poll_release().await,
                _ = config_tick.tick() => self.poll_config(),
                _ = services_tick.tick() => self.poll_services().await,
                _ = update_tick.tick() => self.check_update().await,
                _ = sleep_until_due(due) => self.flush_notifications(),
                event = self.tray.recv_event() => match event {
                    Some(event) => {
                        if self.handle_event(event).await == Flow::Quit {
                            self.cancel.cancel();
                        }
                    }
                    None => anyhow::bail!("tray backend stopped"),
                },
            }
            self.render();
        }
        Ok(())
    }

    async fn startup(&mut self) {
        self.render();
        if let Some(change) = self.icons.update() {
            self.tray.set_icon(change);
        }
        self.notify(Notification::quick("Starting up..."));

        self.poll_config();
        self.poll_databases().await;

        if let Some(db) = self.settings.get("LAST_DB_VERSION")
            && self.running.running() != Some(db.as_str())
            && self.dbs.get(&db).is_some()
        {
            tracing::info!(db = %db, "starting last used database");
            self.start_db(&db).await;
        }
        self.render();
    }

    fn render(&mut self) {
        let nodes = menu::build(&MenuView {
            running: self.running.status(),
            dbs: &self.dbs,
            toggles: &self.toggles,
            release: self.release.current(),
            configured_db: self.configured_db.as_deref(),
            suggested_db: self.suggested_db.as_deref(),
            gateway_running: self.gateway_running,
            previous_tunnels: &self.previous_tunnels,
            open_tunnels: &self.open_tunnels,
            update: &self.update,
        });
        self.tray.set_menu(nodes);
    }

    fn set_db_state(&mut self, state: DbState) {
        if let Some(change) = self.icons.set_db_state(state) {
            self.tray.set_icon(change);
        }
    }

    fn notify(&mut self, notification: Notification) {
        let enabled = self.settings.notifications_enabled();
        self.presenter.submit(notification, std::time::Instant::now(), enabled);
    }

    fn flush_notifications(&mut self) {
        let enabled = self.settings.notifications_enabled();
        self.presenter.fire_due(std::time::Instant::now(), enabled);
    }

    // -- Polling --

    async fn poll_databases(&mut self) {
        let names = self.docker.db_names().await;
        let running = self.docker.running_db_name().await;
        self.apply_snapshot(&ContainerSetSnapshot::new(names, &running));
    }

    fn apply_snapshot(&mut self, snapshot: &ContainerSetSnapshot) {
        let outcome = self.dbs.reconcile(&snapshot.names);
        if !outcome.is_unchanged() {
            tracing::debug!(
                added = ?outcome.added,
                removed = ?outcome.removed,
                "database list changed"
            );
        }

        let observation = self.running.observe(snapshot.running_name());
        self.dbs.set_running(self.running.running());
        self.set_db_state(observation.db_state);
        if let Some(body) = observation.notify {
            self.notify(Notification::quick(body));
        }
    }

    async fn poll_release(&mut self) {
        let release = self.geo.myg_release().await;
        let change = self.release.observe(&release);
        self.refresh_configured_db();
        if let Some(change) = change {
            self.run_auto_switch(change).await;
        }
    }

    fn refresh_configured_db(&mut self) {
        let Some(release) = self.release.current().map(str::to_string) else {
            return;
        };
        self.configured_db = self.settings.get(&db_for_release_key(&release));
        self.suggested_db = match self.configured_db {
            Some(_) => None,
            None => best_db_for_release(self.dbs.names(), &release),
        };
    }

    async fn run_auto_switch(&mut self, change: ReleaseChange) {
        let ctx = AutoSwitchContext {
            change,
            configured_db: self.configured_db.clone(),
        };

        let starting = ctx
            .configured_db
            .clone()
            .filter(|_| self.toggles.is_enabled(ToggleId::AutoSwitchDb));
        if let Some(db) = &starting {
            self.running.expect_start(db);
            self.render();
        }

        let toggles = &self.toggles;
        let reports = self.auto_switch.run(&ctx, |id| toggles.is_enabled(id)).await;

        if let Some(db) = starting {
            self.settle_start(&db).await;
        }
        if !reports.is_empty() {
            self.notify(Notification::new(
                AUTO_SWITCH_TITLE,
                summary(&reports),
                AUTO_SWITCH_TIMEOUT_MS,
            ));
        }
    }

    fn poll_config(&mut self) {
        let settings = &mut self.settings;
        let changed = self.toggles.sync_from_config(|key| settings.get(key));
        if changed
            .iter()
            .any(|id| matches!(id, ToggleId::SortReleaseAware | ToggleId::SortDescending))
        {
            self.dbs.set_policy(self.toggles.sort_policy());
        }

        let cmds = self.settings.get("AR_IAP_CMDS");
        let single = self.settings.get("AR_IAP_CMD");
        self.previous_tunnels.update(cmds.as_deref(), single.as_deref());

        if let UpdateStatus::UpToDate(_) = self.update {
            self.update = UpdateStatus::UpToDate(self.settings.get("VERSION"));
        }
    }

    async fn poll_services(&mut self) {
        self.gateway_running = self.geo.gateway_running().await;
        let myg_running = self.geo.myg_running().await;
        let gateway_change = self.icons.set_gateway_running(self.gateway_running);
        let myg_change = self.icons.set_myg_running(myg_running);
        if let Some(change) = myg_change.or(gateway_change) {
            self.tray.set_icon(change);
        }

        let open = self.geo.open_iap_tunnels().await;
        self.open_tunnels.update(&open);
    }

    async fn check_update(&mut self) {
        let available = self.geo.is_update_available().await;
        self.update = if available {
            UpdateStatus::Available
        } else {
            UpdateStatus::UpToDate(self.settings.get("VERSION"))
        };
        if let Some(change) = self.icons.set_update_available(available) {
            self.tray.set_icon(change);
        }
    }

    // -- Menu actions --

    async fn handle_event(&mut self, event: TrayEvent) -> Flow {
        let action = match event {
            TrayEvent::Activated(action) => action,
            TrayEvent::SecondaryActivate => MenuAction::ConvertIdsFromClipboard,
        };
        tracing::debug!(?action, "menu action");

        if let Some(job) = actions::terminal_job(&action, self.release.current()) {
            self.terminal.open(
                &self.geo.interactive_command_line(&job.args),
                job.title.as_deref(),
                job.stay_open,
            );
            return Flow::Continue;
        }

        match action {
            MenuAction::StartDb(name) => self.start_db(&name).await,
            MenuAction::StopDb => self.stop_db().await,
            MenuAction::RemoveDb(name) => self.remove_db(&name).await,
            MenuAction::Toggle(id) => self.toggle(id).await,
            MenuAction::SetDbForRelease => self.set_db_for_release().await,
            MenuAction::Gateway(GatewayCommand::Stop) => self.spawn_background("gw stop"),
            MenuAction::CreateAccessRequest => self.spawn_background("ar create"),
            MenuAction::ViewReadme => {
                Terminal::open_uri(&self.config.readme_path().to_string_lossy());
            }
            MenuAction::Disable => {
                let confirmed = self
                    .confirm
                    .ask(
                        "geo-cli",
                        "Disable geo-cli app indicator?",
                        DISABLE_DETAIL,
                    )
                    .await;
                if confirmed {
                    self.geo.disable_indicator().await;
                    return Flow::Quit;
                }
            }
            MenuAction::Quit => return Flow::Quit,
            other => tracing::debug!(action = ?other, "no handler for action"),
        }
        Flow::Continue
    }

    async fn start_db(&mut self, name: &str) {
        self.running.expect_start(name);
        self.render();

        let (out, err) = self.long_geo.start_db(name).await;
        if out.contains("Port error") || err.contains("Port error") {
            tracing::warn!(db = name, "port in use, opening a terminal");
            self.terminal.open(
                &self.geo.interactive_command_line(&format!("db start {name}")),
                None,
                true,
            );
        }
        self.settle_start(name).await;
    }

    /// Resolves a pending start against what docker reports as running.
    async fn settle_start(&mut self, name: &str) {
        let running_now = self.docker.running_db_name().await;
        if self.running.finish_start(name, &running_now) {
            self.dbs.set_running(Some(name));
            self.set_db_state(DbState::DbRunning);
        } else {
            self.set_db_state(DbState::DbError);
        }
    }

    async fn stop_db(&mut self) {
        self.running.begin_stop();
        self.render();
        if !self.geo.stop_db().await {
            tracing::warn!("failed to stop database");
            let state = self.running.abort_stop();
            self.set_db_state(state);
            return;
        }
        self.running.finish_stop();
        self.dbs.set_running(None);
        self.set_db_state(DbState::NoDbRunning);
    }

    async fn remove_db(&mut self, name: &str) {
        let confirmed = self
            .confirm
            .ask(
                "geo-cli",
                &format!("Remove database container '{name}'?"),
                "This cannot be undone.",
            )
            .await;
        if !confirmed {
            return;
        }

        self.dbs.mark_removing(name);
        self.render();
        if self.long_geo.remove_db(name).await {
            self.dbs.remove_entry(name);
            self.notify(Notification::quick(format!("Removed DB: {name}")));
        } else {
            tracing::warn!(db = name, "failed to remove database");
            self.dbs.clear_removing(name);
        }
    }

    async fn toggle(&mut self, id: ToggleId) {
        let Some(write) = self.toggles.toggle_by_user(id) else {
            return;
        };
        if matches!(id, ToggleId::SortReleaseAware | ToggleId::SortDescending) {
            self.dbs.set_policy(self.toggles.sort_policy());
        }
        if let Err(e) = self.settings.set(write.key, write.value).await {
            tracing::warn!("failed to persist toggle: {e}");
        }
    }

    async fn set_db_for_release(&mut self) {
        let (Some(release), Some(db)) = (
            self.release.current().map(str::to_string),
            self.running.running().map(str::to_string),
        ) else {
            return;
        };
        match self.settings.set(&db_for_release_key(&release), &db).await {
            Ok(()) => {
                tracing::info!(release = %release, db = %db, "database configured for release");
                self.configured_db = Some(db);
                self.suggested_db = None;
            }
            Err(e) => tracing::warn!("failed to configure database for release: {e}"),
        }
    }

    fn spawn_background(&self, args: &'static str) {
        let geo = self.long_geo.clone();
        tokio::spawn(async move {
            let (_, err) = geo.run_output(args).await;
            if !err.is_empty() {
                tracing::warn!(command = args, "{err}");
            }
        });
    }
}

fn every(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(10)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn sleep_until_due(due: Option<std::time::Instant>) {
    match due {
        Some(due) => tokio::time::sleep_until(Instant::from_std(due)).await,
        None => std::future::pending().await,
    }
}
