//! Builds the tray menu from the indicator's current state.
//!
//! The tree is rebuilt from scratch on every change and diffed by
//! [`geo_indicator_tray::TrayHandle::set_menu`]; the database list itself
//! is kept in order incrementally by [`DbMenuModel`].

use geo_indicator_reconcile::{
    DbMenuModel, OpenTunnels, PreviousTunnels, RunningStatus, SortMode, Toggles,
};
use geo_indicator_tray::{AnalyzerMode, GatewayCommand, MenuAction, MenuBuilder, MenuNode, ToggleId};

/// State of the update item at the bottom of the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    Checking,
    Available,
    /// Up to date; shows the installed version when known.
    UpToDate(Option<String>),
}

/// Everything the menu shows.
pub struct MenuView<'a> {
    pub running: &'a RunningStatus,
    pub dbs: &'a DbMenuModel,
    pub toggles: &'a Toggles,
    pub release: Option<&'a str>,
    pub configured_db: Option<&'a str>,
    /// Best guess for the release when nothing is configured.
    pub suggested_db: Option<&'a str>,
    pub gateway_running: bool,
    pub previous_tunnels: &'a PreviousTunnels,
    pub open_tunnels: &'a OpenTunnels,
    pub update: &'a UpdateStatus,
}

pub fn build(view: &MenuView<'_>) -> Vec<MenuNode> {
    let mut menu = MenuBuilder::new().label("geo-cli").separator();

    menu = if view.running.has_actions() {
        menu.submenu(view.running.label(), |m| {
            m.action("Stop", MenuAction::StopDb)
                .action("SSH", MenuAction::DbSsh)
                .action("PSQL", MenuAction::DbPsql)
                .action("Make Copy", MenuAction::CopyDb(None))
        })
    } else {
        menu.label(view.running.label())
    };

    menu = menu
        .submenu("Databases", |m| databases(m, view))
        .action("Create Database", MenuAction::CreateDb)
        .submenu("Auto-Switch", |m| auto_switch(m, view))
        .separator()
        .submenu("MyGeotab", |m| {
            m.action("Start", MenuAction::MygStart)
                .action("Build", MenuAction::MygBuild)
        })
        .submenu("Gateway", |m| gateway(m, view.gateway_running))
        .submenu("Run Analyzers", |m| {
            m.action("All", MenuAction::RunAnalyzers(AnalyzerMode::All))
                .action("Choose", MenuAction::RunAnalyzers(AnalyzerMode::Choose))
                .action("Previous", MenuAction::RunAnalyzers(AnalyzerMode::Previous))
        })
        .action("npm install", MenuAction::NpmInstall)
        .action("Convert Long/Guid Ids", MenuAction::ConvertIds)
        .action("Convert Id From Clipboard", MenuAction::ConvertIdsFromClipboard)
        .submenu("Access Request", |m| access_request(m, view))
        .action("Run Tests", MenuAction::RunTests)
        .separator()
        .submenu("Help", |m| {
            let notifications = view.toggles.is_enabled(ToggleId::ShowNotifications);
            m.toggle("Show Notifications", ToggleId::ShowNotifications, notifications)
                .action("View Readme", MenuAction::ViewReadme)
                .action("Disable", MenuAction::Disable)
        })
        .action("Quit", MenuAction::Quit);

    menu = match view.update {
        UpdateStatus::Checking => menu.separator().label("Checking for updates..."),
        UpdateStatus::Available => menu.separator().action("●   Update Now", MenuAction::Update),
        UpdateStatus::UpToDate(Some(version)) => menu.separator().label(format!("v{version}")),
        UpdateStatus::UpToDate(None) => menu,
    };
    menu.build()
}

fn databases(mut m: MenuBuilder, view: &MenuView<'_>) -> MenuBuilder {
    for entry in view.dbs.entries() {
        let name = entry.name.clone();
        m = m.submenu_enabled(&entry.label, !entry.removing, |m| {
            m.action_enabled("Start", MenuAction::StartDb(name.clone()), entry.startable)
                .action("Remove", MenuAction::RemoveDb(name.clone()))
                .action("Make Copy", MenuAction::CopyDb(Some(name)))
        });
    }
    let policy = view.dbs.policy();
    m.when(!view.dbs.is_empty(), MenuBuilder::separator)
        .submenu("Sort", |m| {
            m.toggle("Release-aware", ToggleId::SortReleaseAware, policy.mode == SortMode::Release)
                .toggle("Descending", ToggleId::SortDescending, policy.descending)
        })
}

fn auto_switch(mut m: MenuBuilder, view: &MenuView<'_>) -> MenuBuilder {
    for id in [ToggleId::AutoSwitchDb, ToggleId::AutoNpmInstall, ToggleId::AutoServerConfig] {
        if let Some(toggle) = view.toggles.get(id) {
            m = m.toggle(toggle.label(), id, toggle.is_enabled());
        }
    }

    let configured = match (view.configured_db, view.suggested_db) {
        (Some(db), _) => db.to_string(),
        (None, Some(suggested)) => format!("None (suggested: {suggested})"),
        (None, None) => "None".to_string(),
    };
    m = m
        .separator()
        .label(format!("MYG Release: {}", view.release.unwrap_or("Unknown")))
        .label(format!("Configured DB: {configured}"));

    let running = match view.running {
        RunningStatus::Running(name) => Some(name.as_str()),
        _ => None,
    };
    match running {
        Some(db) if view.configured_db == Some(db) => m.label("Configured DB Running"),
        Some(_) if view.release.is_some() => {
            m.action("Set DB for MYG Release", MenuAction::SetDbForRelease)
        }
        _ => m.action_enabled("Set DB for MYG Release", MenuAction::SetDbForRelease, false),
    }
}

fn gateway(m: MenuBuilder, running: bool) -> MenuBuilder {
    if running {
        m.action("Stop", MenuAction::Gateway(GatewayCommand::Stop))
            .action("Restart", MenuAction::Gateway(GatewayCommand::Restart))
    } else {
        m.action("Start", MenuAction::Gateway(GatewayCommand::Start))
            .action("Build", MenuAction::Gateway(GatewayCommand::Build))
            .action("Build Solution", MenuAction::Gateway(GatewayCommand::BuildSolution))
            .action("Clean", MenuAction::Gateway(GatewayCommand::Clean))
    }
}

fn access_request(m: MenuBuilder, view: &MenuView<'_>) -> MenuBuilder {
    m.action("Create Access Request", MenuAction::CreateAccessRequest)
        .submenu("IAP Tunnel", |m| {
            m.action("Start New", MenuAction::StartNewTunnel).submenu_enabled(
                "Start Previous",
                !view.previous_tunnels.items().is_empty(),
                |mut m| {
                    for tunnel in view.previous_tunnels.items() {
                        let action = MenuAction::StartPreviousTunnel(tunnel.command.clone());
                        m = m.action(&tunnel.tag, action);
                    }
                    m
                },
            )
        })
        .submenu("SSH Over Open IAP Tunnel", |mut m| {
            let open = view.open_tunnels.items();
            if open.is_empty() {
                return m.label(OpenTunnels::PLACEHOLDER);
            }
            for tunnel in open {
                m = m.action(
                    format!("{} ({})", tunnel.name, tunnel.port),
                    MenuAction::SshOverTunnel(tunnel.port.clone()),
                );
            }
            m
        })
}
