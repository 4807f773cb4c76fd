//! Menu actions that hand off to an interactive `geo` session.
//!
//! Most of the menu simply opens a terminal running a geo subcommand. This
//! module maps those actions to the command line and window settings; the
//! actions that need the indicator's state (start/stop/remove, toggles,
//! quitting) are handled by [`crate::app`].

use geo_indicator_shell::terminal::window_title;
use geo_indicator_tray::{AnalyzerMode, GatewayCommand, MenuAction};

/// A geo subcommand to run in a new terminal window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalJob {
    /// Arguments after `geo`.
    pub args: String,
    pub title: Option<String>,
    /// Keep an interactive shell open once the command exits.
    pub stay_open: bool,
}

impl TerminalJob {
    fn new(args: impl Into<String>) -> Self {
        Self {
            args: args.into(),
            title: None,
            stay_open: true,
        }
    }

    fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn closing(mut self) -> Self {
        self.stay_open = false;
        self
    }
}

/// Terminal job for `action`, or `None` when the action is handled in
/// process. `release` is the checked-out MyGeotab release, used in
/// Gateway window titles.
pub fn terminal_job(action: &MenuAction, release: Option<&str>) -> Option<TerminalJob> {
    let job = match action {
        MenuAction::DbSsh => TerminalJob::new("db ssh"),
        MenuAction::DbPsql => TerminalJob::new("db psql"),
        MenuAction::CopyDb(Some(name)) => TerminalJob::new(format!("db cp -i {name}")),
        MenuAction::CopyDb(None) => TerminalJob::new("db cp -i"),
        MenuAction::CreateDb => TerminalJob::new("db start -p"),
        MenuAction::MygStart => TerminalJob::new("myg start"),
        MenuAction::MygBuild => TerminalJob::new("myg build"),
        MenuAction::Gateway(cmd) => return gateway_job(*cmd, release),
        MenuAction::RunAnalyzers(mode) => TerminalJob::new(match mode {
            AnalyzerMode::All => "analyze -b -a",
            AnalyzerMode::Choose => "analyze -b",
            AnalyzerMode::Previous => "analyze -b -",
        }),
        MenuAction::NpmInstall => TerminalJob::new("init npm -c").closing(),
        MenuAction::ConvertIds => TerminalJob::new("id -i"),
        MenuAction::ConvertIdsFromClipboard => TerminalJob::new("id -c").closing(),
        MenuAction::RunTests => TerminalJob::new("test -i"),
        MenuAction::StartNewTunnel => TerminalJob::new("ar tunnel --prompt"),
        MenuAction::StartPreviousTunnel(cmd) => TerminalJob::new(format!("ar tunnel {cmd}")),
        MenuAction::SshOverTunnel(port) => TerminalJob::new(format!("ar ssh -p {port}")),
        MenuAction::Update => TerminalJob::new("update").titled("geo-cli Update"),
        MenuAction::StopDb
        | MenuAction::StartDb(_)
        | MenuAction::RemoveDb(_)
        | MenuAction::Toggle(_)
        | MenuAction::SetDbForRelease
        | MenuAction::CreateAccessRequest
        | MenuAction::ViewReadme
        | MenuAction::Disable
        | MenuAction::Quit => return None,
    };
    Some(job)
}

fn gateway_job(cmd: GatewayCommand, release: Option<&str>) -> Option<TerminalJob> {
    let job = match cmd {
        GatewayCommand::Start | GatewayCommand::Restart => {
            let verb = if cmd == GatewayCommand::Start { "start" } else { "restart" };
            let title = match release {
                Some(release) => format!("Gateway {release}"),
                None => "Gateway".to_string(),
            };
            TerminalJob::new(format!("gw {verb}")).titled(window_title(&title))
        }
        GatewayCommand::Build => TerminalJob::new("gw build"),
        GatewayCommand::BuildSolution => TerminalJob::new("gw build sln"),
        GatewayCommand::Clean => TerminalJob::new("gw clean --interactive").closing(),
        // Stopping runs in the background.
        GatewayCommand::Stop => return None,
    };
    Some(job)
}
