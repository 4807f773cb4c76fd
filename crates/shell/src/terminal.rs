//! Interactive commands in a new terminal window.

use std::process::{ExitStatus, Stdio};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Launches `gnome-terminal` windows for interactive geo-cli actions.
#[derive(Debug, Clone)]
pub struct Terminal {
    program: String,
    geometry: String,
}

impl Default for Terminal {
    fn default() -> Self {
        Self {
            program: "gnome-terminal".into(),
            geometry: "80x30".into(),
        }
    }
}

impl Terminal {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Builds the argument list for running `command` in a new window.
    ///
    /// With `stay_open` the window drops into an interactive shell after the
    /// command finishes; otherwise it closes.
    pub fn args(&self, command: &str, title: Option<&str>, stay_open: bool) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            args.push(format!("--title={title}"));
        }
        args.push(format!("--geometry={}", self.geometry));
        args.push("--".into());
        args.push("bash".into());
        args.push("-c".into());

        let tail = if stay_open {
            "cd $HOME; exec bash"
        } else {
            "cd $HOME"
        };
        args.push(format!("{command}; {tail}"));
        args
    }

    /// Opens a terminal running `command`. Failures are logged.
    ///
    /// The window outlives the returned handle. The handle resolves with the
    /// launcher's exit status once the process has been reaped.
    pub fn open(&self, command: &str, title: Option<&str>, stay_open: bool) -> Option<Launched> {
        let args = self.args(command, title, stay_open);
        tracing::debug!(program = %self.program, ?args, "opening terminal");

        match spawn_reaped(&self.program, &args) {
            Ok(launched) => launched,
            Err(e) => {
                tracing::warn!(program = %self.program, "failed to open terminal: {e}");
                None
            }
        }
    }

    /// Opens `path` or a URL with the desktop's default handler.
    pub fn open_uri(uri: &str) -> Option<Launched> {
        match spawn_reaped("xdg-open", &[uri.to_string()]) {
            Ok(launched) => launched,
            Err(e) => {
                tracing::warn!(uri, "xdg-open failed: {e}");
                None
            }
        }
    }
}

/// Background wait on a launched process.
pub type Launched = JoinHandle<Option<ExitStatus>>;

/// Spawns `program` detached from our stdio and waits on it in the background
/// so it never lingers as a zombie.
///
/// Outside a tokio runtime the wait happens on a plain thread and no handle
/// is returned.
fn spawn_reaped(program: &str, args: &[String]) -> std::io::Result<Option<Launched>> {
    let Ok(runtime) = Handle::try_current() else {
        let mut child = std::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        std::thread::spawn(move || child.wait());
        return Ok(None);
    };

    let mut child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false)
        .spawn()?;
    let program = program.to_string();
    Ok(Some(runtime.spawn(async move {
        match child.wait().await {
            Ok(status) => {
                tracing::trace!(%program, %status, "launched process exited");
                Some(status)
            }
            Err(e) => {
                tracing::debug!(%program, "failed to wait on launched process: {e}");
                None
            }
        }
    })))
}

/// Window title used for geo-cli terminals.
pub fn window_title(title: &str) -> String {
    format!("{title} [ geo-cli ]")
}
