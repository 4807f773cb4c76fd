//! Wrapper around the `geo` command-line tool.

use std::path::{Path, PathBuf};

use crate::runner::{ShellRunner, quote};

/// Name of the geo-cli entry script inside its source directory.
pub const GEO_SCRIPT: &str = "geo-cli.sh";

/// Invokes `geo` subcommands through [`ShellRunner`].
///
/// Every call passes `--raw-output` (no colours or decorations) and
/// `--no-update-check`. Stdout is the value; one trailing newline is trimmed.
#[derive(Debug, Clone)]
pub struct GeoCli {
    runner: ShellRunner,
    script: PathBuf,
}

impl GeoCli {
    /// Creates a wrapper for the geo-cli checkout at `geo_cli_dir`.
    pub fn new(runner: ShellRunner, geo_cli_dir: &Path) -> Self {
        Self {
            runner,
            script: geo_cli_dir.join(GEO_SCRIPT),
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn runner(&self) -> &ShellRunner {
        &self.runner
    }

    /// Full non-interactive command line for `args`.
    pub fn command_line(&self, args: &str) -> String {
        format!(
            "bash {} --raw-output --no-update-check {args}",
            quote(&self.script.to_string_lossy())
        )
    }

    /// Command line suitable for running interactively in a terminal.
    pub fn interactive_command_line(&self, args: &str) -> String {
        format!("bash {} {args}", quote(&self.script.to_string_lossy()))
    }

    /// Runs `geo <args>` and returns stdout (empty on failure).
    pub async fn run(&self, args: &str) -> String {
        self.runner.run_text(&self.command_line(args)).await
    }

    /// Runs `geo <args>` and returns `(stdout, stderr)`.
    pub async fn run_output(&self, args: &str) -> (String, String) {
        self.runner.run_output(&self.command_line(args)).await
    }

    /// Runs `geo <args>` and returns whether it exited with status 0.
    pub async fn run_success(&self, args: &str) -> bool {
        self.runner.run_success(&self.command_line(args)).await
    }

    pub async fn get_config(&self, key: &str) -> String {
        self.run(&format!("get {key}")).await
    }

    pub async fn set_config(&self, key: &str, value: &str) -> bool {
        tracing::debug!(key, value, "setting geo-cli config");
        self.run_success(&format!("set {key} {}", quote(value))).await
    }

    pub async fn rm_config(&self, key: &str) -> bool {
        self.run_success(&format!("rm {key}")).await
    }

    /// Starts a database container without prompting (`-n`).
    ///
    /// Returns `(stdout, stderr)` so callers can look for failure text such
    /// as `Port error`.
    pub async fn start_db(&self, name: &str) -> (String, String) {
        tracing::info!(db = name, "starting database");
        self.run_output(&format!("db start -n {}", quote(name))).await
    }

    pub async fn stop_db(&self) -> bool {
        tracing::info!("stopping database");
        self.run_success("db stop").await
    }

    pub async fn remove_db(&self, name: &str) -> bool {
        tracing::info!(db = name, "removing database container");
        self.run_success(&format!("db rm {}", quote(name))).await
    }

    /// Release identifier of the checked-out MyGeotab source.
    pub async fn myg_release(&self) -> String {
        self.run("dev release").await
    }

    pub async fn is_update_available(&self) -> bool {
        self.run("dev update-available").await == "true"
    }

    pub async fn gateway_running(&self) -> bool {
        self.run_success("gw is-running").await
    }

    pub async fn myg_running(&self) -> bool {
        self.run_success("myg is-running").await
    }

    /// Open IAP tunnels as `name=port|name=port`.
    pub async fn open_iap_tunnels(&self) -> String {
        self.run("dev open-iap-tunnels").await
    }

    pub async fn npm_install(&self) -> (String, String) {
        self.run_output("init npm").await
    }

    /// Switches `server.config` between releases; returns stdout and stderr
    /// joined by a newline.
    pub async fn auto_switch_server_config(&self, current: &str, previous: &str) -> String {
        let (out, err) = self
            .run_output(&format!(
                "dev auto-switch {} {}",
                quote(current),
                quote(previous)
            ))
            .await;
        if err.is_empty() {
            out
        } else {
            format!("{out}\n{err}")
        }
    }

    pub async fn disable_indicator(&self) -> bool {
        self.run_success("indicator disable").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> GeoCli {
        GeoCli::new(ShellRunner::default(), Path::new("/opt/geo-cli/src"))
    }

    #[test]
    fn command_line_passes_output_flags() {
        assert_eq!(
            cli().command_line("db stop"),
            "bash '/opt/geo-cli/src/geo-cli.sh' --raw-output --no-update-check db stop"
        );
    }

    #[test]
    fn interactive_command_line_has_no_flags() {
        assert_eq!(
            cli().interactive_command_line("db psql"),
            "bash '/opt/geo-cli/src/geo-cli.sh' db psql"
        );
    }

    #[tokio::test]
    async fn runs_script_and_trims_output() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(GEO_SCRIPT),
            "#!/bin/bash\n\
             shift 2\n\
             case \"$1\" in\n\
               dev) [ \"$2\" = update-available ] && echo true || echo 10.1 ;;\n\
               gw) exit 1 ;;\n\
               get) echo \"value-of-$2\" ;;\n\
               *) echo \"args: $*\" ;;\n\
             esac\n",
        )
        .unwrap();

        let geo = GeoCli::new(ShellRunner::default(), tmp.path());
        assert!(geo.is_update_available().await);
        assert_eq!(geo.myg_release().await, "10.1");
        assert!(!geo.gateway_running().await);
        assert_eq!(geo.get_config("SHOW_NOTIFICATIONS").await, "value-of-SHOW_NOTIFICATIONS");
        assert_eq!(geo.run("db ls").await, "args: db ls");
    }
}
