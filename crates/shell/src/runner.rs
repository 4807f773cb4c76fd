//! Timed `bash -c` execution with fail-soft result views.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::ShellError;

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output with one trailing newline removed.
    pub stdout: String,
    /// Standard error with one trailing newline removed.
    pub stderr: String,
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

/// Removes a single trailing `\n` (and a preceding `\r`, if any).
pub fn trim_trailing_newline(s: &str) -> &str {
    let s = s.strip_suffix('\n').unwrap_or(s);
    s.strip_suffix('\r').unwrap_or(s)
}

/// Runs command lines through `bash -c`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    timeout: Duration,
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ShellRunner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            shell: "bash".into(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs `command` and returns its captured output.
    ///
    /// Only spawn failures and timeouts are errors; a non-zero exit is
    /// reported through [`CommandOutput::success`]. The child is killed if
    /// the timeout elapses.
    pub async fn output(&self, command: &str) -> Result<CommandOutput, ShellError> {
        tracing::trace!(command, "running shell command");

        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ShellError::Spawn {
                    command: command.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(ShellError::Timeout {
                    command: command.to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        Ok(CommandOutput {
            stdout: trim_trailing_newline(&stdout).to_string(),
            stderr: trim_trailing_newline(&stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }

    /// Runs `command` and requires a zero exit status.
    pub async fn try_run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        let output = self.output(command).await?;
        if output.success {
            Ok(output)
        } else {
            Err(ShellError::Failed {
                command: command.to_string(),
                code: output.code,
                stderr: output.stderr,
            })
        }
    }

    /// Returns stdout, or an empty string on any failure.
    pub async fn run_text(&self, command: &str) -> String {
        match self.try_run(command).await {
            Ok(output) => output.stdout,
            Err(e) => {
                tracing::debug!("shell command failed: {e}");
                String::new()
            }
        }
    }

    /// Returns `(stdout, stderr)` regardless of exit status; both are empty
    /// when the command could not run at all.
    pub async fn run_output(&self, command: &str) -> (String, String) {
        match self.output(command).await {
            Ok(output) => {
                if !output.success {
                    tracing::debug!(command, code = ?output.code, "command exited non-zero");
                }
                (output.stdout, output.stderr)
            }
            Err(e) => {
                tracing::warn!("shell command failed: {e}");
                (String::new(), String::new())
            }
        }
    }

    /// Returns whether the command ran and exited with status 0.
    pub async fn run_success(&self, command: &str) -> bool {
        match self.output(command).await {
            Ok(output) => output.success,
            Err(e) => {
                tracing::warn!("shell command failed: {e}");
                false
            }
        }
    }
}

/// Wraps `value` in single quotes for safe use in a `bash -c` line.
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_exactly_one_newline() {
        assert_eq!(trim_trailing_newline("abc\n"), "abc");
        assert_eq!(trim_trailing_newline("abc\n\n"), "abc\n");
        assert_eq!(trim_trailing_newline("abc\r\n"), "abc");
        assert_eq!(trim_trailing_newline("abc"), "abc");
        assert_eq!(trim_trailing_newline(""), "");
    }

    #[test]
    fn quote_escapes_single_quotes() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("it's"), r"'it'\''s'");
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let runner = ShellRunner::default();
        let out = runner.output("echo hello; echo oops 1>&2").await.unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "hello");
        assert_eq!(out.stderr, "oops");
        assert_eq!(out.code, Some(0));
    }

    #[tokio::test]
    async fn run_text_is_empty_on_failure() {
        let runner = ShellRunner::default();
        assert_eq!(runner.run_text("echo partial; exit 3").await, "");
        assert_eq!(runner.run_text("printf 'a\\nb\\n'").await, "a\nb");
    }

    #[tokio::test]
    async fn run_output_keeps_text_of_failed_commands() {
        let runner = ShellRunner::default();
        let (out, err) = runner.run_output("echo out; echo ERR 1>&2; exit 1").await;
        assert_eq!(out, "out");
        assert_eq!(err, "ERR");
    }

    #[tokio::test]
    async fn run_success_reflects_exit_status() {
        let runner = ShellRunner::default();
        assert!(runner.run_success("true").await);
        assert!(!runner.run_success("false").await);
    }

    #[tokio::test]
    async fn try_run_reports_failure() {
        let runner = ShellRunner::default();
        let err = runner.try_run("echo nope 1>&2; exit 2").await.unwrap_err();
        match err {
            ShellError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn timeout_is_an_error_and_degrades_to_empty() {
        let runner = ShellRunner::new(Duration::from_millis(100));
        let err = runner.output("sleep 5").await.unwrap_err();
        assert!(matches!(err, ShellError::Timeout { .. }));
        assert_eq!(runner.run_text("sleep 5; echo late").await, "");
        assert!(!runner.run_success("sleep 5").await);
    }
}
