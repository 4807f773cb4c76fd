//! Yes/no confirmation dialogs via `zenity`.

use crate::runner::{ShellRunner, quote};

/// Asks the user to confirm destructive actions.
///
/// A cancelled or closed dialog, or a missing `zenity`, is a plain `false`.
#[derive(Debug, Clone)]
pub struct Confirm {
    runner: ShellRunner,
}

impl Confirm {
    pub fn new(runner: ShellRunner) -> Self {
        Self { runner }
    }

    pub(crate) fn command(title: &str, text: &str, detail: &str) -> String {
        let body = if detail.is_empty() {
            text.to_string()
        } else {
            format!("{text}\n\n{detail}")
        };
        format!(
            "zenity --question --no-wrap --title={} --text={}",
            quote(title),
            quote(&body)
        )
    }

    pub async fn ask(&self, title: &str, text: &str, detail: &str) -> bool {
        let confirmed = self
            .runner
            .run_success(&Self::command(title, text, detail))
            .await;
        tracing::debug!(text, confirmed, "confirmation answered");
        confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_joins_text_and_detail() {
        let cmd = Confirm::command(
            "geo-cli",
            "Remove database container '81'?",
            "This cannot be undone.",
        );
        assert!(cmd.starts_with("zenity --question"));
        assert!(cmd.contains("--title='geo-cli'"));
        assert!(cmd.contains(r"Remove database container '\''81'\''?"));
        assert!(cmd.contains("This cannot be undone."));
    }
}
