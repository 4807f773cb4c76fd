//! Database container enumeration through the `docker` CLI.

use crate::runner::ShellRunner;

/// Name filter matching every geo-cli database container.
pub const DB_CONTAINER_PREFIX: &str = "geo_cli_db_";

/// Prefix stripped from container names for display and for `geo db` calls.
pub const DB_NAME_PREFIX: &str = "geo_cli_db_postgres_";

/// Strips [`DB_NAME_PREFIX`] from a full container name.
pub fn strip_db_prefix(full_name: &str) -> &str {
    full_name.strip_prefix(DB_NAME_PREFIX).unwrap_or(full_name)
}

/// Parses `docker container ls --format "{{ .Names }}"` output into
/// short names, skipping blank lines.
pub fn parse_container_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| strip_db_prefix(line).to_string())
        .collect()
}

/// Queries geo-cli database containers.
#[derive(Debug, Clone, Default)]
pub struct Docker {
    runner: ShellRunner,
}

impl Docker {
    pub fn new(runner: ShellRunner) -> Self {
        Self { runner }
    }

    fn list_command(running_only: bool) -> String {
        let status = if running_only {
            " --filter status=running"
        } else {
            ""
        };
        format!(
            "docker container ls -a --filter name={DB_CONTAINER_PREFIX}{status} \
             --format '{{{{ .Names }}}}'"
        )
    }

    /// Short names of all database containers (running or not).
    ///
    /// A failed `docker` call yields an empty list.
    pub async fn db_names(&self) -> Vec<String> {
        let output = self.runner.run_text(&Self::list_command(false)).await;
        parse_container_names(&output)
    }

    /// Short name of the running database container, or `""`.
    pub async fn running_db_name(&self) -> String {
        let output = self.runner.run_text(&Self::list_command(true)).await;
        parse_container_names(&output)
            .into_iter()
            .next()
            .unwrap_or_default()
    }
}
