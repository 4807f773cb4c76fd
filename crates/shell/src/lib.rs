//! Shell bridge for the geo-cli indicator.
//!
//! Every domain operation the indicator performs is delegated to an external
//! process: the `geo` script, `docker`, a terminal emulator or a dialog tool.
//! Calls are fail-soft: spawn errors, timeouts and non-zero exits are logged
//! and degraded to empty or `false` results. The next poll tick is the retry.

pub mod confirm;
pub mod docker;
pub mod geo;
pub mod runner;
pub mod terminal;

pub use confirm::Confirm;
pub use docker::{DB_CONTAINER_PREFIX, DB_NAME_PREFIX, Docker, strip_db_prefix};
pub use geo::GeoCli;
pub use runner::{CommandOutput, DEFAULT_TIMEOUT, ShellRunner, trim_trailing_newline};
pub use terminal::{Launched, Terminal};

/// Errors from running an external command.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("`{command}` exited with status {code:?}: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}
