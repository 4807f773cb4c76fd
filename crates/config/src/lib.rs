//! Cached view of the geo-cli configuration file.
//!
//! geo-cli persists its settings as `KEY=VALUE` lines. The indicator reads
//! that file many times per second from independent pollers, so the parsed
//! contents are cached and only reloaded when the file's modification time
//! advances. Writes never go through the cache: they are made by the `geo`
//! tool and picked up on the next reload.

mod cache;
mod parse;

pub use cache::{ConfigCache, default_path};
pub use parse::{KEY_PREFIX, normalize_key, parse};

/// Errors while reading the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
