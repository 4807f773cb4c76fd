//! geo-cli configuration as seen by the indicator.
//!
//! Reads come from the mtime-cached config file; writes go through
//! `geo set` so geo-cli stays the only writer of its own file.

use geo_indicator_config::ConfigCache;
use geo_indicator_shell::GeoCli;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("geo set {key} failed")]
    Write { key: String },
}

pub struct Settings {
    cache: ConfigCache,
    geo: GeoCli,
}

impl Settings {
    pub fn new(cache: ConfigCache, geo: GeoCli) -> Self {
        Self { cache, geo }
    }

    /// Value of `key`, or `None` when unset or empty.
    pub fn get(&mut self, key: &str) -> Option<String> {
        self.cache.get(key).filter(|v| !v.is_empty())
    }

    /// Notifications are on unless explicitly set to `false`.
    pub fn notifications_enabled(&mut self) -> bool {
        self.get("SHOW_NOTIFICATIONS")
            .is_none_or(|v| !v.eq_ignore_ascii_case("false"))
    }

    pub async fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        if !self.geo.set_config(key, value).await {
            return Err(SettingsError::Write { key: key.to_string() });
        }
        // Writes within the same mtime tick would otherwise go unseen.
        self.cache.invalidate();
        Ok(())
    }
}
