//! Indicator settings file.
//!
//! Stored as TOML at `~/.config/geo-indicator/indicator.toml` and created
//! with defaults on first run. These settings belong to the indicator
//! itself; geo-cli's own `KEY=VALUE` config is read through
//! [`crate::settings::Settings`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// geo-cli source directory (the one holding `geo-cli.sh`).
    #[serde(default = "default_geo_cli_dir")]
    pub geo_cli_dir: PathBuf,

    /// geo-cli config file.
    #[serde(default = "geo_indicator_config::default_path")]
    pub config_file: PathBuf,

    /// Icon theme directory; defaults to the icons shipped with geo-cli.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_dir: Option<PathBuf>,

    /// Timeout for quick queries (`geo get`, `docker ls`, ...).
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Timeout for slow operations (starting databases, `npm install`).
    #[serde(default = "default_long_command_timeout")]
    pub long_command_timeout_secs: u64,

    #[serde(default = "default_db_poll")]
    pub db_poll_ms: u64,

    #[serde(default = "default_release_poll")]
    pub release_poll_ms: u64,

    #[serde(default = "default_toggle_poll")]
    pub toggle_poll_ms: u64,

    #[serde(default = "default_gateway_poll")]
    pub gateway_poll_ms: u64,

    #[serde(default = "default_update_check")]
    pub update_check_secs: u64,

    #[serde(default = "default_notification_gap")]
    pub notification_gap_ms: u64,

    /// How many times the indicator is restarted after a failure.
    #[serde(default = "default_restart_attempts")]
    pub restart_attempts: u32,
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".into()))
}

fn default_geo_cli_dir() -> PathBuf {
    home_dir().join("repos").join("geo-cli").join("src")
}

fn default_command_timeout() -> u64 {
    15
}

fn default_long_command_timeout() -> u64 {
    600
}

fn default_db_poll() -> u64 {
    1000
}

fn default_release_poll() -> u64 {
    2000
}

fn default_toggle_poll() -> u64 {
    1000
}

fn default_gateway_poll() -> u64 {
    4000
}

fn default_update_check() -> u64 {
    10 * 60
}

fn default_notification_gap() -> u64 {
    1500
}

fn default_restart_attempts() -> u32 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geo_cli_dir: default_geo_cli_dir(),
            config_file: geo_indicator_config::default_path(),
            icon_dir: None,
            command_timeout_secs: default_command_timeout(),
            long_command_timeout_secs: default_long_command_timeout(),
            db_poll_ms: default_db_poll(),
            release_poll_ms: default_release_poll(),
            toggle_poll_ms: default_toggle_poll(),
            gateway_poll_ms: default_gateway_poll(),
            update_check_secs: default_update_check(),
            notification_gap_ms: default_notification_gap(),
            restart_attempts: default_restart_attempts(),
        }
    }
}

impl Config {
    /// Loads the settings file from its default location, creating it when
    /// missing.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            tracing::debug!(path = %path.display(), "settings loaded");
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!(path = %path.display(), "created default settings");
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn icon_dir(&self) -> PathBuf {
        self.icon_dir.clone().unwrap_or_else(|| {
            self.geo_cli_dir
                .join("py")
                .join("indicator")
                .join("res")
        })
    }

    /// The geo-cli README, one level above the source directory.
    pub fn readme_path(&self) -> PathBuf {
        self.geo_cli_dir
            .parent()
            .unwrap_or(&self.geo_cli_dir)
            .join("README.md")
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn long_command_timeout(&self) -> Duration {
        Duration::from_secs(self.long_command_timeout_secs.max(1))
    }

    pub fn notification_gap(&self) -> Duration {
        Duration::from_millis(self.notification_gap_ms)
    }
}

/// Returns the settings file path.
fn config_path() -> PathBuf {
    home_dir()
        .join(".config")
        .join("geo-indicator")
        .join("indicator.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.geo_cli_dir.ends_with("geo-cli/src"));
        assert!(config.config_file.ends_with(".geo-cli/data/geo/config"));
        assert_eq!(config.command_timeout(), Duration::from_secs(15));
        assert_eq!(config.db_poll_ms, 1000);
        assert_eq!(config.release_poll_ms, 2000);
        assert_eq!(config.gateway_poll_ms, 4000);
        assert_eq!(config.update_check_secs, 600);
        assert_eq!(config.notification_gap(), Duration::from_millis(1500));
        assert_eq!(config.restart_attempts, 5);
    }

    #[test]
    fn config_partial_toml() {
        let config: Config = toml::from_str(r#"geo_cli_dir = "/opt/geo-cli/src""#).unwrap();
        assert_eq!(config.geo_cli_dir, PathBuf::from("/opt/geo-cli/src"));
        assert_eq!(config.db_poll_ms, 1000);
        assert_eq!(config.icon_dir(), PathBuf::from("/opt/geo-cli/src/py/indicator/res"));
        assert_eq!(config.readme_path(), PathBuf::from("/opt/geo-cli/README.md"));
    }

    #[test]
    fn explicit_icon_dir_wins() {
        let config = Config {
            icon_dir: Some("/usr/share/geo-indicator".into()),
            ..Config::default()
        };
        assert_eq!(config.icon_dir(), PathBuf::from("/usr/share/geo-indicator"));
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path();
        assert!(path.ends_with("geo-indicator/indicator.toml"));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("indicator.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn config_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("indicator.toml");

        let config = Config {
            db_poll_ms: 250,
            restart_attempts: 2,
            icon_dir: Some("/icons".into()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("indicator.toml");
        std::fs::write(&path, "db_poll_ms = \"often\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
