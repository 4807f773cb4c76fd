//! Modification-time driven config cache.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::ConfigError;
use crate::parse::{normalize_key, parse};

/// Default location of the geo-cli config file.
pub fn default_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home)
        .join(".geo-cli")
        .join("data")
        .join("geo")
        .join("config")
}

/// Cached key/value view of a `KEY=VALUE` file.
///
/// Every read first checks the file's modification time and reparses the
/// file when it is newer than the last load. If reading fails the previous
/// contents are kept.
#[derive(Debug)]
pub struct ConfigCache {
    path: PathBuf,
    values: HashMap<String, String>,
    loaded_mtime: Option<SystemTime>,
    loaded: bool,
}

impl ConfigCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: HashMap::new(),
            loaded_mtime: None,
            loaded: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forces the next read to reload the file.
    pub fn invalidate(&mut self) {
        self.loaded = false;
        self.loaded_mtime = None;
    }

    /// Reloads the file if it changed since the last load.
    ///
    /// Returns `true` when the cached contents were replaced.
    pub fn refresh(&mut self) -> bool {
        match self.try_refresh() {
            Ok(reloaded) => reloaded,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "keeping cached config: {e}");
                false
            }
        }
    }

    fn try_refresh(&mut self) -> Result<bool, ConfigError> {
        let mtime = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if self.loaded && self.loaded_mtime.is_none() {
                    return Ok(false);
                }
                tracing::debug!(
                    path = %self.path.display(),
                    "config file missing, using empty config"
                );
                self.values.clear();
                self.loaded = true;
                self.loaded_mtime = None;
                return Ok(true);
            }
            Err(e) => return Err(e.into()),
        };

        let stale = !self.loaded || self.loaded_mtime.is_none_or(|loaded| mtime > loaded);
        if !stale {
            return Ok(false);
        }

        let content = std::fs::read_to_string(&self.path)?;
        self.values = parse(&content);
        self.loaded = true;
        self.loaded_mtime = Some(mtime);
        tracing::trace!(entries = self.values.len(), "config reloaded");
        Ok(true)
    }

    /// Returns the value for `key`, reloading first if the file changed.
    ///
    /// Keys are case-insensitive and may be given with or without the
    /// `GEO_CLI_` prefix.
    pub fn get(&mut self, key: &str) -> Option<String> {
        self.refresh();
        self.values.get(&normalize_key(key)).cloned()
    }

    /// Like [`get`](Self::get) but missing keys read as `""`.
    pub fn get_or_empty(&mut self, key: &str) -> String {
        self.get(key).unwrap_or_default()
    }

    /// Reads a boolean setting: missing or empty means `default`, otherwise
    /// the value must equal `true` (any case).
    pub fn get_bool(&mut self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => value.trim().eq_ignore_ascii_case("true"),
            _ => default,
        }
    }

    /// Number of indexed keys (aliases included) after a refresh.
    pub fn len(&mut self) -> usize {
        self.refresh();
        self.values.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::Duration;

    use super::*;

    fn write_with_mtime(path: &Path, content: &str, mtime: SystemTime) {
        std::fs::write(path, content).unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = ConfigCache::new(tmp.path().join("config"));
        assert_eq!(cache.get("VERSION"), None);
        assert!(cache.is_empty());
        assert!(cache.get_bool("SHOW_NOTIFICATIONS", true));
    }

    #[test]
    fn lookups_are_case_and_prefix_insensitive() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config");
        std::fs::write(&path, "GEO_CLI_AUTO_SWITCH_DB=false\n").unwrap();

        let mut cache = ConfigCache::new(&path);
        assert_eq!(cache.get("auto_switch_db").as_deref(), Some("false"));
        assert_eq!(cache.get("GEO_CLI_AUTO_SWITCH_DB").as_deref(), Some("false"));
        assert!(!cache.get_bool("AUTO_SWITCH_DB", true));
    }

    #[test]
    fn value_is_stale_until_mtime_advances() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config");
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        write_with_mtime(&path, "LAST_DB_VERSION=9_7\n", t0);
        let mut cache = ConfigCache::new(&path);
        assert_eq!(cache.get("LAST_DB_VERSION").as_deref(), Some("9_7"));

        // Same mtime: the new content is not observed yet.
        write_with_mtime(&path, "LAST_DB_VERSION=81\n", t0);
        assert_eq!(cache.get("LAST_DB_VERSION").as_deref(), Some("9_7"));

        write_with_mtime(&path, "LAST_DB_VERSION=81\n", t0 + Duration::from_secs(1));
        assert_eq!(cache.get("LAST_DB_VERSION").as_deref(), Some("81"));
    }

    #[test]
    fn invalidate_forces_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config");
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        write_with_mtime(&path, "A=1\n", t0);
        let mut cache = ConfigCache::new(&path);
        assert_eq!(cache.get("A").as_deref(), Some("1"));

        write_with_mtime(&path, "A=2\n", t0);
        cache.invalidate();
        assert_eq!(cache.get("A").as_deref(), Some("2"));
    }

    #[test]
    fn read_error_keeps_previous_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config");
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_with_mtime(&path, "A=1\n", t0);

        let mut cache = ConfigCache::new(&path);
        assert_eq!(cache.get("A").as_deref(), Some("1"));

        // Replace the file with a directory: metadata works, reading fails.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(!cache.refresh());
        assert_eq!(cache.get("A").as_deref(), Some("1"));
    }

    #[test]
    fn deleted_file_clears_the_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config");
        std::fs::write(&path, "A=1\n").unwrap();

        let mut cache = ConfigCache::new(&path);
        assert_eq!(cache.get("A").as_deref(), Some("1"));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cache.get("A"), None);
    }

    #[test]
    fn default_path_points_into_geo_cli_data() {
        assert!(default_path().ends_with(".geo-cli/data/geo/config"));
    }
}
