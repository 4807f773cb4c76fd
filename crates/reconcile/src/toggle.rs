//! Config-backed check items.
//!
//! A toggle changes for two reasons: the user clicked it, or the config
//! file changed underneath it. Only the first writes back to the config.

use geo_indicator_tray::ToggleId;

use crate::sort::{SortMode, SortPolicy};

/// A config write the caller must perform (`geo set KEY value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWrite {
    pub key: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone)]
pub struct PersistentToggle {
    id: ToggleId,
    key: &'static str,
    label: &'static str,
    on_value: &'static str,
    off_value: &'static str,
    default: bool,
    enabled: bool,
}

impl PersistentToggle {
    /// A `true`/`false` toggle.
    pub fn boolean(id: ToggleId, key: &'static str, label: &'static str, default: bool) -> Self {
        Self::with_values(id, key, label, ("true", "false"), default)
    }

    /// A toggle persisted as one of two named values.
    pub fn with_values(
        id: ToggleId,
        key: &'static str,
        label: &'static str,
        (on_value, off_value): (&'static str, &'static str),
        default: bool,
    ) -> Self {
        Self {
            id,
            key,
            label,
            on_value,
            off_value,
            default,
            enabled: default,
        }
    }

    pub fn id(&self) -> ToggleId {
        self.id
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Missing or empty → default; the on value (any case) → on; anything
    /// else → off.
    pub fn parse(&self, raw: Option<&str>) -> bool {
        match raw.map(str::trim) {
            None | Some("") => self.default,
            Some(value) => value.eq_ignore_ascii_case(self.on_value),
        }
    }

    /// Programmatic update from the config file. Never writes back.
    /// Returns `true` if the state changed.
    pub fn sync_from_config(&mut self, raw: Option<&str>) -> bool {
        let state = self.parse(raw);
        if state == self.enabled {
            return false;
        }
        tracing::debug!(key = self.key, enabled = state, "toggle changed in config");
        self.enabled = state;
        true
    }

    /// Flips the toggle on a user click and returns the write to persist.
    pub fn toggle_by_user(&mut self) -> ConfigWrite {
        self.enabled = !self.enabled;
        self.write()
    }

    fn write(&self) -> ConfigWrite {
        ConfigWrite {
            key: self.key,
            value: if self.enabled { self.on_value } else { self.off_value },
        }
    }
}

/// The indicator's toggles.
#[derive(Debug, Clone)]
pub struct Toggles {
    items: Vec<PersistentToggle>,
}

impl Default for Toggles {
    fn default() -> Self {
        Self::new()
    }
}

impl Toggles {
    pub fn new() -> Self {
        Self {
            items: vec![
                PersistentToggle::boolean(
                    ToggleId::AutoSwitchDb,
                    "AUTO_SWITCH_DB",
                    "Auto-Switch DB",
                    true,
                ),
                PersistentToggle::boolean(
                    ToggleId::AutoNpmInstall,
                    "AUTO_NPM_INSTALL",
                    "Auto-Install npm",
                    false,
                ),
                PersistentToggle::boolean(
                    ToggleId::AutoServerConfig,
                    "AUTO_SERVER_CONFIG",
                    "Auto-Switch server.config",
                    false,
                ),
                PersistentToggle::boolean(
                    ToggleId::ShowNotifications,
                    "SHOW_NOTIFICATIONS",
                    "Show Notifications",
                    true,
                ),
                PersistentToggle::with_values(
                    ToggleId::SortReleaseAware,
                    "INDICATOR_DB_SORT_MODE",
                    "Release-aware",
                    (SortMode::Release.as_str(), SortMode::Lexical.as_str()),
                    true,
                ),
                PersistentToggle::boolean(
                    ToggleId::SortDescending,
                    "INDICATOR_DB_SORT_DESC",
                    "Descending",
                    true,
                ),
            ],
        }
    }

    pub fn get(&self, id: ToggleId) -> Option<&PersistentToggle> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn is_enabled(&self, id: ToggleId) -> bool {
        self.get(id).is_some_and(PersistentToggle::is_enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersistentToggle> {
        self.items.iter()
    }

    /// Re-reads every toggle through `lookup` (config key → raw value).
    /// Returns the ids that changed.
    pub fn sync_from_config<F>(&mut self, mut lookup: F) -> Vec<ToggleId>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut changed = Vec::new();
        for toggle in &mut self.items {
            let raw = lookup(toggle.key);
            if toggle.sync_from_config(raw.as_deref()) {
                changed.push(toggle.id);
            }
        }
        changed
    }

    pub fn toggle_by_user(&mut self, id: ToggleId) -> Option<ConfigWrite> {
        let toggle = self.items.iter_mut().find(|t| t.id == id)?;
        let write = toggle.toggle_by_user();
        tracing::info!(key = write.key, value = write.value, "toggle set by user");
        Some(write)
    }

    /// Sort policy implied by the two sort toggles.
    pub fn sort_policy(&self) -> SortPolicy {
        SortPolicy {
            mode: if self.is_enabled(ToggleId::SortReleaseAware) {
                SortMode::Release
            } else {
                SortMode::Lexical
            },
            descending: self.is_enabled(ToggleId::SortDescending),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let toggles = Toggles::new();
        assert!(toggles.is_enabled(ToggleId::AutoSwitchDb));
        assert!(!toggles.is_enabled(ToggleId::AutoNpmInstall));
        assert!(!toggles.is_enabled(ToggleId::AutoServerConfig));
        assert!(toggles.is_enabled(ToggleId::ShowNotifications));
        assert_eq!(toggles.sort_policy(), SortPolicy::default());
    }

    #[test]
    fn user_toggle_returns_write() {
        let mut toggles = Toggles::new();
        let write = toggles.toggle_by_user(ToggleId::AutoNpmInstall).unwrap();
        assert_eq!(
            write,
            ConfigWrite {
                key: "AUTO_NPM_INSTALL",
                value: "true"
            }
        );
        assert!(toggles.is_enabled(ToggleId::AutoNpmInstall));
    }

    #[test]
    fn sort_mode_writes_named_values() {
        let mut toggles = Toggles::new();
        let write = toggles.toggle_by_user(ToggleId::SortReleaseAware).unwrap();
        assert_eq!(write.value, "lexical");
        assert_eq!(toggles.sort_policy().mode, SortMode::Lexical);
    }

    #[test]
    fn config_sync_reports_changes_without_writing() {
        let mut toggles = Toggles::new();
        let config: HashMap<&str, &str> = [
            ("AUTO_SWITCH_DB", "false"),
            ("SHOW_NOTIFICATIONS", "TRUE"),
            ("INDICATOR_DB_SORT_MODE", "lexical"),
        ]
        .into_iter()
        .collect();

        let changed = toggles.sync_from_config(|key| config.get(key).map(|v| v.to_string()));
        assert_eq!(changed, vec![ToggleId::AutoSwitchDb, ToggleId::SortReleaseAware]);
        assert!(!toggles.is_enabled(ToggleId::AutoSwitchDb));

        // Same config again: nothing to do.
        let changed = toggles.sync_from_config(|key| config.get(key).map(|v| v.to_string()));
        assert!(changed.is_empty());
    }

    #[test]
    fn empty_values_fall_back_to_default() {
        let toggle = PersistentToggle::boolean(ToggleId::AutoSwitchDb, "AUTO_SWITCH_DB", "x", true);
        assert!(toggle.parse(None));
        assert!(toggle.parse(Some("  ")));
        assert!(!toggle.parse(Some("no")));
    }
}
