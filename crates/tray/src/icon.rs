//! Tray icon selection.
//!
//! Green icons mean a geo-cli database is running, red that none is, orange
//! that the last start attempt failed. Variants add an "update available"
//! badge and a "MyGeotab/Gateway running" badge.

/// Database status driving the base icon colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DbState {
    #[default]
    NoDbRunning,
    DbRunning,
    DbError,
}

/// Pre-rendered icon assets shipped in the `res` directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconAsset {
    Green,
    GreenMyg,
    GreenUpdate,
    GreenUpdateMyg,
    Red,
    RedMyg,
    RedUpdate,
    RedUpdateMyg,
    Orange,
    OrangeUpdate,
}

impl IconAsset {
    /// Icon name without extension (also the freedesktop icon name).
    pub fn name(self) -> &'static str {
        match self {
            IconAsset::Green => "geo-icon-green",
            IconAsset::GreenMyg => "geo-icon-green-myg",
            IconAsset::GreenUpdate => "geo-icon-green-update",
            IconAsset::GreenUpdateMyg => "geo-icon-green-update-myg",
            IconAsset::Red => "geo-icon-red",
            IconAsset::RedMyg => "geo-icon-red-myg",
            IconAsset::RedUpdate => "geo-icon-red-update",
            IconAsset::RedUpdateMyg => "geo-icon-red-update-myg",
            IconAsset::Orange => "geo-icon-orange",
            IconAsset::OrangeUpdate => "geo-icon-orange-update",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.svg", self.name())
    }

    pub fn tooltip(self) -> &'static str {
        match self {
            IconAsset::Green
            | IconAsset::GreenMyg
            | IconAsset::GreenUpdate
            | IconAsset::GreenUpdateMyg => "geo-cli: DB running",
            IconAsset::Red | IconAsset::RedMyg | IconAsset::RedUpdate | IconAsset::RedUpdateMyg => {
                "geo-cli: No DB running"
            }
            IconAsset::Orange | IconAsset::OrangeUpdate => "geo-cli: DB Error",
        }
    }

    /// Resolves the asset for a state and flag combination.
    pub fn resolve(
        db: DbState,
        update_available: bool,
        myg_running: bool,
        gateway_running: bool,
    ) -> Self {
        let busy = myg_running || gateway_running;
        match (db, update_available, busy) {
            (DbState::DbRunning, false, false) => IconAsset::Green,
            (DbState::DbRunning, false, true) => IconAsset::GreenMyg,
            (DbState::DbRunning, true, false) => IconAsset::GreenUpdate,
            (DbState::DbRunning, true, true) => IconAsset::GreenUpdateMyg,
            (DbState::NoDbRunning, false, false) => IconAsset::Red,
            (DbState::NoDbRunning, false, true) => IconAsset::RedMyg,
            (DbState::NoDbRunning, true, false) => IconAsset::RedUpdate,
            (DbState::NoDbRunning, true, true) => IconAsset::RedUpdateMyg,
            (DbState::DbError, false, _) => IconAsset::Orange,
            (DbState::DbError, true, _) => IconAsset::OrangeUpdate,
        }
    }
}

/// A new icon to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconChange {
    pub asset: IconAsset,
    pub tooltip: &'static str,
}

/// Tracks the applied icon and reports only real changes.
#[derive(Debug, Default)]
pub struct IconManager {
    db: DbState,
    update_available: bool,
    myg_running: bool,
    gateway_running: bool,
    applied: Option<IconAsset>,
}

impl IconManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn db_state(&self) -> DbState {
        self.db
    }

    pub fn applied(&self) -> Option<IconAsset> {
        self.applied
    }

    /// Asset for the current state, whether or not it has been applied.
    pub fn resolved(&self) -> IconAsset {
        IconAsset::resolve(self.db, self.update_available, self.myg_running, self.gateway_running)
    }

    pub fn set_db_state(&mut self, db: DbState) -> Option<IconChange> {
        self.db = db;
        self.update()
    }

    pub fn set_update_available(&mut self, available: bool) -> Option<IconChange> {
        self.update_available = available;
        self.update()
    }

    pub fn set_myg_running(&mut self, running: bool) -> Option<IconChange> {
        self.myg_running = running;
        self.update()
    }

    pub fn set_gateway_running(&mut self, running: bool) -> Option<IconChange> {
        self.gateway_running = running;
        self.update()
    }

    /// Returns the icon to apply if it differs from the applied one.
    pub fn update(&mut self) -> Option<IconChange> {
        let asset = self.resolved();
        if self.applied == Some(asset) {
            return None;
        }
        self.applied = Some(asset);
        Some(IconChange {
            asset,
            tooltip: asset.tooltip(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_full_table() {
        use DbState::*;
        assert_eq!(IconAsset::resolve(DbRunning, false, false, false), IconAsset::Green);
        assert_eq!(IconAsset::resolve(DbRunning, true, true, false), IconAsset::GreenUpdateMyg);
        assert_eq!(IconAsset::resolve(NoDbRunning, false, false, false), IconAsset::Red);
        assert_eq!(IconAsset::resolve(NoDbRunning, true, false, false), IconAsset::RedUpdate);
        assert_eq!(IconAsset::resolve(NoDbRunning, false, false, true), IconAsset::RedMyg);
        assert_eq!(IconAsset::resolve(DbError, false, true, true), IconAsset::Orange);
        assert_eq!(IconAsset::resolve(DbError, true, false, false), IconAsset::OrangeUpdate);
    }

    #[test]
    fn first_update_always_applies() {
        let mut icons = IconManager::new();
        let change = icons.update().unwrap();
        assert_eq!(change.asset, IconAsset::Red);
        assert_eq!(change.tooltip, "geo-cli: No DB running");
    }

    #[test]
    fn unchanged_icon_is_not_reapplied() {
        let mut icons = IconManager::new();
        icons.update();
        assert_eq!(icons.set_db_state(DbState::NoDbRunning), None);

        let change = icons.set_db_state(DbState::DbRunning).unwrap();
        assert_eq!(change.asset, IconAsset::Green);
        assert_eq!(icons.set_db_state(DbState::DbRunning), None);
    }

    #[test]
    fn flags_select_variants() {
        let mut icons = IconManager::new();
        icons.set_db_state(DbState::DbRunning);
        assert_eq!(icons.set_update_available(true).unwrap().asset, IconAsset::GreenUpdate);
        assert_eq!(icons.set_gateway_running(true).unwrap().asset, IconAsset::GreenUpdateMyg);
        // MyGeotab joining Gateway does not change the badge.
        assert_eq!(icons.set_myg_running(true), None);
        assert_eq!(icons.set_db_state(DbState::DbError).unwrap().asset, IconAsset::OrangeUpdate);
    }

    #[test]
    fn asset_file_names() {
        assert_eq!(IconAsset::GreenUpdateMyg.file_name(), "geo-icon-green-update-myg.svg");
        assert_eq!(IconAsset::Orange.tooltip(), "geo-cli: DB Error");
    }
}
