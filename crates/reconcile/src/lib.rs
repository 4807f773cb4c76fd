//! State reconciliation for the geo-cli indicator.
//!
//! Everything in this crate is driven by values: pollers fetch a
//! [`ContainerSetSnapshot`] (or a release string, or a config value) through
//! the shell bridge and hand it to a model here, which works out what changed
//! and what the menu, icon and notifications should become. Nothing here
//! spawns processes, so tests inject synthetic snapshots.

pub mod auto_switch;
pub mod db_menu;
pub mod release;
pub mod running;
pub mod snapshot;
pub mod sort;
pub mod toggle;
pub mod tunnels;

pub use auto_switch::{
    AutoSwitchContext, AutoSwitchRunner, AutoSwitchTask, MAX_WORKERS, TaskFuture, TaskOutcome,
    TaskReport, summary,
};
pub use db_menu::{DbEntry, DbMenuModel, ReconcileOutcome};
pub use release::{
    ReleaseChange, ReleaseTracker, best_db_for_release, db_for_release_key, release_key,
};
pub use running::{RunningDbIndicator, RunningObservation, RunningStatus};
pub use snapshot::ContainerSetSnapshot;
pub use sort::{SortMode, SortPolicy, compare_release};
pub use toggle::{ConfigWrite, PersistentToggle, Toggles};
pub use tunnels::{OpenTunnel, OpenTunnels, PreviousTunnels, TunnelCommand};

#[cfg(test)]
mod tests {
    use geo_indicator_tray::{DbState, IconManager};

    use super::*;

    struct Harness {
        dbs: DbMenuModel,
        running: RunningDbIndicator,
        icons: IconManager,
        notifications: Vec<String>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                dbs: DbMenuModel::new(SortPolicy::default()),
                running: RunningDbIndicator::new(),
                icons: IconManager::new(),
                notifications: Vec::new(),
            }
        }

        fn tick(&mut self, snapshot: &ContainerSetSnapshot) {
            self.dbs.reconcile(&snapshot.names);
            let obs = self.running.observe(snapshot.running_name());
            self.dbs.set_running(self.running.running());
            self.icons.set_db_state(obs.db_state);
            self.notifications.extend(obs.notify);
        }

        fn startable(&self, name: &str) -> bool {
            self.dbs.get(name).is_some_and(|e| e.startable)
        }
    }

    #[test]
    fn database_lifecycle_end_to_end() {
        let mut h = Harness::new();

        h.tick(&ContainerSetSnapshot::new(["9_7", "81"], ""));
        assert_eq!(h.icons.db_state(), DbState::NoDbRunning);
        assert!(h.startable("9_7"));
        assert!(h.startable("81"));

        h.tick(&ContainerSetSnapshot::new(["9_7", "81"], "9_7"));
        assert_eq!(h.icons.db_state(), DbState::DbRunning);
        assert!(!h.startable("9_7"));
        assert!(h.startable("81"));
        assert_eq!(h.notifications, vec!["DB Started: 9_7"]);

        h.tick(&ContainerSetSnapshot::new(["9_7"], "9_7"));
        assert_eq!(h.dbs.names(), vec!["9_7"]);
        assert!(!h.startable("9_7"));
        assert_eq!(h.running.label(), "Running DB [9_7]");
        assert_eq!(h.notifications.len(), 1);
    }

    #[test]
    fn at_most_one_entry_is_held_back_by_running() {
        let mut h = Harness::new();
        for running in ["", "81", "9_7", "10_1", ""] {
            h.tick(&ContainerSetSnapshot::new(["9_7", "81", "10_1"], running));
            let held = h.dbs.entries().iter().filter(|e| !e.startable).count();
            assert_eq!(held, usize::from(!running.is_empty()), "running {running:?}");
        }
    }
}
