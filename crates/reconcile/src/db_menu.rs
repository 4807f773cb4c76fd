//! The "Databases" submenu model.
//!
//! Each tick hands the model the current set of container names. The model
//! diffs it against the previous observation and touches only the entries
//! that were added or removed, keeping the list ordered by the active
//! [`SortPolicy`].

use std::collections::BTreeSet;

use crate::sort::SortPolicy;

/// One database in the submenu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbEntry {
    pub name: String,
    pub label: String,
    /// False for the running database and for one being removed.
    pub startable: bool,
    pub removing: bool,
}

impl DbEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            startable: true,
            removing: false,
        }
    }
}

/// What a call to [`DbMenuModel::reconcile`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// The list was built from scratch instead of patched.
    pub rebuilt: bool,
}

impl ReconcileOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && !self.rebuilt
    }
}

#[derive(Debug, Default)]
pub struct DbMenuModel {
    entries: Vec<DbEntry>,
    observed: BTreeSet<String>,
    policy: SortPolicy,
    running: Option<String>,
}

impl DbMenuModel {
    pub fn new(policy: SortPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn entries(&self) -> &[DbEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&DbEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn policy(&self) -> SortPolicy {
        self.policy
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Brings the entries in line with `current`.
    pub fn reconcile(&mut self, current: &BTreeSet<String>) -> ReconcileOutcome {
        let removed: Vec<String> = self.observed.difference(current).cloned().collect();
        let added: Vec<String> = current.difference(&self.observed).cloned().collect();
        if added.is_empty() && removed.is_empty() {
            return ReconcileOutcome::default();
        }

        let mut outcome = ReconcileOutcome {
            added,
            removed,
            rebuilt: false,
        };

        if self.entries.is_empty() {
            let mut names: Vec<String> = current.iter().cloned().collect();
            self.policy.sort(&mut names);
            self.entries = names.iter().map(|n| DbEntry::new(n)).collect();
            outcome.rebuilt = true;
            tracing::debug!(count = self.entries.len(), "database list built");
        } else {
            for name in &outcome.removed {
                // Entries dropped after a user removal are already gone.
                if let Some(pos) = self.position(name) {
                    self.entries.remove(pos);
                    tracing::debug!(db = %name, "database entry removed");
                }
            }
            for name in &outcome.added {
                if self.position(name).is_some() {
                    continue;
                }
                let idx = self.policy.insertion_index(&self.names(), name);
                self.entries.insert(idx, DbEntry::new(name));
                tracing::debug!(db = %name, index = idx, "database entry added");
            }
        }

        self.observed = current.clone();
        self.apply_running();
        outcome
    }

    /// Switches comparator or direction. Returns `true` if the list was
    /// reordered.
    pub fn set_policy(&mut self, policy: SortPolicy) -> bool {
        if policy == self.policy {
            return false;
        }
        self.policy = policy;
        self.entries.sort_by(|a, b| policy.compare(&a.name, &b.name));
        true
    }

    /// Records which database is running; its entry becomes unstartable.
    pub fn set_running(&mut self, running: Option<&str>) {
        self.running = running.map(str::to_string);
        self.apply_running();
    }

    /// Flags `name` as being removed. Returns `false` when it is unknown or
    /// already being removed, so a second click is ignored.
    pub fn mark_removing(&mut self, name: &str) -> bool {
        let Some(pos) = self.position(name) else {
            return false;
        };
        let entry = &mut self.entries[pos];
        if entry.removing {
            return false;
        }
        entry.removing = true;
        entry.startable = false;
        entry.label = format!("{name} (removing)");
        true
    }

    /// Reverts [`mark_removing`](Self::mark_removing) after a failed or
    /// cancelled removal.
    pub fn clear_removing(&mut self, name: &str) {
        if let Some(pos) = self.position(name) {
            let entry = &mut self.entries[pos];
            entry.removing = false;
            entry.label = entry.name.clone();
        }
        self.apply_running();
    }

    /// Drops `name` after a successful removal. It is also forgotten from the
    /// last observation so a container that survived is re-added next tick.
    pub fn remove_entry(&mut self, name: &str) -> bool {
        self.observed.remove(name);
        match self.position(name) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    fn apply_running(&mut self) {
        let running = self.running.as_deref();
        for entry in &mut self.entries {
            entry.startable = !entry.removing && Some(entry.name.as_str()) != running;
        }
    }
}
