//! One poll's view of the database containers.

use std::collections::BTreeSet;

/// Container names and the running one, as observed in a single tick.
///
/// Empty shell output produces an empty snapshot: a failed `docker` call
/// is indistinguishable from "no containers, nothing running".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSetSnapshot {
    pub names: BTreeSet<String>,
    pub running: Option<String>,
}

impl ContainerSetSnapshot {
    pub fn new<I, S>(names: I, running: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let running = running.trim();
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.is_empty())
                .collect(),
            running: (!running.is_empty()).then(|| running.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.running.is_none()
    }

    /// Running container name, `""` when none.
    pub fn running_name(&self) -> &str {
        self.running.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_dropped() {
        let snap = ContainerSetSnapshot::new(["9_7", "", "81"], "");
        assert_eq!(snap.names.len(), 2);
        assert_eq!(snap.running, None);
        assert!(!snap.is_empty());
    }

    #[test]
    fn default_is_empty() {
        let snap = ContainerSetSnapshot::default();
        assert!(snap.is_empty());
        assert_eq!(snap.running_name(), "");
    }

    #[test]
    fn running_name_is_exposed() {
        let snap = ContainerSetSnapshot::new(["9_7"], "9_7\n");
        assert_eq!(snap.running.as_deref(), Some("9_7"));
        assert_eq!(snap.running_name(), "9_7");
    }
}
