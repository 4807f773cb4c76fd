//! Tracking the checked-out MyGeotab release.

/// Config-key form of a release: `.`, `/` and spaces become `_`.
pub fn release_key(release: &str) -> String {
    release
        .chars()
        .map(|c| if matches!(c, '.' | '/' | ' ') { '_' } else { c })
        .collect()
}

/// Config key holding the database configured for `release`.
pub fn db_for_release_key(release: &str) -> String {
    format!("DB_FOR_RELEASE_{}", release_key(release))
}

/// Suggests a database for `release` when none is configured: the shortest
/// name containing the release with dots as underscores.
pub fn best_db_for_release<'a, I>(names: I, release: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    if release.is_empty() {
        return None;
    }
    let needle = release.replace('.', "_");
    names
        .into_iter()
        .filter(|name| name.contains(&needle))
        .min_by_key(|name| name.len())
        .map(str::to_string)
}

/// A checkout switched from `previous` to `current`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseChange {
    pub current: String,
    pub previous: String,
}

/// Remembers the last known release and reports switches.
///
/// Empty observations (failed `geo dev release`) are ignored, so a
/// transient failure between two releases still yields one change.
#[derive(Debug, Default)]
pub struct ReleaseTracker {
    current: String,
}

impl ReleaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        (!self.current.is_empty()).then_some(self.current.as_str())
    }

    pub fn observe(&mut self, release: &str) -> Option<ReleaseChange> {
        let release = release.trim();
        if release.is_empty() || release == self.current {
            return None;
        }
        let previous = std::mem::replace(&mut self.current, release.to_string());
        if previous.is_empty() {
            tracing::debug!(release, "initial MyGeotab release");
            return None;
        }
        tracing::info!(from = %previous, to = %release, "MyGeotab release changed");
        Some(ReleaseChange {
            current: release.to_string(),
            previous,
        })
    }
}
