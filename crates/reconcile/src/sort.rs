//! Ordering of database names in the menu.
//!
//! Database containers are usually named after the MyGeotab release they
//! were created for (`9_7`, `10_1`), with an occasional free-form name.
//! The release-aware order puts genuine release numbers first (by numeric
//! value), then numbers that are unlikely to be releases, then everything
//! else.

use std::cmp::Ordering;

/// How names are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    Lexical,
    #[default]
    Release,
}

impl SortMode {
    /// Value persisted in the geo-cli config.
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Lexical => "lexical",
            SortMode::Release => "release",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lexical" => Some(SortMode::Lexical),
            "release" => Some(SortMode::Release),
            _ => None,
        }
    }
}

/// Active comparator plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortPolicy {
    pub mode: SortMode,
    pub descending: bool,
}

impl Default for SortPolicy {
    fn default() -> Self {
        Self {
            mode: SortMode::Release,
            descending: true,
        }
    }
}

impl SortPolicy {
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let ord = match self.mode {
            SortMode::Lexical => a.cmp(b),
            SortMode::Release => compare_release(a, b),
        };
        if self.descending { ord.reverse() } else { ord }
    }

    pub fn sort(&self, names: &mut [String]) {
        names.sort_by(|a, b| self.compare(a, b));
    }

    /// Index at which `name` belongs in the already sorted `sorted`.
    ///
    /// A linear scan: the lists are a handful of entries long.
    pub fn insertion_index<S: AsRef<str>>(&self, sorted: &[S], name: &str) -> usize {
        sorted
            .iter()
            .position(|existing| self.compare(existing.as_ref(), name) == Ordering::Greater)
            .unwrap_or(sorted.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Text,
    Noise,
    Version,
}

/// Parses the leading `digits([._]digits)*` token after stripping leading
/// zeros. Components too large for `u64` saturate.
fn numeric_parts(name: &str) -> Vec<u64> {
    let s = name.trim_start_matches('0').as_bytes();
    let mut parts = Vec::new();
    let mut i = 0;
    loop {
        let start = i;
        while i < s.len() && s[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            break;
        }
        let digits = std::str::from_utf8(&s[start..i]).unwrap_or_default();
        parts.push(digits.parse::<u64>().unwrap_or(u64::MAX));

        let more = i + 1 < s.len() && (s[i] == b'.' || s[i] == b'_') && s[i + 1].is_ascii_digit();
        if !more {
            break;
        }
        i += 1;
    }
    parts
}

/// Leading numbers that do not look like MyGeotab releases: very small
/// ones, the 60-99 band used by older numbering schemes, and year-like or
/// larger values.
fn is_noise(major: u64) -> bool {
    major < 5 || (60..=99).contains(&major) || major >= 1000
}

fn classify(name: &str) -> (Class, Vec<u64>) {
    let parts = numeric_parts(name);
    match parts.first() {
        None => (Class::Text, parts),
        Some(&major) if is_noise(major) => (Class::Noise, parts),
        Some(_) => (Class::Version, parts),
    }
}

/// Release-aware ascending comparison.
///
/// `Text < Noise < Version`; within a class numeric components compare
/// left to right; ties fall back to plain string comparison.
pub fn compare_release(a: &str, b: &str) -> Ordering {
    let (class_a, parts_a) = classify(a);
    let (class_b, parts_b) = classify(b);
    class_a
        .cmp(&class_b)
        .then_with(|| parts_a.cmp(&parts_b))
        .then_with(|| a.cmp(b))
}
