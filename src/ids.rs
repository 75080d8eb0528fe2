//! Event identifiers.

use crate::clock::DayKey;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};
use ulid::Ulid;

/// Opaque identifier of a single intake event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Wraps an existing identifier, e.g. one read back from storage.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministic id for the placeholder event synthesized from a totals-only day.
    #[must_use]
    pub fn import_for(day: DayKey) -> Self {
        Self(format!("import-{day}"))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces unique event identifiers.
pub trait IdGenerator: fmt::Debug + Send + Sync {
    /// Returns an identifier never returned before by this generator.
    fn next_id(&self) -> EventId;
}

/// Lexicographically time-ordered identifiers backed by ULIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UlidGenerator;

impl IdGenerator for UlidGenerator {
    fn next_id(&self) -> EventId {
        EventId(Ulid::new().to_string().to_lowercase())
    }
}

/// Predictable `<prefix>-<n>` identifiers, starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    /// Creates a generator whose ids look like `<prefix>-1`, `<prefix>-2`, ...
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> EventId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        EventId(format!("{}-{n}", self.prefix))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ulid_ids_are_unique() {
        let ids = UlidGenerator;
        let seen: HashSet<EventId> = (0..500).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 500);
    }

    #[test]
    fn test_sequential_ids_count_up() {
        let ids = SequentialIds::new("evt");
        assert_eq!(ids.next_id().as_str(), "evt-1");
        assert_eq!(ids.next_id().as_str(), "evt-2");
    }

    #[test]
    fn test_import_id_is_derived_from_day() {
        let day = DayKey::parse("2024-01-01").unwrap();
        assert_eq!(EventId::import_for(day), EventId::new("import-2024-01-01"));
    }
}
