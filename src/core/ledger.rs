//! Event-sourced daily ledger.
//!
//! Each calendar day holds an ordered list of intake events and a running total.
//! Removals are clamped to what the day actually holds *before* the event is
//! recorded, so the event log is always a truthful record of what happened to
//! the total and undo is a plain inverse of the last event.

use crate::{
    clock::{Clock, DayKey},
    ids::{EventId, IdGenerator},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};
use tracing::debug;

/// One intake (positive) or removal (negative) action. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    id: EventId,
    amount: i64,
    label: String,
    time: DateTime<Utc>,
}

impl Event {
    pub(crate) const fn new(id: EventId, amount: i64, label: String, time: DateTime<Utc>) -> Self {
        Self {
            id,
            amount,
            label,
            time,
        }
    }

    /// Unique identifier
    #[must_use]
    pub const fn id(&self) -> &EventId {
        &self.id
    }

    /// Applied delta in milliliters (already clamped for removals)
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// When the event was recorded
    #[must_use]
    pub const fn time(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Everything recorded for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    total: i64,
    events: Vec<Event>,
}

impl DayEntry {
    pub(crate) fn new(total: i64, events: Vec<Event>) -> Self {
        Self {
            total: total.max(0),
            events,
        }
    }

    /// Running total in milliliters, never negative
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.total
    }

    /// Events in the order they were recorded
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// True when the day carries neither events nor volume.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.total == 0
    }

    fn apply(&mut self, event: Event) {
        self.total = self.total.saturating_add(event.amount).max(0);
        self.events.push(event);
    }

    fn revert_last(&mut self) -> Option<Event> {
        let last = self.events.pop()?;
        self.total = self.total.saturating_sub(last.amount).max(0);
        Some(last)
    }
}

/// The canonical persisted state: day key to day entry.
///
/// Serializes as a JSON object keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct History(BTreeMap<DayKey, DayEntry>);

impl History {
    /// Entry for `day`, if present
    #[must_use]
    pub fn get(&self, day: DayKey) -> Option<&DayEntry> {
        self.0.get(&day)
    }

    /// Total for `day`, 0 if absent
    #[must_use]
    pub fn total_for(&self, day: DayKey) -> i64 {
        self.0.get(&day).map_or(0, DayEntry::total)
    }

    /// All stored days in ascending order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (DayKey, &DayEntry)> {
        self.0.iter().map(|(day, entry)| (*day, entry))
    }

    /// Number of stored days
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no day is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(DayKey, DayEntry)> for History {
    fn from_iter<T: IntoIterator<Item = (DayKey, DayEntry)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Normalizes an untrusted numeric amount: non-finite values become 0,
/// everything else is rounded to the nearest whole milliliter.
#[must_use]
// Cast safety: `as` saturates at the i64 bounds and the value is finite.
#[allow(clippy::cast_possible_truncation)]
pub fn coerce_amount(raw: f64) -> i64 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round() as i64
}

/// Default label for an event of `amount` milliliters.
#[must_use]
pub fn default_label(amount: i64) -> String {
    if amount < 0 {
        format!("Remove {} ml", amount.unsigned_abs())
    } else {
        format!("{amount} ml")
    }
}

/// Per-day intake ledger with add, remove, undo and reset.
///
/// The invariant `total >= 0` and "total equals the sum of applied deltas"
/// hold after every single operation.
#[derive(Debug, Clone)]
pub struct Ledger {
    history: History,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl Ledger {
    /// An empty ledger.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self::from_history(History::default(), clock, ids)
    }

    /// A ledger over already-migrated state.
    #[must_use]
    pub fn from_history(history: History, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            history,
            clock,
            ids,
        }
    }

    /// Read-only view of the full state
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Today's key according to the injected clock
    #[must_use]
    pub fn today(&self) -> DayKey {
        self.clock.today()
    }

    /// Records an intake (`amount >= 0`) or a removal (`amount < 0`) on `day`.
    ///
    /// A removal is clamped to the day's current total, an intake to what the
    /// total can still hold. When nothing can be removed the call is a no-op and
    /// returns `None`. An empty or missing
    /// label is replaced by [`default_label`] of the applied amount.
    pub fn record_intake(&mut self, day: DayKey, amount: i64, label: Option<&str>) -> Option<Event> {
        let current = self.history.total_for(day);
        let applied = if amount >= 0 {
            // Never more than the total can still hold.
            amount.min(i64::MAX - current)
        } else {
            let requested = amount.checked_neg().unwrap_or(i64::MAX);
            let can_remove = requested.min(current);
            if can_remove <= 0 {
                debug!(%day, requested, "Nothing to remove, ignoring removal");
                return None;
            }
            -can_remove
        };

        let label = label
            .filter(|l| !l.is_empty())
            .map_or_else(|| default_label(applied), ToOwned::to_owned);
        let event = Event::new(self.ids.next_id(), applied, label, self.clock.now());

        let entry = self.history.0.entry(day).or_default();
        entry.apply(event.clone());
        debug!(%day, amount = applied, total = entry.total, "Recorded intake event");

        Some(event)
    }

    /// Reverts the most recent event on `day`.
    ///
    /// Returns the removed event, or `None` if the day has no events. A day left
    /// with no events and a zero total is dropped from the ledger.
    pub fn undo_last(&mut self, day: DayKey) -> Option<Event> {
        let entry = self.history.0.get_mut(&day)?;
        let last = entry.revert_last()?;
        let total = entry.total;
        if entry.is_empty() {
            self.history.0.remove(&day);
        }
        debug!(%day, undone = last.amount, total, "Undid last event");
        Some(last)
    }

    /// Discards the whole day, including its event history. Cannot be undone.
    pub fn reset_day(&mut self, day: DayKey) -> Option<DayEntry> {
        let removed = self.history.0.remove(&day);
        if let Some(entry) = &removed {
            debug!(%day, total = entry.total, events = entry.events.len(), "Reset day");
        }
        removed
    }

    /// Copy of the entry for `day`; an empty entry if the day is absent.
    #[must_use]
    pub fn get_day(&self, day: DayKey) -> DayEntry {
        self.history.get(day).cloned().unwrap_or_default()
    }

    /// Every day currently present.
    #[must_use]
    pub fn all_days(&self) -> BTreeSet<DayKey> {
        self.history.0.keys().copied().collect()
    }
}
