//! Tracker session - the process-wide owner of ledger, goal and store.
//!
//! Loading runs migration once on whatever the store holds. Every mutation is
//! applied to the in-memory ledger first and then the full `{goal, history}`
//! document is saved. Persistence failures are logged and swallowed: the
//! in-memory ledger stays the source of truth for the rest of the session.

use crate::{
    clock::{Clock, DayKey},
    core::{
        goal::Goal,
        ledger::{DayEntry, Event, History, Ledger},
        migration::migrate_document,
        report::{self, DailyTotal, HistoryRow},
    },
    errors::Result,
    ids::IdGenerator,
    store::Store,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Shape of the persisted document.
#[derive(Serialize)]
struct Document<'a> {
    goal: Goal,
    history: &'a History,
}

/// A loaded tracker bound to its store.
#[derive(Debug)]
pub struct Tracker<S: Store> {
    ledger: Ledger,
    goal: Goal,
    store: S,
}

impl<S: Store> Tracker<S> {
    /// Loads and migrates the stored document.
    ///
    /// A missing document starts an empty ledger; a failed load does the same
    /// after logging the error. `default_goal` applies when no valid goal is stored.
    pub async fn load(
        store: S,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        default_goal: Goal,
    ) -> Self {
        let (goal, history) = match store.load().await {
            Ok(Some(raw)) => migrate_document(&raw, default_goal),
            Ok(None) => {
                info!("No stored tracker data, starting fresh");
                (default_goal, History::default())
            }
            Err(e) => {
                error!("Failed to load tracker data, starting with an empty ledger: {e}");
                (default_goal, History::default())
            }
        };
        info!(days = history.len(), goal = goal.ml(), "Tracker loaded");

        Self {
            ledger: Ledger::from_history(history, clock, ids),
            goal,
            store,
        }
    }

    /// Read-only access to the ledger
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Current daily goal
    #[must_use]
    pub const fn goal(&self) -> Goal {
        self.goal
    }

    /// The backing store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Today's key according to the session clock
    #[must_use]
    pub fn today(&self) -> DayKey {
        self.ledger.today()
    }

    /// Records an intake (or a removal, for negative amounts) for today.
    pub async fn record_intake(&mut self, amount: i64, label: Option<&str>) -> Option<Event> {
        let today = self.today();
        self.record_intake_on(today, amount, label).await
    }

    /// Records an intake on an explicit day.
    pub async fn record_intake_on(
        &mut self,
        day: DayKey,
        amount: i64,
        label: Option<&str>,
    ) -> Option<Event> {
        let event = self.ledger.record_intake(day, amount, label)?;
        self.save().await;
        Some(event)
    }

    /// Reverts today's most recent event.
    pub async fn undo_last(&mut self) -> Option<Event> {
        let today = self.today();
        let event = self.ledger.undo_last(today)?;
        self.save().await;
        Some(event)
    }

    /// Discards everything recorded today.
    pub async fn reset_today(&mut self) -> Option<DayEntry> {
        let today = self.today();
        let removed = self.ledger.reset_day(today)?;
        self.save().await;
        Some(removed)
    }

    /// Replaces the daily goal.
    pub async fn set_goal(&mut self, goal: Goal) {
        self.goal = goal;
        info!(goal = goal.ml(), "Daily goal updated");
        self.save().await;
    }

    /// The document that [`Tracker::save`] writes.
    pub fn snapshot(&self) -> Result<Value> {
        let document = Document {
            goal: self.goal,
            history: self.ledger.history(),
        };
        Ok(serde_json::to_value(&document)?)
    }

    /// Writes the full snapshot. Returns `false` if it could not be persisted.
    pub async fn save(&self) -> bool {
        let outcome = match self.snapshot() {
            Ok(document) => self.store.save(&document).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save tracker data, keeping changes in memory only: {e}");
                false
            }
        }
    }

    /// Copy of today's entry
    #[must_use]
    pub fn today_entry(&self) -> DayEntry {
        self.ledger.get_day(self.today())
    }

    /// Today's progress toward the goal, 0..=100
    #[must_use]
    pub fn today_progress(&self) -> u8 {
        report::today_progress(self.ledger.history(), self.today(), self.goal)
    }

    /// The last `days` days ending today, oldest first
    #[must_use]
    pub fn trailing_days(&self, days: usize) -> Vec<DailyTotal> {
        report::trailing_days(self.ledger.history(), days, self.today())
    }

    /// Every stored day, newest first
    #[must_use]
    pub fn history_rows(&self) -> Vec<HistoryRow> {
        report::history_rows(self.ledger.history(), self.goal)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        ids::SequentialIds,
        store::MemoryStore,
        test_utils::*,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn tracker_with(store: MemoryStore) -> Tracker<MemoryStore> {
        Tracker::load(
            store,
            fixed_clock("2024-01-02"),
            Arc::new(SequentialIds::new("evt")),
            Goal::default(),
        )
        .await
    }

    #[tokio::test]
    async fn test_load_migrates_stored_document() {
        init_test_tracing();
        let store = MemoryStore::with_document(json!({
            "goal": 2500,
            "history": {"2024-01-01": 500, "2024-01-02": {"total": 250, "events": []}}
        }));

        let tracker = tracker_with(store).await;

        assert_eq!(tracker.goal().ml(), 2500);
        assert_eq!(tracker.today_entry().total(), 250);
        assert_eq!(tracker.ledger().all_days().len(), 2);
        // Loading alone never writes.
        assert_eq!(tracker.store().save_count(), 0);
    }

    #[tokio::test]
    async fn test_every_mutation_is_saved() {
        let mut tracker = tracker_with(MemoryStore::new()).await;

        tracker.record_intake(250, Some("Glass")).await.unwrap();
        assert_eq!(tracker.store().save_count(), 1);

        tracker.record_intake(-100, None).await.unwrap();
        tracker.undo_last().await.unwrap();
        tracker.set_goal(Goal::from_ml(1800).unwrap()).await;
        assert_eq!(tracker.store().save_count(), 4);

        let saved = tracker.store().document().unwrap().unwrap();
        assert_eq!(saved, tracker.snapshot().unwrap());
        assert_eq!(saved["goal"], json!(1800));
        assert_eq!(saved["history"]["2024-01-02"]["total"], json!(250));
        assert_eq!(saved["history"]["2024-01-02"]["events"][0]["label"], json!("Glass"));
    }

    #[tokio::test]
    async fn test_noops_do_not_save() {
        let mut tracker = tracker_with(MemoryStore::new()).await;

        assert!(tracker.record_intake(-50, None).await.is_none());
        assert!(tracker.undo_last().await.is_none());
        assert!(tracker.reset_today().await.is_none());

        assert_eq!(tracker.store().save_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_today_persists_removal() {
        let mut tracker = tracker_with(MemoryStore::new()).await;
        tracker.record_intake(250, None).await;
        tracker.record_intake_on(day("2024-01-01"), 900, None).await;

        let removed = tracker.reset_today().await.unwrap();

        assert_eq!(removed.total(), 250);
        let saved = tracker.store().document().unwrap().unwrap();
        assert_eq!(saved["history"], json!({
            "2024-01-01": {"total": 900, "events": [{
                "id": "evt-2", "amount": 900, "label": "900 ml", "time": "2024-01-02T12:00:00Z"
            }]}
        }));
    }

    #[tokio::test]
    async fn test_failed_load_starts_empty() {
        init_test_tracing();
        let tracker = Tracker::load(
            FailingStore,
            fixed_clock("2024-01-02"),
            Arc::new(SequentialIds::new("evt")),
            Goal::from_ml(1500).unwrap(),
        )
        .await;

        assert!(tracker.ledger().history().is_empty());
        assert_eq!(tracker.goal().ml(), 1500);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_state() {
        let mut tracker = Tracker::load(
            FailingStore,
            fixed_clock("2024-01-02"),
            Arc::new(SequentialIds::new("evt")),
            Goal::default(),
        )
        .await;

        let event = tracker.record_intake(300, None).await;

        assert!(event.is_some());
        assert!(!tracker.save().await);
        assert_eq!(tracker.today_entry().total(), 300);
        assert_eq!(tracker.today_progress(), 15);
    }

    #[tokio::test]
    async fn test_read_views() {
        let mut tracker = tracker_with(MemoryStore::new()).await;
        tracker.record_intake(1000, None).await;
        tracker.record_intake_on(day("2023-12-30"), 2500, None).await;

        assert_eq!(tracker.today_progress(), 50);

        let series = tracker.trailing_days(4);
        let amounts: Vec<i64> = series.iter().map(|d| d.amount).collect();
        assert_eq!(amounts, vec![2500, 0, 0, 1000]);

        let rows = tracker.history_rows();
        assert_eq!(rows[0].date, day("2024-01-02"));
        assert_eq!(rows[1].share_percent, 125);
    }
}
