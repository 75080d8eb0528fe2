//! Core business logic - framework-agnostic ledger, migration and reporting.

/// Daily goal value type
pub mod goal;
/// Event-sourced per-day ledger
pub mod ledger;
/// Migration of older persisted shapes
pub mod migration;
/// Read-only progress and history views
pub mod report;
/// Session owning ledger, goal and store
pub mod tracker;

pub use goal::Goal;
pub use ledger::{DayEntry, Event, History, Ledger};
pub use tracker::Tracker;
