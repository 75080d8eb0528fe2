//! Report generation business logic.
//!
//! Read-only views derived from the ledger: today's progress toward the goal,
//! a fixed-length trailing series for charts, and the rows of the history
//! table. Nothing here mutates state.

use crate::{
    clock::DayKey,
    core::{goal::Goal, ledger::History},
};
use std::iter;

/// Longest trailing series the CLI will ask for (about ten years).
pub const MAX_TRAILING_DAYS: usize = 3660;

/// One point of the trailing series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    /// Calendar day
    pub date: DayKey,
    /// Total for that day, 0 when nothing was recorded
    pub amount: i64,
}

/// One row of the history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRow {
    /// Calendar day
    pub date: DayKey,
    /// Total for that day
    pub total: i64,
    /// Share of the goal in percent; not capped, may exceed 100
    pub share_percent: u64,
}

/// `round(total / goal * 100)` with integer arithmetic, half rounding up.
fn share_of_goal(total: i64, goal: Goal) -> u64 {
    let total = u128::from(total.max(0).unsigned_abs());
    let goal = u128::from(goal.ml());
    let percent = (total * 200 + goal) / (goal * 2);
    u64::try_from(percent).unwrap_or(u64::MAX)
}

/// Progress toward the goal on `today`, capped at 100.
#[must_use]
pub fn today_progress(history: &History, today: DayKey, goal: Goal) -> u8 {
    let percent = share_of_goal(history.total_for(today), goal).min(100);
    u8::try_from(percent).unwrap_or(100)
}

/// True once today's total has reached the goal.
#[must_use]
pub fn goal_reached(history: &History, today: DayKey, goal: Goal) -> bool {
    history.total_for(today) >= i64::from(goal.ml())
}

/// The `days` calendar days ending at `reference`, oldest first.
///
/// Yields exactly `days` entries, using 0 for days with no entry, as long as
/// the window does not reach back past the first date chrono supports. Such a
/// window is cut at that date. Callers taking `days` from user input should
/// cap it at [`MAX_TRAILING_DAYS`] first, since the result is allocated up front.
#[must_use]
pub fn trailing_days(history: &History, days: usize, reference: DayKey) -> Vec<DailyTotal> {
    let mut series: Vec<DailyTotal> = iter::successors(Some(reference), |d| d.previous())
        .take(days)
        .map(|date| DailyTotal {
            date,
            amount: history.total_for(date),
        })
        .collect();
    series.reverse();
    series
}

/// Every stored day, newest first, with its share of the goal.
#[must_use]
pub fn history_rows(history: &History, goal: Goal) -> Vec<HistoryRow> {
    history
        .iter()
        .rev()
        .map(|(date, entry)| HistoryRow {
            date,
            total: entry.total(),
            share_percent: share_of_goal(entry.total(), goal),
        })
        .collect()
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80%`
#[must_use]
pub fn format_progress_bar(progress_percent: u8, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = usize::from(progress_percent.min(100));
    let filled = (clamped * length + 50) / 100;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

/// Formats milliliters as liters with two decimals, e.g. `"1.25 L"`.
#[must_use]
pub fn format_liters(ml: i64) -> String {
    let sign = if ml < 0 { "-" } else { "" };
    let centiliters = (ml.unsigned_abs() + 5) / 10;
    format!("{sign}{}.{:02} L", centiliters / 100, centiliters % 100)
}

/// Formats an event amount with an explicit sign, e.g. `"+250 ml"`.
#[must_use]
pub fn format_event_amount(amount: i64) -> String {
    if amount >= 0 {
        format!("+{amount} ml")
    } else {
        format!("-{} ml", amount.unsigned_abs())
    }
}
