//! Migration of persisted history into the canonical ledger shape.
//!
//! Older writers stored a day as a bare number (total only), as
//! `{amount, events}`, or as the current `{total, events}`. Everything is read
//! leniently and normalized:
//!
//! - a bare number becomes the day total; a positive total also gets one
//!   placeholder [`IMPORT_LABEL`] event whose id is derived from the date, so
//!   migrating the same input twice never duplicates events
//! - `{total, events}` and `{amount, events}` keep their events
//! - anything else is coerced to a number where possible, `0` otherwise
//!
//! Migration is pure and idempotent: feeding the serialized output back in
//! yields the same history.

use crate::{
    clock::DayKey,
    core::{
        goal::Goal,
        ledger::{DayEntry, Event, History, coerce_amount, default_label},
    },
    ids::EventId,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Label of the placeholder event synthesized for totals-only days.
pub const IMPORT_LABEL: &str = "Import";

/// Converts a raw persisted history object into canonical state.
///
/// Keys that are not `YYYY-MM-DD` dates are dropped. A non-object input yields
/// an empty history.
#[must_use]
pub fn migrate_history(raw: &Value) -> History {
    let Some(days) = raw.as_object() else {
        if !raw.is_null() {
            warn!(kind = value_kind(raw), "Stored history is not an object, starting empty");
        }
        return History::default();
    };

    let history: History = days
        .iter()
        .filter_map(|(key, value)| match DayKey::parse(key) {
            Ok(day) => Some((day, migrate_day(day, value))),
            Err(_) => {
                warn!(key = %key, "Dropping history entry with an invalid date key");
                None
            }
        })
        .collect();
    debug!(days = history.len(), "Migrated stored history");
    history
}

/// Lifts a full persisted document `{goal, history}` into a goal and history.
///
/// A missing or invalid goal falls back to `default_goal`.
#[must_use]
pub fn migrate_document(raw: &Value, default_goal: Goal) -> (Goal, History) {
    let goal = Goal::from_value(raw.get("goal"), default_goal);
    let history = raw
        .get("history")
        .map_or_else(History::default, migrate_history);
    (goal, history)
}

fn migrate_day(day: DayKey, value: &Value) -> DayEntry {
    match value {
        Value::Number(_) => {
            let total = coerce_value(value).max(0);
            let events = if total > 0 {
                vec![import_event(day, total)]
            } else {
                Vec::new()
            };
            DayEntry::new(total, events)
        }
        // `{amount, events}` keeps its data instead of being coerced to an empty day.
        Value::Object(fields) => logged_entry(day, fields, "total")
            .or_else(|| logged_entry(day, fields, "amount"))
            .unwrap_or_else(|| {
                warn!(%day, "Unrecognized day entry shape, treating as empty");
                DayEntry::default()
            }),
        other => DayEntry::new(coerce_value(other).max(0), Vec::new()),
    }
}

/// Reads `{<total_field>: number, events: [...]}`, or `None` if the shape does not match.
fn logged_entry(day: DayKey, fields: &Map<String, Value>, total_field: &str) -> Option<DayEntry> {
    let total = fields.get(total_field)?.as_f64()?;
    let events = fields.get("events")?.as_array()?;
    let events = events
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| migrate_event(day, index, raw))
        .collect();
    Some(DayEntry::new(coerce_amount(total), events))
}

fn migrate_event(day: DayKey, index: usize, raw: &Value) -> Option<Event> {
    let Value::Object(fields) = raw else {
        warn!(%day, index, "Dropping malformed event");
        return None;
    };

    let amount = fields.get("amount").map_or(0, coerce_value);
    let id = match fields.get("id") {
        Some(Value::String(id)) if !id.is_empty() => EventId::new(id.clone()),
        Some(Value::Number(id)) => EventId::new(id.to_string()),
        _ => EventId::new(format!("{day}-{index}")),
    };
    let label = match fields.get("label") {
        Some(Value::String(label)) if !label.is_empty() => label.clone(),
        _ => default_label(amount),
    };
    let time = fields
        .get("time")
        .and_then(Value::as_str)
        .and_then(parse_time)
        .unwrap_or_else(|| day.start_of_day_utc());

    Some(Event::new(id, amount, label, time))
}

fn import_event(day: DayKey, total: i64) -> Event {
    Event::new(
        EventId::import_for(day),
        total,
        IMPORT_LABEL.to_string(),
        day.start_of_day_utc(),
    )
}

/// Accepts RFC 3339 timestamps and bare dates (older placeholder events).
fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| DayKey::parse(raw).ok().map(DayKey::start_of_day_utc))
}

/// Best-effort numeric reading of an arbitrary JSON value.
fn coerce_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_f64().map_or(0, coerce_amount),
        Value::String(s) => s.trim().parse::<f64>().map_or(0, coerce_amount),
        Value::Bool(b) => i64::from(*b),
        Value::Null | Value::Array(_) | Value::Object(_) => 0,
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
