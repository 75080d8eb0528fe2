//! Shared test utilities.
//!
//! Helpers for building ledgers on a pinned clock, in-memory databases and a
//! store that always fails.

use crate::{
    clock::{Clock, DayKey, FixedClock},
    core::ledger::Ledger,
    errors::{Error, Result},
    ids::SequentialIds,
    store::Store,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber, defaulting to TRACE when `RUST_LOG` is unset.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Parses a day key, panicking on bad test input.
#[allow(clippy::expect_used)]
pub fn day(value: &str) -> DayKey {
    DayKey::parse(value).expect("valid test day key")
}

/// A clock pinned to noon UTC on `today`.
pub fn fixed_clock(today: &str) -> Arc<dyn Clock> {
    Arc::new(FixedClock::on(day(today)))
}

/// An empty ledger whose clock says `today` and whose ids are `evt-1`, `evt-2`, ...
pub fn test_ledger(today: &str) -> Ledger {
    Ledger::new(fixed_clock(today), Arc::new(SequentialIds::new("evt")))
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A store whose every call fails, for exercising the recovery paths.
#[derive(Debug)]
pub struct FailingStore;

impl Store for FailingStore {
    async fn load(&self) -> Result<Option<Value>> {
        Err(Error::Storage {
            message: "disk unavailable".to_string(),
        })
    }

    async fn save(&self, _document: &Value) -> Result<()> {
        Err(Error::Storage {
            message: "disk unavailable".to_string(),
        })
    }
}
