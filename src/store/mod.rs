//! Persistence gateway.
//!
//! The ledger is persisted as one JSON document (`{goal, history}`) behind a
//! plain load/save interface. Callers treat failures as non-fatal.

pub mod database;
pub mod memory;

pub use database::DatabaseStore;
pub use memory::MemoryStore;

use crate::{config::AppConfig, errors::Result};
use serde_json::Value;
use std::future::Future;
use tracing::error;

/// Key-value style storage for the whole persisted document.
pub trait Store: Send + Sync {
    /// Reads the stored document, `None` if nothing has been saved yet.
    fn load(&self) -> impl Future<Output = Result<Option<Value>>> + Send;

    /// Replaces the stored document.
    fn save(&self, document: &Value) -> impl Future<Output = Result<()>> + Send;
}

/// The store a process session runs on.
#[derive(Debug)]
pub enum SessionStore {
    /// The configured database
    Database(DatabaseStore),
    /// Fallback when the database cannot be opened; nothing outlives the process
    Memory(MemoryStore),
}

impl SessionStore {
    /// Opens the configured database.
    ///
    /// A failure is logged and the session continues on an empty in-memory
    /// store, so the tracker still starts with the default goal.
    pub async fn open(config: &AppConfig) -> Self {
        match DatabaseStore::connect(config).await {
            Ok(store) => Self::Database(store),
            Err(e) => {
                error!("Failed to open database, changes will only be kept in memory: {e}");
                Self::Memory(MemoryStore::new())
            }
        }
    }

    /// False when running on the in-memory fallback.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl Store for SessionStore {
    async fn load(&self) -> Result<Option<Value>> {
        match self {
            Self::Database(store) => store.load().await,
            Self::Memory(store) => store.load().await,
        }
    }

    async fn save(&self, document: &Value) -> Result<()> {
        match self {
            Self::Database(store) => store.save(document).await,
            Self::Memory(store) => store.save(document).await,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{Goal, Tracker},
        ids::SequentialIds,
        test_utils::{fixed_clock, init_test_tracing},
    };
    use serde_json::json;
    use std::sync::Arc;

    fn config_with_url(database_url: String) -> AppConfig {
        AppConfig {
            database_url,
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_open_uses_database_when_available() {
        let store = SessionStore::open(&config_with_url("sqlite::memory:".to_string())).await;

        assert!(store.is_persistent());
        store.save(&json!({"goal": 1800})).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(json!({"goal": 1800})));
    }

    #[tokio::test]
    async fn test_unopenable_database_falls_back_to_memory() {
        init_test_tracing();
        // A regular file cannot be the parent directory of the database.
        let file = tempfile::NamedTempFile::new().unwrap();
        let url = format!("sqlite://{}/nested/db.sqlite?mode=rwc", file.path().display());

        let store = SessionStore::open(&config_with_url(url)).await;
        assert!(!store.is_persistent());

        let mut tracker = Tracker::load(
            store,
            fixed_clock("2024-01-02"),
            Arc::new(SequentialIds::new("evt")),
            Goal::default(),
        )
        .await;
        assert!(tracker.ledger().history().is_empty());
        assert_eq!(tracker.goal(), Goal::default());

        tracker.record_intake(250, None).await.unwrap();
        assert!(tracker.save().await);
        assert_eq!(tracker.today_entry().total(), 250);
    }
}
