//! In-process store, used by tests and dry runs.

use crate::{
    errors::{Error, Result},
    store::Store,
};
use serde_json::Value;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// Keeps the last saved document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<Value>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with `document`, as if a previous session had saved it.
    #[must_use]
    pub fn with_document(document: Value) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            saves: AtomicUsize::new(0),
        }
    }

    /// The currently stored document.
    pub fn document(&self) -> Result<Option<Value>> {
        self.document
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| Error::Storage {
                message: "Failed to acquire memory store lock".to_string(),
            })
    }

    /// How many times [`Store::save`] succeeded.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

impl Store for MemoryStore {
    async fn load(&self) -> Result<Option<Value>> {
        self.document()
    }

    async fn save(&self, document: &Value) -> Result<()> {
        let mut slot = self.document.lock().map_err(|_| Error::Storage {
            message: "Failed to acquire memory store lock".to_string(),
        })?;
        *slot = Some(document.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_round_trip() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.load().await?.is_none());

        store.save(&json!({"goal": 2000})).await?;
        store.save(&json!({"goal": 2500})).await?;

        assert_eq!(store.load().await?, Some(json!({"goal": 2500})));
        assert_eq!(store.save_count(), 2);
        Ok(())
    }
}
