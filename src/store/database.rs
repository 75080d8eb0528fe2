//! SQLite-backed store using the `storage` key-value table.

use crate::{
    config::{AppConfig, database},
    entities::{StoredValue, stored_value},
    errors::Result,
    store::Store,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

/// Key the older app used for the bare history object.
pub const LEGACY_HISTORY_KEY: &str = "hydration-history";
/// Key the older app used for the goal.
pub const LEGACY_GOAL_KEY: &str = "hydration-goal";

/// Persists the tracker document as JSON text under one key.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
    key: String,
}

impl DatabaseStore {
    /// Wraps an open connection whose tables already exist.
    pub fn new(db: DatabaseConnection, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    /// Opens the configured database, creating the tables if needed.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let db = database::create_connection(&config.database_url).await?;
        database::create_tables(&db).await?;
        info!(key = %config.storage_key, "Database store ready");
        Ok(Self::new(db, config.storage_key.clone()))
    }

    /// Builds `{goal, history}` from the separate keys written by the older app.
    async fn load_legacy(&self) -> Result<Option<Value>> {
        let history = get_value(&self.db, LEGACY_HISTORY_KEY).await?;
        let goal = get_value(&self.db, LEGACY_GOAL_KEY).await?;
        if history.is_none() && goal.is_none() {
            return Ok(None);
        }

        let mut document = Map::new();
        if let Some(raw) = history {
            document.insert("history".to_string(), serde_json::from_str(&raw)?);
        }
        if let Some(raw) = goal {
            // The old app stored the goal as bare text, which may not be valid JSON.
            let goal = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            document.insert("goal".to_string(), goal);
        }
        info!("Loaded tracker data from legacy storage keys");
        Ok(Some(Value::Object(document)))
    }
}

impl Store for DatabaseStore {
    #[instrument(skip(self), fields(key = %self.key))]
    async fn load(&self) -> Result<Option<Value>> {
        match get_value(&self.db, &self.key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => self.load_legacy().await,
        }
    }

    #[instrument(skip(self, document), fields(key = %self.key))]
    async fn save(&self, document: &Value) -> Result<()> {
        let raw = serde_json::to_string(document)?;
        set_value(&self.db, &self.key, raw).await
    }
}

/// Retrieves a value from the `storage` table, `None` if the key does not exist.
pub async fn get_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let row = StoredValue::find()
        .filter(stored_value::Column::Key.eq(key))
        .one(db)
        .await?;
    debug!(key, found = row.is_some(), "Read stored value");
    Ok(row.map(|r| r.value))
}

/// Sets or replaces the value stored under `key`.
pub async fn set_value<C>(db: &C, key: &str, value: String) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let existing = StoredValue::find()
        .filter(stored_value::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(row) = existing {
        let mut active_model: stored_value::ActiveModel = row.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_row = stored_value::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        };
        new_row.insert(db).await?;
    }

    debug!(key, "Stored value written");
    Ok(())
}
