//! Stored value entity - A key-value table holding persisted documents.
//!
//! The tracker keeps its whole `{goal, history}` document as JSON text under a
//! single key. Older app versions wrote history and goal under separate keys;
//! those rows are read once during migration and left untouched.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored value database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Storage key (e.g., `"hydration_tracker_v1"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Stored value, JSON text
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this value was last written
    pub updated_at: DateTime,
}

/// `StoredValue` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
