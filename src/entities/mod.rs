//! Entity module - Contains the SeaORM entity definitions for the database.

pub mod stored_value;

pub use stored_value::{
    Column as StoredValueColumn, Entity as StoredValue, Model as StoredValueModel,
};
