//! Sample database schemas.
//!
//! A [`Schema`] is loaded once from its JSON definition and shared read-only
//! between gradings.

mod definition;
mod error;
mod model;

pub use definition::{ColumnDefinition, RowDefinition, SchemaDefinition, TableDefinition};
pub use error::{Result, SchemaError};
pub use model::{Column, Schema, Table};
