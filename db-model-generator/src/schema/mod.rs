//! Database schema introspection

mod metadata;
mod reader;
mod target;

pub use metadata::*;
pub use reader::{ColumnSource, SchemaReader};
pub use target::{normalize_database_url, ConnectionTarget};
