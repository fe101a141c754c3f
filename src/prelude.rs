//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::adapter::{RelationalAdapter, SelectOptions, SybaseAdapter, Transaction};
pub use crate::client::{TdsClient, TdsConnector};
pub use crate::config::{SybaseOptions, SybaseOptionsBuilder};
pub use crate::dialect::ColumnType;
pub use crate::error::SybaseDbError;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::schema::{Column, IndexDefinition, SchemaDump, TableDefinition};
pub use crate::statements::{ColumnSpec, CreateTableOptions};
pub use crate::types::RowValues;

#[cfg(feature = "tds")]
pub use crate::sybase::{TiberiusClient, TiberiusConnector, create_sybase_client};
