//! Sybase dialect and catalog adapter.
//!
//! [`SybaseAdapter`] implements the uniform [`RelationalAdapter`] interface on
//! top of a single TDS connection: schema introspection through the system
//! catalog, DDL in the Sybase dialect, literal quoting, transaction verbs, and
//! result coercion. Network I/O is delegated to a [`TdsClient`]; the `tds`
//! feature provides one backed by tiberius.
//!
//! ```rust,no_run
//! use sybase_middleware::prelude::*;
//!
//! # async fn demo() -> Result<(), SybaseDbError> {
//! let options = SybaseOptions::builder(
//!     "dbhost".into(),
//!     "inventory".into(),
//!     "sa".into(),
//!     "secret".into(),
//! )
//! .finish();
//! let mut adapter = SybaseAdapter::connect_tds(options).await?;
//! for column in adapter.columns("items").await? {
//!     println!("{} {}", column.name, column.sql_type);
//! }
//! adapter.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod catalog;
pub mod client;
pub mod config;
pub mod dialect;
pub mod error;
pub mod prelude;
pub mod quoting;
pub mod results;
pub mod schema;
pub mod statements;
#[cfg(feature = "tds")]
pub mod sybase;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

pub use adapter::{RelationalAdapter, SelectOptions, SybaseAdapter, Transaction};
pub use client::{TdsClient, TdsConnector};
pub use config::{SybaseOptions, SybaseOptionsBuilder};
pub use error::SybaseDbError;
pub use results::{CustomDbRow, ResultSet};
pub use schema::{Column, IndexDefinition, SchemaDump, TableDefinition};
pub use types::RowValues;
