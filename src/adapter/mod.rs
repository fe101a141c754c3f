//! The uniform relational-adapter interface and its Sybase implementation.

mod sybase;
mod transaction;

use async_trait::async_trait;

use crate::error::SybaseDbError;
use crate::results::{CustomDbRow, ResultSet};
use crate::schema::{Column, IndexDefinition};
use crate::statements::{ColumnSpec, CreateTableOptions};
use crate::types::RowValues;

pub use sybase::SybaseAdapter;
pub use transaction::Transaction;

/// Row window for [`RelationalAdapter::select_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectOptions {
    pub limit: Option<usize>,
    pub offset: usize,
}

impl SelectOptions {
    #[must_use]
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: 0,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Operations a host framework issues against one database connection.
///
/// Implementations translate each call into their own SQL dialect and
/// catalog queries.
#[async_trait]
pub trait RelationalAdapter: Send {
    fn adapter_name(&self) -> &'static str;

    fn supports_migrations(&self) -> bool {
        true
    }

    /// Longest identifier the server accepts for aliases.
    fn table_alias_length(&self) -> usize;

    /// True when the connection answers a trivial query.
    async fn active(&mut self) -> bool;

    /// # Errors
    /// Returns an error if the new connection cannot be established.
    async fn reconnect(&mut self) -> Result<(), SybaseDbError>;

    /// Best-effort close; failures are logged and ignored.
    async fn disconnect(&mut self);

    /// # Errors
    /// Passes through errors from the client library.
    async fn execute(&mut self, sql: &str) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn select_all(
        &mut self,
        sql: &str,
        options: SelectOptions,
    ) -> Result<ResultSet, SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn select_one(&mut self, sql: &str) -> Result<Option<CustomDbRow>, SybaseDbError> {
        let result_set = self.select_all(sql, SelectOptions::limit(1)).await?;
        Ok(result_set.results.into_iter().next())
    }

    /// First column of the first row.
    ///
    /// # Errors
    /// Passes through errors from the client library.
    async fn select_value(&mut self, sql: &str) -> Result<Option<RowValues>, SybaseDbError> {
        Ok(self
            .select_one(sql)
            .await?
            .and_then(|row| row.rows.into_iter().next()))
    }

    /// Run an INSERT and return the generated identity, if any.
    ///
    /// # Errors
    /// Passes through errors from the client library.
    async fn insert(&mut self, sql: &str) -> Result<Option<i64>, SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn update(&mut self, sql: &str) -> Result<u64, SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn delete(&mut self, sql: &str) -> Result<u64, SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn tables(&mut self) -> Result<Vec<String>, SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn columns(&mut self, table: &str) -> Result<Vec<Column>, SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn indexes(&mut self, table: &str) -> Result<Vec<IndexDefinition>, SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn primary_key(&mut self, table: &str) -> Result<Option<String>, SybaseDbError> {
        let columns = self.columns(table).await?;
        Ok(columns
            .iter()
            .find(|c| c.primary)
            .or_else(|| columns.iter().find(|c| c.identity))
            .map(|c| c.name.clone()))
    }

    fn quote(&self, value: &RowValues, column: Option<&Column>) -> String;

    fn quote_string(&self, s: &str) -> String;

    fn quote_column_name(&self, name: &str) -> String;

    fn quote_table_name(&self, name: &str) -> String;

    /// # Errors
    /// Passes through errors from the client library.
    async fn begin_db_transaction(&mut self) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Returns `SybaseDbError::ExecutionError` when no transaction is open.
    async fn commit_db_transaction(&mut self) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Returns `SybaseDbError::ExecutionError` when no transaction is open.
    async fn rollback_db_transaction(&mut self) -> Result<(), SybaseDbError>;

    /// Current transaction nesting depth.
    fn open_transactions(&self) -> usize;

    /// # Errors
    /// Passes through statement generation and client errors.
    async fn create_table(
        &mut self,
        table: &str,
        columns: &[ColumnSpec],
        options: &CreateTableOptions,
    ) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn drop_table(&mut self, table: &str) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn rename_table(&mut self, old: &str, new: &str) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through statement generation and client errors.
    async fn add_column(&mut self, table: &str, column: &ColumnSpec)
    -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through statement generation and client errors.
    async fn change_column(
        &mut self,
        table: &str,
        column: &ColumnSpec,
    ) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn change_column_default(
        &mut self,
        table: &str,
        column: &str,
        default: &RowValues,
    ) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn rename_column(
        &mut self,
        table: &str,
        old: &str,
        new: &str,
    ) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn remove_column(&mut self, table: &str, column: &str) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through statement generation and client errors.
    async fn add_index(
        &mut self,
        table: &str,
        columns: &[String],
        unique: bool,
        name: Option<&str>,
    ) -> Result<(), SybaseDbError>;

    /// # Errors
    /// Passes through errors from the client library.
    async fn remove_index(&mut self, table: &str, index: &str) -> Result<(), SybaseDbError>;
}
