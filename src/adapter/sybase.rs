use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use super::{RelationalAdapter, SelectOptions};
use crate::catalog;
use crate::client::{TdsClient, TdsConnector};
use crate::config::SybaseOptions;
use crate::dialect::{ADAPTER_NAME, TABLE_ALIAS_LENGTH};
use crate::error::SybaseDbError;
use crate::quoting;
use crate::results::ResultSet;
use crate::schema::{Column, IndexDefinition, SchemaDump, TableDefinition};
use crate::statements::{self, ColumnSpec, CreateTableOptions};
use crate::types::RowValues;

static INTEGER_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:0|[1-9]\d*)$").expect("static regex"));

static DECIMAL_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:0|[1-9]\d*)\.\d+$").expect("static regex"));

/// Sybase implementation of [`RelationalAdapter`] over a single connection.
///
/// The adapter owns one client handle produced by its connector; there is no
/// pooling and no internal locking.
pub struct SybaseAdapter<K: TdsConnector> {
    connector: K,
    options: SybaseOptions,
    client: Option<K::Client>,
    open_transactions: usize,
    identity_columns: HashMap<String, Option<String>>,
}

impl<K: TdsConnector> std::fmt::Debug for SybaseAdapter<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SybaseAdapter")
            .field("options", &self.options)
            .field("connected", &self.client.is_some())
            .field("open_transactions", &self.open_transactions)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "tds")]
impl SybaseAdapter<crate::sybase::TiberiusConnector> {
    /// Connect through tiberius.
    ///
    /// # Errors
    /// See [`SybaseAdapter::connect`].
    pub async fn connect_tds(options: SybaseOptions) -> Result<Self, SybaseDbError> {
        Self::connect(crate::sybase::TiberiusConnector, options).await
    }
}

impl<K: TdsConnector> SybaseAdapter<K> {
    /// Open a connection and switch to the configured database.
    ///
    /// # Errors
    /// Returns `SybaseDbError::ConfigError` for incomplete options and
    /// `SybaseDbError::ConnectionError` if login or `USE <database>` fails.
    pub async fn connect(connector: K, options: SybaseOptions) -> Result<Self, SybaseDbError> {
        options.validate()?;
        let mut adapter = Self {
            connector,
            options,
            client: None,
            open_transactions: 0,
            identity_columns: HashMap::new(),
        };
        adapter.establish().await?;
        Ok(adapter)
    }

    async fn establish(&mut self) -> Result<(), SybaseDbError> {
        let mut client = self.connector.connect(&self.options).await?;
        let database = self.options.database.clone();

        if let Err(e) = client.execute_batch(&format!("USE {database}")).await {
            if let Err(close_err) = client.close().await {
                warn!(error = %close_err, "close after failed USE");
            }
            return Err(SybaseDbError::ConnectionError(format!(
                "Cannot USE {database}: {e}"
            )));
        }

        info!(host = %self.options.host, database = %database, "connected");
        self.client = Some(client);
        Ok(())
    }

    fn client(&mut self) -> Result<&mut K::Client, SybaseDbError> {
        self.client
            .as_mut()
            .ok_or_else(|| SybaseDbError::ConnectionError("not connected".to_string()))
    }

    #[must_use]
    pub fn options(&self) -> &SybaseOptions {
        &self.options
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    async fn query(&mut self, sql: &str) -> Result<ResultSet, SybaseDbError> {
        debug!(sql, "query");
        self.client()?.query(sql, &[]).await
    }

    async fn execute_dml(&mut self, sql: &str) -> Result<u64, SybaseDbError> {
        debug!(sql, "execute");
        self.client()?.execute(sql, &[]).await
    }

    /// Identity column of a table, cached until the next schema statement.
    async fn identity_column(&mut self, table: &str) -> Result<Option<String>, SybaseDbError> {
        if let Some(cached) = self.identity_columns.get(table) {
            return Ok(cached.clone());
        }
        let result_set = self.query(&catalog::identity_column_sql(table)).await?;
        let name = result_set
            .results
            .first()
            .and_then(|row| row.get_trimmed_text("name"));
        self.identity_columns.insert(table.to_string(), name.clone());
        Ok(name)
    }

    /// Table targeted by an INSERT that names the identity column explicitly.
    async fn identity_insert_table(&mut self, sql: &str) -> Result<Option<String>, SybaseDbError> {
        let (Some(table), Some(columns)) = (
            catalog::table_name_from_insert(sql),
            catalog::insert_column_list(sql),
        ) else {
            return Ok(None);
        };
        let Some(identity) = self.identity_column(&table).await? else {
            return Ok(None);
        };
        Ok(columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&identity))
            .then_some(table))
    }

    async fn schema_changed(&mut self, sql: &str) -> Result<(), SybaseDbError> {
        self.identity_columns.clear();
        self.execute(sql).await
    }

    /// Drop the default objects bound to a column.
    async fn remove_default_constraint(
        &mut self,
        table: &str,
        column: &str,
    ) -> Result<(), SybaseDbError> {
        let result_set = self
            .query(&catalog::default_constraints_sql(table, column))
            .await?;
        let names: Vec<String> = result_set
            .results
            .iter()
            .filter_map(|row| row.get_trimmed_text("name"))
            .collect();
        for name in names {
            self.execute(&statements::drop_constraint(table, &name)).await?;
        }
        Ok(())
    }

    /// Introspect every user table, or only the named ones.
    ///
    /// # Errors
    /// Passes through catalog query errors.
    pub async fn schema_dump(&mut self, only: &[String]) -> Result<SchemaDump, SybaseDbError> {
        let mut tables = Vec::new();
        for name in self.tables().await? {
            if !only.is_empty() && !only.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
                continue;
            }
            let columns = self.columns(&name).await?;
            let indexes = self.indexes(&name).await?;
            tables.push(TableDefinition {
                name,
                columns,
                indexes,
            });
        }
        Ok(SchemaDump {
            adapter: ADAPTER_NAME,
            database: Some(self.options.database.clone()),
            tables,
        })
    }
}

/// Numeric-looking text becomes `Int`/`Float`; text with leading zeros is kept.
fn convert_numbers(result_set: &mut ResultSet) {
    result_set.map_values(|_, value| match value {
        RowValues::Text(ref s) | RowValues::Decimal(ref s) => {
            let trimmed = s.trim();
            if INTEGER_TEXT.is_match(trimmed) {
                trimmed.parse().map_or(value, RowValues::Int)
            } else if DECIMAL_TEXT.is_match(trimmed) && matches!(value, RowValues::Text(_)) {
                trimmed.parse().map_or(value, RowValues::Float)
            } else {
                value
            }
        }
        other => other,
    });
}

#[async_trait]
impl<K: TdsConnector> RelationalAdapter for SybaseAdapter<K> {
    fn adapter_name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn table_alias_length(&self) -> usize {
        TABLE_ALIAS_LENGTH
    }

    async fn active(&mut self) -> bool {
        match self.client.as_mut() {
            Some(client) => client.query("SELECT 1", &[]).await.is_ok(),
            None => false,
        }
    }

    async fn reconnect(&mut self) -> Result<(), SybaseDbError> {
        self.disconnect().await;
        self.establish().await
    }

    async fn disconnect(&mut self) {
        self.open_transactions = 0;
        self.identity_columns.clear();
        if let Some(mut client) = self.client.take() {
            match client.close().await {
                Ok(()) => info!(database = %self.options.database, "disconnected"),
                Err(e) => warn!(error = %e, "ignoring error while disconnecting"),
            }
        }
    }

    async fn execute(&mut self, sql: &str) -> Result<(), SybaseDbError> {
        debug!(sql, "execute");
        self.client()?.execute_batch(sql).await
    }

    async fn select_all(
        &mut self,
        sql: &str,
        options: SelectOptions,
    ) -> Result<ResultSet, SybaseDbError> {
        let mut result_set = match options.limit {
            // ROWCOUNT 0 means unlimited, so an empty window never reaches the server.
            Some(0) => return Ok(ResultSet::default()),
            Some(limit) => {
                let window = limit.saturating_add(options.offset);
                self.execute(&statements::set_rowcount(window)).await?;
                let result = self.query(sql).await;
                let reset = self.execute(&statements::set_rowcount(0)).await;
                let result_set = result?;
                reset?;
                result_set
            }
            None => self.query(sql).await?,
        };

        result_set.skip_rows(options.offset);
        if self.options.numconvert {
            convert_numbers(&mut result_set);
        }
        Ok(result_set)
    }

    async fn insert(&mut self, sql: &str) -> Result<Option<i64>, SybaseDbError> {
        let identity_table = self.identity_insert_table(sql).await?;

        if let Some(table) = &identity_table {
            self.execute(&statements::enable_identity_insert(table, true))
                .await?;
        }
        let result = self.execute_dml(sql).await;
        if let Some(table) = &identity_table {
            let off = self
                .execute(&statements::enable_identity_insert(table, false))
                .await;
            if result.is_ok() {
                off?;
            }
        }
        result?;

        let last_id = self
            .query("SELECT @@IDENTITY AS last_id")
            .await?
            .results
            .first()
            .and_then(|row| row.get_i64("last_id"));
        Ok(last_id.filter(|id| *id != 0))
    }

    async fn update(&mut self, sql: &str) -> Result<u64, SybaseDbError> {
        self.execute_dml(sql).await
    }

    async fn delete(&mut self, sql: &str) -> Result<u64, SybaseDbError> {
        self.execute_dml(sql).await
    }

    async fn tables(&mut self) -> Result<Vec<String>, SybaseDbError> {
        let result_set = self.query(catalog::tables_sql()).await?;
        Ok(result_set
            .results
            .iter()
            .filter_map(|row| row.get_trimmed_text("name"))
            .collect())
    }

    async fn columns(&mut self, table: &str) -> Result<Vec<Column>, SybaseDbError> {
        let result_set = self.query(&catalog::columns_sql(table)).await?;
        Ok(catalog::columns_from_result_set(&result_set))
    }

    async fn indexes(&mut self, table: &str) -> Result<Vec<IndexDefinition>, SybaseDbError> {
        let result_set = self.query(&catalog::indexes_sql(table)).await?;
        Ok(catalog::indexes_from_result_set(table, &result_set))
    }

    fn quote(&self, value: &RowValues, column: Option<&Column>) -> String {
        quoting::quote(value, column)
    }

    fn quote_string(&self, s: &str) -> String {
        quoting::quote_string(s)
    }

    fn quote_column_name(&self, name: &str) -> String {
        quoting::quote_column_name(name)
    }

    fn quote_table_name(&self, name: &str) -> String {
        quoting::quote_table_name(name)
    }

    async fn begin_db_transaction(&mut self) -> Result<(), SybaseDbError> {
        self.execute("BEGIN TRAN").await?;
        self.open_transactions += 1;
        Ok(())
    }

    async fn commit_db_transaction(&mut self) -> Result<(), SybaseDbError> {
        if self.open_transactions == 0 {
            return Err(SybaseDbError::ExecutionError(
                "COMMIT without an open transaction".to_string(),
            ));
        }
        self.execute("COMMIT TRAN").await?;
        self.open_transactions -= 1;
        Ok(())
    }

    /// Rolls back every nesting level, as the server does.
    async fn rollback_db_transaction(&mut self) -> Result<(), SybaseDbError> {
        if self.open_transactions == 0 {
            return Err(SybaseDbError::ExecutionError(
                "ROLLBACK without an open transaction".to_string(),
            ));
        }
        let result = self.execute("ROLLBACK TRAN").await;
        self.open_transactions = 0;
        result
    }

    fn open_transactions(&self) -> usize {
        self.open_transactions
    }

    async fn create_table(
        &mut self,
        table: &str,
        columns: &[ColumnSpec],
        options: &CreateTableOptions,
    ) -> Result<(), SybaseDbError> {
        let sql = statements::create_table(table, columns, options)?;
        self.schema_changed(&sql).await
    }

    async fn drop_table(&mut self, table: &str) -> Result<(), SybaseDbError> {
        self.schema_changed(&statements::drop_table(table)).await
    }

    async fn rename_table(&mut self, old: &str, new: &str) -> Result<(), SybaseDbError> {
        self.schema_changed(&statements::rename_table(old, new)).await
    }

    async fn add_column(
        &mut self,
        table: &str,
        column: &ColumnSpec,
    ) -> Result<(), SybaseDbError> {
        let sql = statements::add_column(table, column)?;
        self.schema_changed(&sql).await
    }

    async fn change_column(
        &mut self,
        table: &str,
        column: &ColumnSpec,
    ) -> Result<(), SybaseDbError> {
        let sql = statements::change_column(table, column)?;
        match self.schema_changed(&sql).await {
            Ok(()) => {}
            Err(e) if e.is_noop_alter() => {
                warn!(table, column = %column.name, "column alteration was a no-op");
            }
            Err(e) => return Err(e),
        }

        if let Some(default) = &column.default {
            self.change_column_default(table, &column.name, default)
                .await?;
        }
        Ok(())
    }

    async fn change_column_default(
        &mut self,
        table: &str,
        column: &str,
        default: &RowValues,
    ) -> Result<(), SybaseDbError> {
        self.remove_default_constraint(table, column).await?;
        self.schema_changed(&statements::change_column_default(table, column, default))
            .await
    }

    async fn rename_column(
        &mut self,
        table: &str,
        old: &str,
        new: &str,
    ) -> Result<(), SybaseDbError> {
        self.schema_changed(&statements::rename_column(table, old, new))
            .await
    }

    async fn remove_column(&mut self, table: &str, column: &str) -> Result<(), SybaseDbError> {
        self.remove_default_constraint(table, column).await?;
        self.schema_changed(&statements::remove_column(table, column))
            .await
    }

    async fn add_index(
        &mut self,
        table: &str,
        columns: &[String],
        unique: bool,
        name: Option<&str>,
    ) -> Result<(), SybaseDbError> {
        let sql = statements::add_index(table, columns, unique, name)?;
        self.execute(&sql).await
    }

    async fn remove_index(&mut self, table: &str, index: &str) -> Result<(), SybaseDbError> {
        self.execute(&statements::remove_index(table, index)).await
    }
}
