//! DDL and session statements in the Sybase dialect.

use crate::dialect::{ColumnType, type_to_sql};
use crate::error::SybaseDbError;
use crate::quoting::{quote, quote_column_name, quote_string, quote_table_name};
use crate::types::RowValues;

/// Column definition used by the schema statements.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    pub limit: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    /// `None` leaves nullability to the statement's default.
    pub null: Option<bool>,
    pub default: Option<RowValues>,
}

impl ColumnSpec {
    /// A column without default or explicit nullability.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            limit: None,
            precision: None,
            scale: None,
            null: None,
            default: None,
        }
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn precision(mut self, precision: u32, scale: Option<u32>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.null = Some(false);
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.null = Some(true);
        self
    }

    #[must_use]
    pub fn default(mut self, default: RowValues) -> Self {
        self.default = Some(default);
        self
    }

    /// DDL type string for this column.
    ///
    /// # Errors
    /// Propagates the `type_to_sql` precision/scale validation.
    pub fn sql_type(&self) -> Result<String, SybaseDbError> {
        type_to_sql(self.column_type, self.limit, self.precision, self.scale)
    }

    /// `name type [DEFAULT x] NULL|NOT NULL`.
    ///
    /// Sybase defaults columns to NOT NULL, so nullability is always spelled out
    /// and an unspecified column is created nullable. Primary keys carry their
    /// own constraint and get no suffix.
    ///
    /// # Errors
    /// Propagates the `type_to_sql` precision/scale validation.
    pub fn to_sql(&self) -> Result<String, SybaseDbError> {
        let mut sql = format!("{} {}", quote_column_name(&self.name), self.sql_type()?);
        if self.column_type == ColumnType::PrimaryKey {
            return Ok(sql);
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&quote(default, None));
        }
        sql.push_str(if self.null.unwrap_or(true) { " NULL" } else { " NOT NULL" });
        Ok(sql)
    }
}

/// Options for [`create_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableOptions {
    /// Add an identity primary key column.
    pub id: bool,
    /// Name of the implicit primary key column.
    pub primary_key: String,
    /// Drop the table first if it exists.
    pub force: bool,
    /// Trailing table options, e.g. `LOCK DATAROWS`.
    pub options: Option<String>,
}

impl Default for CreateTableOptions {
    fn default() -> Self {
        Self {
            id: true,
            primary_key: "id".to_string(),
            force: false,
            options: None,
        }
    }
}

/// `CREATE TABLE`, preceded by a guarded drop when `force` is set.
///
/// # Errors
/// Returns `SybaseDbError::ParameterError` for a table without columns, or a
/// column type error.
pub fn create_table(
    table: &str,
    columns: &[ColumnSpec],
    options: &CreateTableOptions,
) -> Result<String, SybaseDbError> {
    let mut definitions = Vec::with_capacity(columns.len() + 1);
    if options.id {
        definitions.push(ColumnSpec::new(&options.primary_key, ColumnType::PrimaryKey).to_sql()?);
    }
    for column in columns {
        definitions.push(column.to_sql()?);
    }
    if definitions.is_empty() {
        return Err(SybaseDbError::ParameterError(format!(
            "table {table} needs at least one column"
        )));
    }

    let mut sql = String::new();
    if options.force {
        sql.push_str(&drop_table_if_exists(table));
        sql.push('\n');
    }
    sql.push_str(&format!(
        "CREATE TABLE {} ({})",
        quote_table_name(table),
        definitions.join(", ")
    ));
    if let Some(extra) = &options.options {
        sql.push(' ');
        sql.push_str(extra);
    }
    Ok(sql)
}

#[must_use]
pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE {}", quote_table_name(table))
}

#[must_use]
pub fn drop_table_if_exists(table: &str) -> String {
    format!(
        "IF EXISTS (SELECT 1 FROM sysobjects WHERE name = '{}' AND type = 'U') DROP TABLE {}",
        quote_string(table),
        quote_table_name(table)
    )
}

#[must_use]
pub fn rename_table(old: &str, new: &str) -> String {
    format!(
        "EXEC sp_rename '{}', '{}'",
        quote_string(old),
        quote_string(new)
    )
}

/// # Errors
/// Propagates column type errors.
pub fn add_column(table: &str, column: &ColumnSpec) -> Result<String, SybaseDbError> {
    Ok(format!(
        "ALTER TABLE {} ADD {}",
        quote_table_name(table),
        column.to_sql()?
    ))
}

/// `ALTER TABLE ... MODIFY`; defaults are changed separately.
///
/// Without an explicit nullability the column keeps its current one.
///
/// # Errors
/// Propagates column type errors.
pub fn change_column(table: &str, column: &ColumnSpec) -> Result<String, SybaseDbError> {
    let mut sql = format!(
        "ALTER TABLE {} MODIFY {} {}",
        quote_table_name(table),
        quote_column_name(&column.name),
        column.sql_type()?
    );
    match column.null {
        Some(true) => sql.push_str(" NULL"),
        Some(false) => sql.push_str(" NOT NULL"),
        None => {}
    }
    Ok(sql)
}

#[must_use]
pub fn change_column_default(table: &str, column: &str, default: &RowValues) -> String {
    format!(
        "ALTER TABLE {} REPLACE {} DEFAULT {}",
        quote_table_name(table),
        quote_column_name(column),
        quote(default, None)
    )
}

#[must_use]
pub fn rename_column(table: &str, old: &str, new: &str) -> String {
    format!(
        "EXEC sp_rename '{}.{}', '{}'",
        quote_string(table),
        quote_string(old),
        quote_string(new)
    )
}

#[must_use]
pub fn remove_column(table: &str, column: &str) -> String {
    format!(
        "ALTER TABLE {} DROP {}",
        quote_table_name(table),
        quote_column_name(column)
    )
}

#[must_use]
pub fn drop_constraint(table: &str, constraint: &str) -> String {
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {}",
        quote_table_name(table),
        quote_column_name(constraint)
    )
}

/// `index_<table>_on_<col1>_and_<col2>`.
#[must_use]
pub fn index_name<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    let joined = columns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("_and_");
    format!("index_{table}_on_{joined}")
}

/// # Errors
/// Returns `SybaseDbError::ParameterError` when no columns are given.
pub fn add_index<S: AsRef<str>>(
    table: &str,
    columns: &[S],
    unique: bool,
    name: Option<&str>,
) -> Result<String, SybaseDbError> {
    if columns.is_empty() {
        return Err(SybaseDbError::ParameterError(format!(
            "index on {table} needs at least one column"
        )));
    }
    let name = name.map_or_else(|| index_name(table, columns), str::to_string);
    let quoted = columns
        .iter()
        .map(|c| quote_column_name(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "CREATE {}INDEX {} ON {} ({quoted})",
        if unique { "UNIQUE " } else { "" },
        quote_column_name(&name),
        quote_table_name(table)
    ))
}

#[must_use]
pub fn remove_index(table: &str, index: &str) -> String {
    format!("DROP INDEX {}.{}", quote_table_name(table), quote_column_name(index))
}

#[must_use]
pub fn enable_identity_insert(table: &str, enable: bool) -> String {
    format!(
        "SET IDENTITY_INSERT {} {}",
        quote_table_name(table),
        if enable { "ON" } else { "OFF" }
    )
}

/// Largest value `SET ROWCOUNT` accepts (a signed 32-bit `int`).
pub const MAX_ROWCOUNT: usize = i32::MAX as usize;

/// `SET ROWCOUNT n`; zero lifts the limit. Larger counts are clamped to
/// [`MAX_ROWCOUNT`].
#[must_use]
pub fn set_rowcount(rows: usize) -> String {
    format!("SET ROWCOUNT {}", rows.min(MAX_ROWCOUNT))
}
