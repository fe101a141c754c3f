//! Catalog SQL for `sysobjects`/`syscolumns`/`systypes` and the parsers that
//! turn its rows into [`Column`] and [`IndexDefinition`] values.

use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::normalize_type;
use crate::quoting::quote_string;
use crate::results::ResultSet;
use crate::schema::{Column, IndexDefinition};

/// `syscolumns.status` bit for nullable columns.
pub const STATUS_NULLABLE: i64 = 8;
/// `syscolumns.status` bit for identity columns.
pub const STATUS_IDENTITY: i64 = 128;
/// `sysobjects.sysstat2` bit set when the table has a primary key.
pub const SYSSTAT2_HAS_PRIMARY_KEY: i64 = 8;

static DEFAULT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(?:default|create\s+default\s+\S+\s+as)\s+(.*?)\s*$")
        .expect("static regex")
});

static INSERT_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*insert\s+(?:into\s+)?([\w.\[\]#]+)").expect("static regex")
});

static INSERT_COLUMNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*insert\s+(?:into\s+)?[\w.\[\]#]+\s*\(([^)]*)\)").expect("static regex")
});

#[must_use]
pub fn tables_sql() -> &'static str {
    "SELECT name FROM sysobjects WHERE type = 'U' ORDER BY name"
}

/// Column metadata for one user table, in declaration order.
#[must_use]
pub fn columns_sql(table: &str) -> String {
    format!(
        "SELECT col.name AS name, type.name AS type, col.prec AS prec, col.scale AS scale, \
         col.length AS length, col.status AS status, obj.sysstat2 AS sysstat2, \
         def.text AS default_text \
         FROM sysobjects obj \
         JOIN syscolumns col ON obj.id = col.id \
         JOIN systypes type ON col.usertype = type.usertype \
         LEFT OUTER JOIN syscomments def ON col.cdefault = def.id \
         WHERE obj.type = 'U' AND obj.name = '{}' AND type.name != 'timestamp' \
         ORDER BY col.colid",
        quote_string(table)
    )
}

#[must_use]
pub fn indexes_sql(table: &str) -> String {
    format!("EXEC sp_helpindex '{}'", quote_string(table))
}

/// Names of default objects bound to a column.
#[must_use]
pub fn default_constraints_sql(table: &str, column: &str) -> String {
    format!(
        "SELECT def.name AS name \
         FROM sysobjects def, syscolumns col, sysobjects tab \
         WHERE col.cdefault = def.id AND col.name = '{}' AND tab.name = '{}' \
         AND col.id = tab.id",
        quote_string(column),
        quote_string(table)
    )
}

#[must_use]
pub fn identity_column_sql(table: &str) -> String {
    format!(
        "SELECT col.name AS name \
         FROM syscolumns col JOIN sysobjects obj ON obj.id = col.id \
         WHERE obj.type = 'U' AND obj.name = '{}' AND col.status & {STATUS_IDENTITY} = {STATUS_IDENTITY}",
        quote_string(table)
    )
}

/// Project rows of [`columns_sql`] into column descriptors.
///
/// A column is primary when it is the identity column of a table that
/// carries a primary key.
#[must_use]
pub fn columns_from_result_set(result_set: &ResultSet) -> Vec<Column> {
    result_set
        .results
        .iter()
        .filter_map(|row| {
            let name = row.get_trimmed_text("name")?;
            let field_type = row.get_trimmed_text("type").unwrap_or_default();
            let sql_type = normalize_type(
                &field_type,
                row.get_i64("prec"),
                row.get_i64("scale"),
                row.get_i64("length"),
            );
            let status = row.get_i64("status").unwrap_or(0);
            let sysstat2 = row.get_i64("sysstat2").unwrap_or(0);
            let default = row
                .get_trimmed_text("default_text")
                .and_then(|text| parse_default(&text));

            let identity = status & STATUS_IDENTITY != 0;
            let primary = identity && sysstat2 & SYSSTAT2_HAS_PRIMARY_KEY != 0;
            Some(
                Column::new(name, default, sql_type, status & STATUS_NULLABLE != 0)
                    .with_identity(identity)
                    .with_primary(primary),
            )
        })
        .collect()
}

/// Project `sp_helpindex` rows into index descriptors.
///
/// Clustered indexes back the primary key and are left out.
#[must_use]
pub fn indexes_from_result_set(table: &str, result_set: &ResultSet) -> Vec<IndexDefinition> {
    result_set
        .results
        .iter()
        .filter_map(|row| {
            let name = row.get_trimmed_text("index_name")?;
            let description = row
                .get_trimmed_text("index_description")
                .unwrap_or_default()
                .to_ascii_lowercase();
            if description.starts_with("clustered") || description.contains("primary key") {
                return None;
            }
            let columns = row
                .get_trimmed_text("index_keys")
                .unwrap_or_default()
                .split(',')
                .map(|key| strip_sort_order(key.trim()).to_string())
                .filter(|key| !key.is_empty())
                .collect();

            Some(IndexDefinition {
                table: table.to_string(),
                name,
                unique: description.contains("unique"),
                columns,
            })
        })
        .collect()
}

fn strip_sort_order(key: &str) -> &str {
    let lowered = key.to_ascii_lowercase();
    if lowered.ends_with(" desc") {
        key[..key.len() - 5].trim_end()
    } else if lowered.ends_with(" asc") {
        key[..key.len() - 4].trim_end()
    } else {
        key
    }
}

/// Literal default from a `syscomments` text such as `DEFAULT 'abc'`.
///
/// `NULL` defaults read as no default; expression defaults are kept verbatim.
#[must_use]
pub fn parse_default(text: &str) -> Option<String> {
    let caps = DEFAULT_CLAUSE.captures(text)?;
    let mut literal = caps.get(1)?.as_str().trim();
    while literal.len() >= 2 && literal.starts_with('(') && literal.ends_with(')') {
        literal = literal[1..literal.len() - 1].trim();
    }

    if literal.is_empty() || literal.eq_ignore_ascii_case("null") {
        return None;
    }
    for quote in ['\'', '"'] {
        if literal.len() >= 2 && literal.starts_with(quote) && literal.ends_with(quote) {
            let inner = &literal[1..literal.len() - 1];
            let doubled = format!("{quote}{quote}");
            return Some(inner.replace(&doubled, &quote.to_string()));
        }
    }
    Some(literal.to_string())
}

/// Target table of an INSERT statement, without owner or brackets.
#[must_use]
pub fn table_name_from_insert(sql: &str) -> Option<String> {
    let caps = INSERT_TABLE.captures(sql)?;
    let qualified = caps.get(1)?.as_str();
    qualified
        .rsplit('.')
        .next()
        .map(strip_brackets)
        .filter(|name| !name.is_empty())
}

/// Explicit column list of an INSERT statement, if it has one.
#[must_use]
pub fn insert_column_list(sql: &str) -> Option<Vec<String>> {
    let caps = INSERT_COLUMNS.captures(sql)?;
    Some(
        caps.get(1)?
            .as_str()
            .split(',')
            .map(|c| strip_brackets(c.trim()))
            .filter(|c| !c.is_empty())
            .collect(),
    )
}

fn strip_brackets(name: &str) -> String {
    name.trim_start_matches('[')
        .trim_end_matches(']')
        .replace("]]", "]")
}
