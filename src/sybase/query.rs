use std::sync::Arc;

use futures_util::TryStreamExt;
use tiberius::{ColumnData, Query};

use super::client::SybaseClient;
use crate::error::SybaseDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Run a query and materialize its first result into a `ResultSet`.
///
/// Statements that produce no result (catalog procedures on empty tables,
/// `SET` statements) yield an empty set.
pub async fn build_result_set(
    client: &mut SybaseClient,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SybaseDbError> {
    let query_builder = bind_query_params(query, params);

    let mut stream = query_builder
        .query(client)
        .await
        .map_err(|e| SybaseDbError::statement_invalid(query, e.to_string()))?;

    let columns = stream
        .columns()
        .await
        .map_err(|e| SybaseDbError::statement_invalid(query, e.to_string()))?;

    let column_names: Vec<String> = columns
        .map(|cols| cols.iter().map(|col| col.name().to_string()).collect())
        .unwrap_or_default();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_stream = stream.into_row_stream();
    while let Some(row) = rows_stream
        .try_next()
        .await
        .map_err(|e| SybaseDbError::statement_invalid(query, e.to_string()))?
    {
        let row_values = (0..row.len()).map(|idx| extract_value(&row, idx)).collect();
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Convert one cell, going through chrono for the date/time types.
fn extract_value(row: &tiberius::Row, idx: usize) -> RowValues {
    let Some((_, data)) = row.cells().nth(idx) else {
        return RowValues::Null;
    };

    match data {
        ColumnData::Bit(Some(b)) => RowValues::Bool(*b),
        ColumnData::U8(Some(v)) => RowValues::Int(i64::from(*v)),
        ColumnData::I16(Some(v)) => RowValues::Int(i64::from(*v)),
        ColumnData::I32(Some(v)) => RowValues::Int(i64::from(*v)),
        ColumnData::I64(Some(v)) => RowValues::Int(*v),
        ColumnData::F32(Some(v)) => RowValues::Float(f64::from(*v)),
        ColumnData::F64(Some(v)) => RowValues::Float(*v),
        ColumnData::Numeric(Some(n)) => RowValues::Decimal(n.to_string()),
        ColumnData::String(Some(s)) => RowValues::Text(s.to_string()),
        ColumnData::Guid(Some(g)) => RowValues::Text(g.to_string()),
        ColumnData::Binary(Some(b)) => RowValues::Blob(b.to_vec()),
        ColumnData::DateTime(Some(_))
        | ColumnData::SmallDateTime(Some(_))
        | ColumnData::DateTime2(Some(_)) => row
            .try_get::<chrono::NaiveDateTime, _>(idx)
            .ok()
            .flatten()
            .map_or(RowValues::Null, RowValues::Timestamp),
        ColumnData::Date(Some(_)) => row
            .try_get::<chrono::NaiveDate, _>(idx)
            .ok()
            .flatten()
            .map_or(RowValues::Null, RowValues::Date),
        ColumnData::Time(Some(_)) => row
            .try_get::<chrono::NaiveTime, _>(idx)
            .ok()
            .flatten()
            .map_or(RowValues::Null, |t| {
                RowValues::Text(t.format("%H:%M:%S%.f").to_string())
            }),
        _ => RowValues::Null,
    }
}

/// Bind parameters directly to the query.
///
/// Placeholders are `@P1`, `@P2`, ... in statement order.
pub fn bind_query_params<'a>(query: &'a str, params: &[RowValues]) -> Query<'a> {
    let mut query_builder = Query::new(query);

    for param in params {
        match param {
            RowValues::Int(i) => query_builder.bind(*i),
            RowValues::Float(f) => query_builder.bind(*f),
            RowValues::Decimal(s) | RowValues::Text(s) => query_builder.bind(s.clone()),
            RowValues::Bool(b) => query_builder.bind(*b),
            RowValues::Timestamp(dt) => query_builder.bind(*dt),
            RowValues::Date(d) => query_builder.bind(*d),
            RowValues::Null => query_builder.bind(Option::<String>::None),
            RowValues::Blob(bytes) => query_builder.bind(bytes.clone()),
        }
    }

    query_builder
}
