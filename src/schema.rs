//! Read-only projections of the remote catalog.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::dialect::{self, ColumnType};
use crate::types::{RowValues, parse_timestamp};

/// A table column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub null: bool,
    pub identity: bool,
    pub primary: bool,
    pub default: Option<String>,
    pub limit: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl Column {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        default: Option<String>,
        sql_type: impl Into<String>,
        null: bool,
    ) -> Self {
        let sql_type = sql_type.into();
        let column_type = dialect::simplified_type(&sql_type);
        let (precision, scale) = if column_type == ColumnType::Decimal {
            (
                dialect::extract_precision(&sql_type),
                dialect::extract_scale(&sql_type),
            )
        } else {
            (None, None)
        };
        let limit = if precision.is_none() {
            dialect::extract_limit(&sql_type)
        } else {
            None
        };

        Self {
            name: name.into(),
            sql_type,
            column_type,
            null,
            identity: false,
            primary: false,
            default,
            limit,
            precision,
            scale,
        }
    }

    #[must_use]
    pub fn with_identity(mut self, identity: bool) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.column_type.is_text()
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        self.column_type.is_number()
    }

    /// The column default cast to the column's type, or `Null`.
    #[must_use]
    pub fn default_value(&self) -> RowValues {
        match &self.default {
            Some(default) => self.type_cast(RowValues::Text(default.clone())),
            None => RowValues::Null,
        }
    }

    /// Coerce a raw result value into this column's semantic type.
    ///
    /// Values that do not fit the column type come back unchanged.
    #[must_use]
    pub fn type_cast(&self, value: RowValues) -> RowValues {
        if value.is_null() {
            return value;
        }
        match self.column_type {
            ColumnType::Boolean => cast_bool(value),
            ColumnType::Integer | ColumnType::PrimaryKey => cast_integer(value),
            ColumnType::Float => match value {
                RowValues::Text(ref s) => s.trim().parse::<f64>().map_or(value, RowValues::Float),
                other => other.as_float().map_or(other, RowValues::Float),
            },
            ColumnType::Decimal => match value {
                RowValues::Int(i) => RowValues::Decimal(i.to_string()),
                RowValues::Float(f) => RowValues::Decimal(f.to_string()),
                RowValues::Text(s) if looks_numeric(&s) => {
                    RowValues::Decimal(s.trim().to_string())
                }
                other => other,
            },
            ColumnType::Datetime | ColumnType::Timestamp => match value {
                RowValues::Text(ref s) => parse_timestamp(s).map_or(value, RowValues::Timestamp),
                RowValues::Date(d) => d
                    .and_hms_opt(0, 0, 0)
                    .map_or(RowValues::Date(d), RowValues::Timestamp),
                other => other,
            },
            ColumnType::Date => match value {
                RowValues::Timestamp(dt) => RowValues::Date(dt.date()),
                RowValues::Text(ref s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .ok()
                    .or_else(|| parse_timestamp(s).map(|dt| dt.date()))
                    .map_or(value, RowValues::Date),
                other => other,
            },
            ColumnType::Time => match value {
                RowValues::Text(ref s) => parse_time(s).map_or(value, RowValues::Timestamp),
                other => other,
            },
            ColumnType::Binary => match value {
                RowValues::Text(s) => RowValues::Blob(s.into_bytes()),
                other => other,
            },
            ColumnType::String | ColumnType::Text => match value {
                RowValues::Blob(_) | RowValues::Text(_) => value,
                other => other.to_plain_string().map_or(other, RowValues::Text),
            },
        }
    }
}

fn cast_bool(value: RowValues) -> RowValues {
    match value {
        RowValues::Int(i) => RowValues::Bool(i != 0),
        RowValues::Text(ref s) => match truthiness(s) {
            Some(b) => RowValues::Bool(b),
            None => value,
        },
        other => other,
    }
}

fn cast_integer(value: RowValues) -> RowValues {
    match value {
        RowValues::Bool(b) => RowValues::Int(i64::from(b)),
        RowValues::Float(f) => whole_number(f).map_or(value, RowValues::Int),
        RowValues::Decimal(ref s) | RowValues::Text(ref s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return RowValues::Int(i);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(whole_number)
                .map_or(value, RowValues::Int)
        }
        other => other,
    }
}

/// `f` as an `i64` when it is integral and inside the `i64` range.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_number(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

/// Time-of-day values are anchored to 2000-01-01.
fn parse_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
        .and_then(|t| NaiveDate::from_ymd_opt(2000, 1, 1).map(|d| d.and_time(t)))
        .or_else(|| parse_timestamp(s))
}

pub(crate) fn truthiness(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" => Some(true),
        "0" | "f" | "false" | "n" | "no" => Some(false),
        _ => None,
    }
}

pub(crate) fn looks_numeric(s: &str) -> bool {
    let s = s.trim();
    s.parse::<f64>().is_ok_and(f64::is_finite)
}

/// An index as reported by `sp_helpindex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDefinition {
    pub table: String,
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

/// Columns and indexes of one user table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    /// Name of the identity column, if the table has one.
    #[must_use]
    pub fn identity_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.identity)
    }
}

/// Serializable snapshot of every introspected table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDump {
    pub adapter: &'static str,
    pub database: Option<String>,
    pub tables: Vec<TableDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_column_derives_type_and_limits() {
        let col = Column::new("name", None, "varchar(40)", true);
        assert_eq!(col.column_type, ColumnType::String);
        assert_eq!(col.limit, Some(40));
        assert!(col.is_text());

        let col = Column::new("price", None, "numeric(10,2)", false);
        assert_eq!(col.column_type, ColumnType::Decimal);
        assert_eq!(col.precision, Some(10));
        assert_eq!(col.scale, Some(2));
        assert_eq!(col.limit, None);
    }

    #[test]
    fn bit_columns_cast_to_bool() {
        let col = Column::new("active", None, "bit", false);
        assert_eq!(col.type_cast(RowValues::Int(1)), RowValues::Bool(true));
        assert_eq!(col.type_cast(RowValues::Int(0)), RowValues::Bool(false));
        assert_eq!(col.type_cast(RowValues::Text("t".into())), RowValues::Bool(true));
        assert_eq!(col.type_cast(RowValues::Null), RowValues::Null);
    }

    #[test]
    fn integer_and_datetime_casts() {
        let int_col = Column::new("n", None, "int", true);
        assert_eq!(int_col.type_cast(RowValues::Text(" 42 ".into())), RowValues::Int(42));
        assert_eq!(int_col.type_cast(RowValues::Decimal("7.000".into())), RowValues::Int(7));
        assert_eq!(
            int_col.type_cast(RowValues::Text("abc".into())),
            RowValues::Text("abc".into())
        );

        assert_eq!(int_col.type_cast(RowValues::Float(12.0)), RowValues::Int(12));
        assert_eq!(int_col.type_cast(RowValues::Float(1.5)), RowValues::Float(1.5));

        let dt_col = Column::new("created_at", None, "datetime", true);
        match dt_col.type_cast(RowValues::Text("2024-01-02 03:04:05".into())) {
            RowValues::Timestamp(dt) => assert_eq!(dt.to_string(), "2024-01-02 03:04:05"),
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_numbers_stay_unchanged_on_integer_columns() {
        let int_col = Column::new("n", None, "int", true);
        assert_eq!(
            int_col.type_cast(RowValues::Text("1e30".into())),
            RowValues::Text("1e30".into())
        );
        assert_eq!(int_col.type_cast(RowValues::Float(1e30)), RowValues::Float(1e30));
        assert_eq!(int_col.type_cast(RowValues::Float(-1e30)), RowValues::Float(-1e30));
        assert_eq!(
            int_col.type_cast(RowValues::Decimal("9223372036854775808".into())),
            RowValues::Decimal("9223372036854775808".into())
        );
        assert!(matches!(
            int_col.type_cast(RowValues::Float(f64::NAN)),
            RowValues::Float(f) if f.is_nan()
        ));
    }

    #[test]
    fn default_value_is_cast() {
        let col = Column::new("qty", Some("3".into()), "int", true);
        assert_eq!(col.default_value(), RowValues::Int(3));
        let col = Column::new("label", Some("abc".into()), "varchar(10)", true);
        assert_eq!(col.default_value(), RowValues::Text("abc".into()));
        let col = Column::new("label", None, "varchar(10)", true);
        assert_eq!(col.default_value(), RowValues::Null);
    }
}
