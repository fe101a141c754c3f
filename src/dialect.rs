//! Type-name tables for the Sybase dialect.
//!
//! Two directions are covered: abstract [`ColumnType`]s rendered into DDL type
//! strings ([`type_to_sql`]), and catalog type names classified back into a
//! [`ColumnType`] ([`simplified_type`], [`normalize_type`]).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::Serialize;

use crate::error::SybaseDbError;

/// Name reported by [`RelationalAdapter::adapter_name`](crate::adapter::RelationalAdapter::adapter_name).
pub const ADAPTER_NAME: &str = "Sybase";

/// Maximum identifier length accepted by the server for aliases and quoted names.
pub const TABLE_ALIAS_LENGTH: usize = 30;

/// Default Adaptive Server listener port.
pub const DEFAULT_PORT: u16 = 5000;

static TYPE_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").expect("static regex")
});

/// Semantic column type shared by every adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    PrimaryKey,
    String,
    Text,
    Integer,
    Float,
    Decimal,
    Datetime,
    Timestamp,
    Time,
    Date,
    Binary,
    Boolean,
}

impl ColumnType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::PrimaryKey => "primary_key",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::Datetime => "datetime",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Time => "time",
            ColumnType::Date => "date",
            ColumnType::Binary => "binary",
            ColumnType::Boolean => "boolean",
        }
    }

    /// Character types whose literals must always be quoted.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, ColumnType::String | ColumnType::Text)
    }

    #[must_use]
    pub fn is_number(self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::Float | ColumnType::Decimal | ColumnType::PrimaryKey
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = SybaseDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NATIVE_DATABASE_TYPES
            .iter()
            .find(|native| native.column_type.as_str() == s.trim())
            .map(|native| native.column_type)
            .ok_or_else(|| SybaseDbError::ParameterError(format!("unknown column type: {s}")))
    }
}

/// One entry of the native type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeType {
    pub column_type: ColumnType,
    pub name: &'static str,
    pub limit: Option<u32>,
    accepts_limit: bool,
}

const fn native(
    column_type: ColumnType,
    name: &'static str,
    limit: Option<u32>,
    accepts_limit: bool,
) -> NativeType {
    NativeType {
        column_type,
        name,
        limit,
        accepts_limit,
    }
}

static NATIVE_DATABASE_TYPES: [NativeType; 12] = [
    native(ColumnType::PrimaryKey, "numeric(9,0) IDENTITY PRIMARY KEY", None, false),
    native(ColumnType::String, "varchar", Some(255), true),
    native(ColumnType::Text, "text", None, false),
    native(ColumnType::Integer, "int", None, false),
    native(ColumnType::Float, "float", Some(8), true),
    native(ColumnType::Decimal, "decimal", None, false),
    native(ColumnType::Datetime, "datetime", None, false),
    native(ColumnType::Timestamp, "timestamp", None, false),
    native(ColumnType::Time, "time", None, false),
    native(ColumnType::Date, "datetime", None, false),
    native(ColumnType::Binary, "image", None, false),
    native(ColumnType::Boolean, "bit", None, false),
];

/// The full abstract-to-native type table.
#[must_use]
pub fn native_database_types() -> &'static [NativeType] {
    &NATIVE_DATABASE_TYPES
}

/// Native table entry for an abstract type.
#[must_use]
pub fn native_type(column_type: ColumnType) -> &'static NativeType {
    NATIVE_DATABASE_TYPES
        .iter()
        .find(|native| native.column_type == column_type)
        .unwrap_or(&NATIVE_DATABASE_TYPES[1])
}

/// Render the DDL type for an abstract column type.
///
/// # Errors
/// Returns `SybaseDbError::ParameterError` when a decimal scale is given
/// without a precision, or the scale exceeds the precision.
pub fn type_to_sql(
    column_type: ColumnType,
    limit: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> Result<String, SybaseDbError> {
    let native = native_type(column_type);

    if column_type == ColumnType::Decimal {
        return match (precision, scale) {
            (Some(p), Some(s)) if s > p => Err(SybaseDbError::ParameterError(format!(
                "decimal scale ({s}) cannot exceed precision ({p})"
            ))),
            (Some(p), Some(s)) => Ok(format!("{}({p},{s})", native.name)),
            (Some(p), None) => Ok(format!("{}({p})", native.name)),
            (None, Some(_)) => Err(SybaseDbError::ParameterError(
                "decimal scale given without a precision".to_string(),
            )),
            (None, None) => Ok(native.name.to_string()),
        };
    }

    match limit.or(native.limit) {
        Some(limit) if native.accepts_limit => Ok(format!("{}({limit})", native.name)),
        _ => Ok(native.name.to_string()),
    }
}

/// Classify a catalog type string such as `varchar(40)` or `numeric(10,2)`.
#[must_use]
pub fn simplified_type(sql_type: &str) -> ColumnType {
    let lowered = sql_type.trim().to_ascii_lowercase();
    let base = lowered
        .split(['(', ' '])
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "int" | "integer" | "bigint" | "smallint" | "tinyint" | "unsigned" => ColumnType::Integer,
        "bit" => ColumnType::Boolean,
        "float" | "double" | "real" => ColumnType::Float,
        "numeric" | "decimal" => {
            if extract_precision(&lowered).is_some() && extract_scale(&lowered).unwrap_or(0) == 0
            {
                ColumnType::Integer
            } else {
                ColumnType::Decimal
            }
        }
        "money" | "smallmoney" => ColumnType::Decimal,
        "text" | "ntext" | "unitext" => ColumnType::Text,
        "binary" | "varbinary" | "image" => ColumnType::Binary,
        "datetime" | "smalldatetime" | "bigdatetime" => ColumnType::Datetime,
        "date" => ColumnType::Date,
        "time" | "bigtime" => ColumnType::Time,
        "timestamp" => ColumnType::Timestamp,
        _ => ColumnType::String,
    }
}

/// Build a column's SQL type from the `systypes`/`syscolumns` projection.
///
/// `numeric` without a positive scale collapses to `int`, and money types read
/// back as `numeric`. Only character and binary types carry their byte length.
#[must_use]
pub fn normalize_type(
    field_type: &str,
    prec: Option<i64>,
    scale: Option<i64>,
    length: Option<i64>,
) -> String {
    let field_type = field_type.trim();
    let lowered = field_type.to_ascii_lowercase();
    let has_scale = scale.is_some_and(|s| s > 0);

    if lowered.contains("numeric") && !has_scale {
        return "int".to_string();
    }
    let type_name = if lowered.contains("money") {
        "numeric"
    } else {
        field_type
    };

    let spec = match (prec.filter(|p| *p > 0), scale) {
        (Some(p), Some(s)) if has_scale => format!("({p},{s})"),
        (Some(p), _) => format!("({p})"),
        (None, _) => match length {
            Some(len) if len > 0 && carries_length(&lowered) => format!("({len})"),
            _ => String::new(),
        },
    };
    format!("{type_name}{spec}")
}

fn carries_length(lowered_type: &str) -> bool {
    matches!(
        lowered_type,
        "char"
            | "varchar"
            | "nchar"
            | "nvarchar"
            | "unichar"
            | "univarchar"
            | "binary"
            | "varbinary"
    )
}

/// First parenthesised argument, read as a length limit (`varchar(40)` -> 40).
#[must_use]
pub fn extract_limit(sql_type: &str) -> Option<u32> {
    TYPE_ARGS
        .captures(sql_type)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Precision of an exact numeric type (`numeric(10,2)` -> 10).
#[must_use]
pub fn extract_precision(sql_type: &str) -> Option<u32> {
    let lowered = sql_type.to_ascii_lowercase();
    if lowered.contains("numeric") || lowered.contains("decimal") {
        extract_limit(sql_type)
    } else {
        None
    }
}

/// Scale of an exact numeric type (`numeric(10,2)` -> 2).
#[must_use]
pub fn extract_scale(sql_type: &str) -> Option<u32> {
    TYPE_ARGS
        .captures(sql_type)
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_to_sql_applies_default_limits() {
        assert_eq!(type_to_sql(ColumnType::String, None, None, None).unwrap(), "varchar(255)");
        assert_eq!(type_to_sql(ColumnType::String, Some(40), None, None).unwrap(), "varchar(40)");
        assert_eq!(type_to_sql(ColumnType::Float, None, None, None).unwrap(), "float(8)");
        assert_eq!(type_to_sql(ColumnType::Integer, Some(4), None, None).unwrap(), "int");
        assert_eq!(type_to_sql(ColumnType::Date, None, None, None).unwrap(), "datetime");
        assert_eq!(type_to_sql(ColumnType::Binary, None, None, None).unwrap(), "image");
        assert_eq!(
            type_to_sql(ColumnType::PrimaryKey, None, None, None).unwrap(),
            "numeric(9,0) IDENTITY PRIMARY KEY"
        );
    }

    #[test]
    fn decimal_uses_precision_and_scale() {
        assert_eq!(
            type_to_sql(ColumnType::Decimal, None, Some(10), Some(2)).unwrap(),
            "decimal(10,2)"
        );
        assert_eq!(type_to_sql(ColumnType::Decimal, None, Some(5), None).unwrap(), "decimal(5)");
        assert!(type_to_sql(ColumnType::Decimal, None, None, Some(2)).is_err());
        assert!(type_to_sql(ColumnType::Decimal, None, Some(2), Some(4)).is_err());
    }

    #[test]
    fn simplified_type_classifies_catalog_names() {
        let cases = [
            ("int", ColumnType::Integer),
            ("smallint", ColumnType::Integer),
            ("tinyint", ColumnType::Integer),
            ("bit", ColumnType::Boolean),
            ("float(8)", ColumnType::Float),
            ("real", ColumnType::Float),
            ("numeric(10,2)", ColumnType::Decimal),
            ("numeric(9,0)", ColumnType::Integer),
            ("money", ColumnType::Decimal),
            ("TEXT", ColumnType::Text),
            ("image", ColumnType::Binary),
            ("varbinary(16)", ColumnType::Binary),
            ("varchar(255)", ColumnType::String),
            ("univarchar(10)", ColumnType::String),
            ("smalldatetime", ColumnType::Datetime),
            ("datetime", ColumnType::Datetime),
            ("date", ColumnType::Date),
            ("time", ColumnType::Time),
            ("timestamp", ColumnType::Timestamp),
            ("sysname", ColumnType::String),
        ];
        for (sql_type, expected) in cases {
            assert_eq!(simplified_type(sql_type), expected, "{sql_type}");
        }
    }

    #[test]
    fn normalize_type_rebuilds_catalog_types() {
        assert_eq!(normalize_type("numeric", Some(9), Some(0), Some(5)), "int");
        assert_eq!(normalize_type("numeric", Some(10), Some(2), Some(6)), "numeric(10,2)");
        assert_eq!(normalize_type("money", None, None, Some(8)), "numeric");
        assert_eq!(normalize_type("varchar ", None, None, Some(40)), "varchar(40)");
        assert_eq!(normalize_type("int", None, None, Some(4)), "int");
        assert_eq!(normalize_type("datetime", None, None, Some(8)), "datetime");
        assert_eq!(normalize_type("text", None, None, Some(16)), "text");
    }

    #[test]
    fn every_column_type_has_a_native_entry() {
        let types = native_database_types();
        for column_type in ColumnType::value_variants() {
            assert!(types.iter().any(|n| n.column_type == *column_type), "{column_type}");
        }
        assert_eq!(native_type(ColumnType::Boolean).name, "bit");
    }

    #[test]
    fn column_type_parses_from_name() {
        assert_eq!("string".parse::<ColumnType>().unwrap(), ColumnType::String);
        assert_eq!("primary_key".parse::<ColumnType>().unwrap(), ColumnType::PrimaryKey);
        assert!("varchar".parse::<ColumnType>().is_err());
    }

    #[test]
    fn limits_are_extracted_from_type_strings() {
        assert_eq!(extract_limit("varchar(40)"), Some(40));
        assert_eq!(extract_precision("numeric(10,2)"), Some(10));
        assert_eq!(extract_scale("numeric(10,2)"), Some(2));
        assert_eq!(extract_precision("varchar(40)"), None);
        assert_eq!(extract_limit("int"), None);
    }
}
