use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Values that can be stored in a database row or used as query parameters.
///
/// The same enum is used for parameters, result rows, and literal quoting:
/// ```rust
/// use sybase_middleware::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Exact numeric kept in its textual form (`numeric`, `decimal`, `money`)
    Decimal(String),
    /// Text/string value
    Text(String),
    /// Boolean value (`bit`)
    Bool(bool),
    /// Timestamp value (`datetime`, `smalldatetime`)
    Timestamp(NaiveDateTime),
    /// Date value
    Date(NaiveDate),
    /// NULL value
    Null,
    /// Binary data (`image`, `binary`, `varbinary`)
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer view; exact numerics without a fractional part qualify.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RowValues::Int(value) => Some(*value),
            RowValues::Decimal(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RowValues::Text(value) => Some(value),
            _ => None,
        }
    }

    /// `bit` columns arrive as `Bool` from tiberius but as 0/1 through some
    /// catalog procedures.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RowValues::Bool(value) => Some(*value),
            RowValues::Int(0) => Some(false),
            RowValues::Int(1) => Some(true),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            RowValues::Timestamp(value) => Some(*value),
            RowValues::Date(date) => date.and_hms_opt(0, 0, 0),
            RowValues::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            RowValues::Decimal(value) => value.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            RowValues::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Textual view of scalar values; `None` for NULL and binary data.
    #[must_use]
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            RowValues::Int(i) => Some(i.to_string()),
            RowValues::Float(f) => Some(f.to_string()),
            RowValues::Decimal(s) | RowValues::Text(s) => Some(s.clone()),
            RowValues::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            RowValues::Timestamp(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            RowValues::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            RowValues::Null | RowValues::Blob(_) => None,
        }
    }
}

/// Parse the timestamp layouts Sybase emits for `datetime` columns.
pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%b %e %Y %l:%M%p",
    ];
    let s = s.trim();
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
