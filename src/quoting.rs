//! Literal and identifier quoting for the Sybase dialect.

use std::fmt::Write;

use chrono::{NaiveDateTime, Timelike};

use crate::dialect::{ColumnType, TABLE_ALIAS_LENGTH};
use crate::schema::{Column, looks_numeric, truthiness};
use crate::types::RowValues;

/// Double embedded single quotes.
#[must_use]
pub fn quote_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Bracket an identifier unless the brackets would push it past the
/// server's identifier limit; brackets and escaped `]` count towards the length.
#[must_use]
pub fn quote_column_name(name: &str) -> String {
    if is_bracketed(name) {
        return name.to_string();
    }
    let escaped = name.replace(']', "]]");
    if escaped.len() + 2 <= TABLE_ALIAS_LENGTH {
        format!("[{escaped}]")
    } else {
        name.to_string()
    }
}

/// Quote each part of a possibly owner-qualified table name.
///
/// Dots inside an already bracketed part do not separate parts.
#[must_use]
pub fn quote_table_name(name: &str) -> String {
    split_qualified(name)
        .into_iter()
        .map(quote_column_name)
        .collect::<Vec<_>>()
        .join(".")
}

fn is_bracketed(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('[') && name.ends_with(']')
}

fn split_qualified(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_brackets = false;
    let mut chars = name.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '[' if !in_brackets => in_brackets = true,
            ']' if in_brackets => {
                // `]]` is an escaped bracket inside the identifier
                if chars.peek().is_some_and(|&(_, next)| next == ']') {
                    chars.next();
                } else {
                    in_brackets = false;
                }
            }
            '.' if !in_brackets => {
                parts.push(&name[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&name[start..]);
    parts
}

#[must_use]
pub fn quoted_true() -> &'static str {
    "1"
}

#[must_use]
pub fn quoted_false() -> &'static str {
    "0"
}

/// `YYYY-MM-DD HH:MM:SS`, with milliseconds only when present.
#[must_use]
pub fn quoted_date(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() / 1_000_000 == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

/// Render a value as a SQL literal, optionally shaped by the target column.
#[must_use]
pub fn quote(value: &RowValues, column: Option<&Column>) -> String {
    let column_type = column.map(|c| c.column_type);
    let textual = column_type.is_some_and(ColumnType::is_text);

    match value {
        RowValues::Null => "NULL".to_string(),
        RowValues::Bool(b) => {
            let lit = if *b { quoted_true() } else { quoted_false() };
            if textual {
                format!("'{lit}'")
            } else {
                lit.to_string()
            }
        }
        RowValues::Int(_) | RowValues::Float(_) | RowValues::Decimal(_) => {
            let lit = value.to_plain_string().unwrap_or_default();
            if textual || !looks_numeric(&lit) {
                format!("'{}'", quote_string(&lit))
            } else {
                lit
            }
        }
        RowValues::Text(s) => match column_type {
            Some(ct) if ct.is_number() && looks_numeric(s) => s.trim().to_string(),
            Some(ColumnType::Boolean) => match truthiness(s) {
                Some(true) => quoted_true().to_string(),
                Some(false) => quoted_false().to_string(),
                None => format!("'{}'", quote_string(s)),
            },
            Some(ColumnType::Binary) => hex_literal(s.as_bytes()),
            _ => format!("'{}'", quote_string(s)),
        },
        RowValues::Timestamp(dt) => format!("'{}'", quoted_date(dt)),
        RowValues::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        RowValues::Blob(bytes) => hex_literal(bytes),
    }
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
