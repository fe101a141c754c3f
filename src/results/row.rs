use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A row from a database query result
///
/// Column names and the name-to-index lookup are shared by every row of the
/// owning [`ResultSet`](super::ResultSet).
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub rows: Vec<RowValues>,
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    /// Create a new database row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = Arc::new(index_names(&column_names));
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by name
    ///
    /// Catalog procedures are not consistent about identifier case, so a
    /// case-insensitive scan is used when the exact name is missing.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }

        self.column_names
            .iter()
            .position(|col| col.eq_ignore_ascii_case(column_name))
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    /// Text value of a column, trimmed of the blank padding `char` columns carry.
    #[must_use]
    pub fn get_trimmed_text(&self, column_name: &str) -> Option<String> {
        self.get(column_name)
            .and_then(RowValues::to_plain_string)
            .map(|s| s.trim().to_string())
    }

    /// Integer value of a column, accepting the textual and decimal forms
    /// catalog tables return through some drivers.
    #[must_use]
    pub fn get_i64(&self, column_name: &str) -> Option<i64> {
        match self.get(column_name)? {
            RowValues::Int(i) => Some(*i),
            RowValues::Bool(b) => Some(i64::from(*b)),
            RowValues::Decimal(s) | RowValues::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.split('.').next().and_then(|w| w.parse().ok()))
            }
            #[allow(clippy::cast_possible_truncation)]
            RowValues::Float(f) => Some(*f as i64),
            _ => None,
        }
    }
}

pub(crate) fn index_names(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}
