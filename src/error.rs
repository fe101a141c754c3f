use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Message fragment Sybase raises for an `ALTER TABLE ... MODIFY` that changes nothing.
static NOOP_ALTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)no columns to drop,\s*add or modify").expect("static regex")
});

#[derive(Debug, Error)]
pub enum SybaseDbError {
    #[cfg(feature = "tds")]
    #[error(transparent)]
    Tds(#[from] tiberius::error::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Statement invalid: {message} (sql: {sql})")]
    StatementInvalid { sql: String, message: String },

    #[error("Other database error: {0}")]
    Other(String),
}

impl SybaseDbError {
    /// Wrap a server error together with the statement that raised it.
    #[must_use]
    pub fn statement_invalid(sql: &str, message: impl Into<String>) -> Self {
        SybaseDbError::StatementInvalid {
            sql: sql.to_string(),
            message: message.into(),
        }
    }

    /// True for the benign error raised by a column alteration that changes nothing.
    #[must_use]
    pub fn is_noop_alter(&self) -> bool {
        NOOP_ALTER.is_match(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_alter_is_recognized_in_any_variant() {
        let err = SybaseDbError::statement_invalid(
            "ALTER TABLE t MODIFY c int",
            "No columns to drop, add or modify",
        );
        assert!(err.is_noop_alter());

        let err = SybaseDbError::ExecutionError("Msg 13905: no columns to drop, add or modify".into());
        assert!(err.is_noop_alter());
    }

    #[test]
    fn other_errors_are_not_noop_alter() {
        let err = SybaseDbError::ExecutionError("Invalid column name 'c'".into());
        assert!(!err.is_noop_alter());
        assert!(!SybaseDbError::ConnectionError("refused".into()).is_noop_alter());
    }
}
