use std::env;

use crate::dialect::DEFAULT_PORT;
use crate::error::SybaseDbError;

/// Options for connecting a [`SybaseAdapter`](crate::adapter::SybaseAdapter).
#[derive(Clone, PartialEq, Eq)]
pub struct SybaseOptions {
    pub host: String,
    pub port: Option<u16>,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Convert numeric-looking text in result rows into numbers.
    pub numconvert: bool,
    pub application_name: Option<String>,
}

impl std::fmt::Debug for SybaseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SybaseOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("numconvert", &self.numconvert)
            .field("application_name", &self.application_name)
            .finish()
    }
}

impl SybaseOptions {
    #[must_use]
    pub fn new(host: String, database: String, username: String, password: String) -> Self {
        Self {
            host,
            port: None,
            database,
            username,
            password,
            numconvert: true,
            application_name: None,
        }
    }

    #[must_use]
    pub fn builder(
        host: String,
        database: String,
        username: String,
        password: String,
    ) -> SybaseOptionsBuilder {
        SybaseOptionsBuilder::new(host, database, username, password)
    }

    /// Read options from `<PREFIX>_HOST`, `_PORT`, `_DATABASE`, `_USERNAME`
    /// and `_PASSWORD`. Host defaults to `localhost`, username to `sa`.
    ///
    /// # Errors
    /// Returns `SybaseDbError::ConfigError` if the database is missing or the
    /// port does not parse.
    pub fn from_env(prefix: &str) -> Result<Self, SybaseDbError> {
        let var = |name: &str| env::var(format!("{prefix}_{name}")).ok();

        let database = var("DATABASE").ok_or_else(|| {
            SybaseDbError::ConfigError(format!("{prefix}_DATABASE is not set"))
        })?;
        let port = var("PORT")
            .map(|p| {
                p.parse::<u16>().map_err(|e| {
                    SybaseDbError::ConfigError(format!("invalid {prefix}_PORT '{p}': {e}"))
                })
            })
            .transpose()?;

        let mut opts = SybaseOptions::new(
            var("HOST").unwrap_or_else(|| "localhost".to_string()),
            database,
            var("USERNAME").unwrap_or_else(|| "sa".to_string()),
            var("PASSWORD").unwrap_or_default(),
        );
        opts.port = port;
        Ok(opts)
    }

    /// Port to connect to, falling back to the Adaptive Server default.
    #[must_use]
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// # Errors
    /// Returns `SybaseDbError::ConfigError` when host or database is empty.
    pub fn validate(&self) -> Result<(), SybaseDbError> {
        if self.database.trim().is_empty() {
            return Err(SybaseDbError::ConfigError(
                "no database specified".to_string(),
            ));
        }
        if self.host.trim().is_empty() {
            return Err(SybaseDbError::ConfigError("no host specified".to_string()));
        }
        Ok(())
    }
}

/// Fluent builder for Sybase options.
#[derive(Debug, Clone)]
pub struct SybaseOptionsBuilder {
    opts: SybaseOptions,
}

impl SybaseOptionsBuilder {
    #[must_use]
    pub fn new(host: String, database: String, username: String, password: String) -> Self {
        Self {
            opts: SybaseOptions::new(host, database, username, password),
        }
    }

    #[must_use]
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn numconvert(mut self, numconvert: bool) -> Self {
        self.opts.numconvert = numconvert;
        self
    }

    #[must_use]
    pub fn application_name(mut self, application_name: Option<String>) -> Self {
        self.opts.application_name = application_name;
        self
    }

    #[must_use]
    pub fn finish(self) -> SybaseOptions {
        self.opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields_and_defaults() {
        let opts = SybaseOptions::builder("db1".into(), "app".into(), "sa".into(), "pw".into())
            .numconvert(false)
            .finish();
        assert_eq!(opts.port_or_default(), DEFAULT_PORT);
        assert!(!opts.numconvert);
        assert!(opts.validate().is_ok());
        assert!(!format!("{opts:?}").contains("pw"));
    }

    #[test]
    fn validate_rejects_missing_database() {
        let opts = SybaseOptions::new("db1".into(), " ".into(), "sa".into(), String::new());
        assert!(matches!(opts.validate(), Err(SybaseDbError::ConfigError(_))));
    }

    #[test]
    fn from_env_requires_database() {
        let err = SybaseOptions::from_env("SYBASE_MIDDLEWARE_UNSET_PREFIX").unwrap_err();
        assert!(err.to_string().contains("SYBASE_MIDDLEWARE_UNSET_PREFIX_DATABASE"));
    }
}
