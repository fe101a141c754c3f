//! Scripted stand-in for the TDS client, used by the integration tests.
//!
//! A [`Script`] holds response rules keyed by SQL fragments and records every
//! statement the adapter sends. The most recently registered matching rule wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::client::{TdsClient, TdsConnector};
use crate::config::SybaseOptions;
use crate::error::SybaseDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

mod test_helpers;

pub use test_helpers::{create_test_row, result_set};

/// What the scripted server answers for a matching statement.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Rows(ResultSet),
    Affected(u64),
    Error(String),
}

#[derive(Debug, Default)]
struct ScriptState {
    rules: Vec<(String, ScriptedResponse)>,
    log: Vec<String>,
    connects: usize,
    closes: usize,
    fail_close: bool,
    fail_connect: bool,
}

/// Shared script; cheap to clone, all clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct Script {
    state: Arc<Mutex<ScriptState>>,
}

impl Script {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn on(&self, fragment: &str, response: ScriptedResponse) -> &Self {
        self.state().rules.push((fragment.to_string(), response));
        self
    }

    pub fn rows(&self, fragment: &str, columns: &[&str], rows: Vec<Vec<RowValues>>) -> &Self {
        self.on(fragment, ScriptedResponse::Rows(result_set(columns, rows)))
    }

    pub fn affected(&self, fragment: &str, rows: u64) -> &Self {
        self.on(fragment, ScriptedResponse::Affected(rows))
    }

    pub fn fail(&self, fragment: &str, message: &str) -> &Self {
        self.on(fragment, ScriptedResponse::Error(message.to_string()))
    }

    pub fn fail_close(&self, fail: bool) -> &Self {
        self.state().fail_close = fail;
        self
    }

    pub fn fail_connect(&self, fail: bool) -> &Self {
        self.state().fail_connect = fail;
        self
    }

    /// Every statement sent so far, in order.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        self.state().log.clone()
    }

    pub fn clear_statements(&self) {
        self.state().log.clear();
    }

    #[must_use]
    pub fn connects(&self) -> usize {
        self.state().connects
    }

    #[must_use]
    pub fn closes(&self) -> usize {
        self.state().closes
    }

    #[must_use]
    pub fn connector(&self) -> ScriptedConnector {
        ScriptedConnector {
            script: self.clone(),
        }
    }

    fn respond(&self, sql: &str) -> Option<ScriptedResponse> {
        let mut state = self.state();
        state.log.push(sql.to_string());
        state
            .rules
            .iter()
            .rev()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
    }
}

/// [`TdsClient`] that answers from a [`Script`].
#[derive(Debug)]
pub struct ScriptedClient {
    script: Script,
    closed: bool,
}

impl ScriptedClient {
    fn respond(&self, sql: &str) -> Result<Option<ScriptedResponse>, SybaseDbError> {
        if self.closed {
            return Err(SybaseDbError::ConnectionError(
                "connection is closed".to_string(),
            ));
        }
        match self.script.respond(sql) {
            Some(ScriptedResponse::Error(message)) => {
                Err(SybaseDbError::statement_invalid(sql, message))
            }
            other => Ok(other),
        }
    }
}

#[async_trait]
impl TdsClient for ScriptedClient {
    async fn execute_batch(&mut self, sql: &str) -> Result<(), SybaseDbError> {
        self.respond(sql).map(|_| ())
    }

    async fn query(
        &mut self,
        sql: &str,
        _params: &[RowValues],
    ) -> Result<ResultSet, SybaseDbError> {
        Ok(match self.respond(sql)? {
            Some(ScriptedResponse::Rows(result_set)) => result_set,
            _ => ResultSet::default(),
        })
    }

    async fn execute(&mut self, sql: &str, _params: &[RowValues]) -> Result<u64, SybaseDbError> {
        Ok(match self.respond(sql)? {
            Some(ScriptedResponse::Affected(rows)) => rows,
            Some(ScriptedResponse::Rows(result_set)) => result_set.len() as u64,
            _ => 0,
        })
    }

    async fn close(&mut self) -> Result<(), SybaseDbError> {
        self.closed = true;
        let mut state = self.script.state();
        state.closes += 1;
        if state.fail_close {
            return Err(SybaseDbError::ConnectionError(
                "connection reset by peer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hands out [`ScriptedClient`]s sharing one [`Script`].
#[derive(Debug, Clone)]
pub struct ScriptedConnector {
    script: Script,
}

#[async_trait]
impl TdsConnector for ScriptedConnector {
    type Client = ScriptedClient;

    async fn connect(&self, _options: &SybaseOptions) -> Result<ScriptedClient, SybaseDbError> {
        let mut state = self.script.state();
        state.connects += 1;
        if state.fail_connect {
            return Err(SybaseDbError::ConnectionError(
                "connection refused".to_string(),
            ));
        }
        Ok(ScriptedClient {
            script: self.script.clone(),
            closed: false,
        })
    }
}

/// Options pointing at a throwaway database, for scripted tests.
#[must_use]
pub fn test_options() -> SybaseOptions {
    SybaseOptions::new(
        "localhost".to_string(),
        "testdb".to_string(),
        "sa".to_string(),
        String::new(),
    )
}
