//! The seam to the TDS client library that owns the network connection.

use async_trait::async_trait;

use crate::config::SybaseOptions;
use crate::error::SybaseDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// One open TDS connection.
#[async_trait]
pub trait TdsClient: Send {
    /// Executes a batch of SQL statements. No parameters are supported.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), SybaseDbError>;

    /// Executes a statement that returns rows.
    async fn query(&mut self, sql: &str, params: &[RowValues])
    -> Result<ResultSet, SybaseDbError>;

    /// Executes a DML statement and returns the number of rows affected.
    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<u64, SybaseDbError>;

    /// Close the connection. Later calls on the client fail.
    async fn close(&mut self) -> Result<(), SybaseDbError>;
}

/// Opens [`TdsClient`] connections; used for connect and reconnect.
#[async_trait]
pub trait TdsConnector: Send + Sync {
    type Client: TdsClient;

    async fn connect(&self, options: &SybaseOptions) -> Result<Self::Client, SybaseDbError>;
}
