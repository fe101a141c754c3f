use std::net::ToSocketAddrs;

use async_trait::async_trait;
use tiberius::{Client, Query};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::config::build_tiberius_config;
use super::query::{bind_query_params, build_result_set};
use crate::client::{TdsClient, TdsConnector};
use crate::config::SybaseOptions;
use crate::error::SybaseDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Type alias for the underlying tiberius client
pub type SybaseClient = Client<Compat<TcpStream>>;

/// Open a raw tiberius connection for the given options.
///
/// # Errors
/// Returns `SybaseDbError::ConnectionError` if address resolution, the TCP
/// connect, or the TDS login fails.
pub async fn create_sybase_client(opts: &SybaseOptions) -> Result<SybaseClient, SybaseDbError> {
    let config = build_tiberius_config(opts);
    let port = opts.port_or_default();

    let server_addr = (opts.host.as_str(), port)
        .to_socket_addrs()
        .map_err(|e| {
            SybaseDbError::ConnectionError(format!("Failed to resolve server address: {e}"))
        })?
        .next()
        .ok_or_else(|| {
            SybaseDbError::ConnectionError(format!("No valid address found for {}", opts.host))
        })?;

    let tcp = TcpStream::connect(server_addr)
        .await
        .map_err(|e| SybaseDbError::ConnectionError(format!("TCP connection error: {e}")))?;
    tcp.set_nodelay(true).ok();

    Client::connect(config, tcp.compat_write())
        .await
        .map_err(|e| SybaseDbError::ConnectionError(format!("TDS login error: {e}")))
}

/// [`TdsClient`] backed by a tiberius connection.
pub struct TiberiusClient {
    inner: Option<SybaseClient>,
}

impl std::fmt::Debug for TiberiusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiberiusClient")
            .field("open", &self.inner.is_some())
            .finish()
    }
}

impl TiberiusClient {
    #[must_use]
    pub fn new(client: SybaseClient) -> Self {
        Self {
            inner: Some(client),
        }
    }

    fn client(&mut self) -> Result<&mut SybaseClient, SybaseDbError> {
        self.inner
            .as_mut()
            .ok_or_else(|| SybaseDbError::ConnectionError("connection is closed".to_string()))
    }
}

#[async_trait]
impl TdsClient for TiberiusClient {
    async fn execute_batch(&mut self, sql: &str) -> Result<(), SybaseDbError> {
        let client = self.client()?;
        Query::new(sql)
            .execute(client)
            .await
            .map_err(|e| SybaseDbError::statement_invalid(sql, e.to_string()))?;
        Ok(())
    }

    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SybaseDbError> {
        let client = self.client()?;
        build_result_set(client, sql, params).await
    }

    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<u64, SybaseDbError> {
        let client = self.client()?;
        let exec_result = bind_query_params(sql, params)
            .execute(client)
            .await
            .map_err(|e| SybaseDbError::statement_invalid(sql, e.to_string()))?;
        Ok(exec_result.rows_affected().iter().sum())
    }

    async fn close(&mut self) -> Result<(), SybaseDbError> {
        match self.inner.take() {
            Some(client) => client.close().await.map_err(SybaseDbError::from),
            None => Ok(()),
        }
    }
}

/// Opens tiberius connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiberiusConnector;

#[async_trait]
impl TdsConnector for TiberiusConnector {
    type Client = TiberiusClient;

    async fn connect(&self, options: &SybaseOptions) -> Result<TiberiusClient, SybaseDbError> {
        create_sybase_client(options).await.map(TiberiusClient::new)
    }
}
