// Sybase module - TDS connectivity through tiberius
//
// - config: tiberius configuration built from `SybaseOptions`
// - client: connection creation and the `TdsClient`/`TdsConnector` implementations
// - query: parameter binding and result extraction

pub mod client;
pub mod config;
pub mod query;

pub use client::{SybaseClient, TiberiusClient, TiberiusConnector, create_sybase_client};
pub use config::build_tiberius_config;
pub use query::{bind_query_params, build_result_set};
