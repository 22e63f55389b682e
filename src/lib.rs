//! proxysift MCP server.
//!
//! Exposes a single `query_history` tool over the captured traffic history of
//! a local intercepting proxy. Tool calls are validated against a fixed field
//! allowlist and keyword denylist, assembled into a fixed query template, and
//! forwarded base64-encoded to the proxy's HTTP query endpoint.

pub mod config;
pub mod forwarder;
pub mod protocol;
pub mod query;
pub mod tools;
pub mod transport;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::ServerConfig;
use crate::forwarder::Forwarder;

/// The proxysift MCP server.
pub struct QueryServer {
    /// Forwarder that transmits assembled queries to the proxy backend.
    pub forwarder: Forwarder,
    /// Server metadata.
    pub server_info: ServerInfo,
}

/// Server metadata returned during initialization.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "proxysift-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl QueryServer {
    /// Create a new server from resolved configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        Ok(Self {
            forwarder: Forwarder::new(config)?,
            server_info: ServerInfo::default(),
        })
    }

    /// Run the server on stdio transport (reads JSON-RPC from stdin, writes to stdout).
    pub async fn run_stdio(self: Arc<Self>) -> Result<()> {
        info!("starting proxysift MCP server on stdio");
        transport::stdio::run(self).await
    }

    /// Run the server on HTTP transport at the given port.
    pub async fn run_http(self: Arc<Self>, port: u16) -> Result<()> {
        info!("starting proxysift MCP server on HTTP port {}", port);
        transport::http::run(self, port).await
    }
}
