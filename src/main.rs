//! proxysift MCP server binary entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use proxysift_mcp::config::ServerConfig;
use proxysift_mcp::QueryServer;

/// MCP server exposing a constrained query interface over an intercepting
/// proxy's captured traffic history.
#[derive(Parser, Debug)]
#[command(name = "proxysift-mcp", version, about)]
struct Cli {
    /// Path to a TOML config file. Built-in defaults apply when omitted.
    #[arg(long = "config")]
    config_path: Option<PathBuf>,

    /// Override the proxy backend base URL.
    #[arg(long = "backend-url")]
    backend_url: Option<String>,

    /// Serve MCP over HTTP on this port instead of stdio.
    #[arg(long = "http-port")]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // CRITICAL: All logging MUST go to stderr. Any output to stdout that isn't
    // JSON-RPC will poison the MCP stream and break the host.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config_path {
        Some(ref path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }

    tracing::info!(
        backend = %config.backend_url,
        timeout_secs = config.request_timeout_secs,
        "starting proxysift-mcp"
    );

    let server = Arc::new(QueryServer::new(config)?);

    match cli.http_port {
        Some(port) => server.run_http(port).await,
        None => server.run_stdio().await,
    }
}
