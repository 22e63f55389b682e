//! HTTP transport for the MCP server using axum.
//!
//! Provides a POST endpoint at `/mcp` that accepts JSON-RPC messages.
//! Bound to loopback only; the tool surface carries no authentication.

use std::sync::Arc;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, routing::post, Router};
use tracing::info;

use crate::protocol;
use crate::QueryServer;

/// Run the MCP server on HTTP at the given port.
pub async fn run(server: Arc<QueryServer>, port: u16) -> Result<()> {
    let app = Router::new()
        .route("/mcp", post(handle_mcp))
        .with_state(server);

    let addr = format!("127.0.0.1:{port}");
    info!("MCP HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_mcp(
    State(server): State<Arc<QueryServer>>,
    body: String,
) -> (StatusCode, String) {
    match protocol::handle_message(&server, &body).await {
        Some(response) => (StatusCode::OK, response),
        None => (StatusCode::NO_CONTENT, String::new()),
    }
}
