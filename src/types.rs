//! Shared types for the MCP server tools.

use serde::{Deserialize, Serialize};

/// Parameters for the `query_history` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHistoryParams {
    /// Fields to select from the proxy history.
    pub fields: Vec<String>,
    /// SQL-style condition expression, e.g.
    /// `req.content_type='text/html' and status_code=200`.
    pub conditions: String,
    /// Maximum number of result rows (default 20).
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}
